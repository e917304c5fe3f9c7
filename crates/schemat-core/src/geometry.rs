//! Geometric primitives for element placement.
//!
//! This module provides the value types the placement engine works with:
//!
//! - [`Point`] - A 2D coordinate (or vector) in drawing units
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned bounding box
//! - [`Transform`] - An affine transform made of scale, rotation and translation
//!
//! # Coordinate System
//!
//! Schemat draws in a mathematical coordinate system:
//!
//! ```text
//!    +Y
//!     ▲
//!     │
//!     │
//!   (0,0) ────────► +X
//! ```
//!
//! - **X-axis**: Increases rightward
//! - **Y-axis**: Increases upward
//! - **Angles**: Degrees, counter-clockwise from the +X axis
//!
//! Backends that draw in screen space (such as SVG) flip the Y axis on output.

/// Returns `(cos, sin)` of an angle given in degrees.
///
/// Multiples of 90° are answered exactly so that axis-aligned placements do not
/// accumulate rounding noise.
pub fn cos_sin_deg(theta: f32) -> (f32, f32) {
    let normalized = normalize_angle(theta);
    if normalized == 0.0 {
        (1.0, 0.0)
    } else if normalized == 90.0 {
        (0.0, 1.0)
    } else if normalized == 180.0 {
        (-1.0, 0.0)
    } else if normalized == 270.0 {
        (0.0, -1.0)
    } else {
        let radians = normalized.to_radians();
        (radians.cos(), radians.sin())
    }
}

/// Normalizes an angle in degrees into the range `[0, 360)`.
pub fn normalize_angle(theta: f32) -> f32 {
    let wrapped = theta.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// A 2D point representing a position in drawing coordinates.
///
/// Points double as vectors: [`Point::sub_point`] yields the displacement
/// between two positions and [`Point::rotate`] turns a vector about the origin.
///
/// # Examples
///
/// ```
/// # use schemat_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let turned = Point::new(1.0, 0.0).rotate(90.0);
/// assert_eq!(turned, Point::new(0.0, 1.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Returns true if both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Translates the point by the given offsets
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points
    pub fn distance(self, other: Point) -> f32 {
        other.sub_point(self).hypot()
    }

    /// Direction of this vector in degrees, normalized into `[0, 360)`.
    ///
    /// ```
    /// # use schemat_core::geometry::Point;
    /// assert_eq!(Point::new(0.0, 2.0).angle(), 90.0);
    /// assert_eq!(Point::new(0.0, -2.0).angle(), 270.0);
    /// ```
    pub fn angle(self) -> f32 {
        normalize_angle(self.y.atan2(self.x).to_degrees())
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Multiplies each coordinate by its own factor.
    pub fn scale_xy(self, sx: f32, sy: f32) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
        }
    }

    /// Rotates the point about the origin by `theta` degrees counter-clockwise.
    pub fn rotate(self, theta: f32) -> Self {
        let (cos, sin) = cos_sin_deg(theta);
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Rotates the point about `center` by `theta` degrees counter-clockwise.
    pub fn rotate_about(self, center: Point, theta: f32) -> Self {
        self.sub_point(center).rotate(theta).add_point(center)
    }

    /// Returns a new point with absolute values of both coordinates
    pub fn abs(self) -> Self {
        Self {
            x: self.x.abs(),
            y: self.y.abs(),
        }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Multiplies both dimension by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Represents an axis-aligned bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a degenerate bounds containing a single point
    pub fn from_point(point: Point) -> Self {
        Self {
            min_x: point.x,
            min_y: point.y,
            max_x: point.x,
            max_y: point.y,
        }
    }

    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Smallest bounds containing every point, or `None` for an empty input.
    ///
    /// ```
    /// # use schemat_core::geometry::{Bounds, Point};
    /// let bounds = Bounds::from_points([
    ///     Point::new(1.0, 5.0),
    ///     Point::new(-2.0, 3.0),
    ///     Point::new(4.0, -1.0),
    /// ])
    /// .unwrap();
    /// assert_eq!(bounds.min_point(), Point::new(-2.0, -1.0));
    /// assert_eq!(bounds.max_point(), Point::new(4.0, 5.0));
    ///
    /// assert!(Bounds::from_points(std::iter::empty()).is_none());
    /// ```
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = Self::from_point(points.next()?);
        Some(points.fold(first, |acc, point| acc.include_point(point)))
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the lower-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Returns the upper-right corner as a Point
    pub fn max_point(self) -> Point {
        Point {
            x: self.max_x,
            y: self.max_y,
        }
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Returns true if the point lies inside or on the edge of the bounds
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Grows the bounds so that it contains `point`.
    pub fn include_point(self, point: Point) -> Self {
        Self {
            min_x: self.min_x.min(point.x),
            min_y: self.min_y.min(point.y),
            max_x: self.max_x.max(point.x),
            max_y: self.max_y.max(point.y),
        }
    }

    /// Merges two bounds to create a larger bounds that contains both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use schemat_core::geometry::{Bounds, Point};
    /// let a = Bounds::from_points([Point::new(0.0, 0.0), Point::new(3.0, 1.0)]).unwrap();
    /// let b = Bounds::from_points([Point::new(1.0, -2.0), Point::new(2.0, 4.0)]).unwrap();
    ///
    /// let combined = a.merge(&b);
    /// assert_eq!(combined.min_point(), Point::new(0.0, -2.0));
    /// assert_eq!(combined.max_point(), Point::new(3.0, 4.0));
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Expands the bounds by the same margin on every side.
    pub fn add_margin(&self, margin: f32) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }
}

/// An affine transform composed of a per-axis scale, a rotation and a translation.
///
/// Points are mapped as `rotate(scale(p), theta) + offset`. There is no shear.
/// Negative scale factors mirror across the corresponding axis.
///
/// # Examples
///
/// ```
/// # use schemat_core::geometry::{Point, Transform};
/// let transform = Transform::new(90.0, Point::new(5.0, 0.0)).with_scale(2.0, 1.0);
/// assert_eq!(transform.apply(Point::new(1.0, 0.0)), Point::new(5.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale_x: f32,
    scale_y: f32,
    theta: f32,
    offset: Point,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The transform that leaves every point where it is.
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            theta: 0.0,
            offset: Point::default(),
        }
    }

    /// A rigid transform: rotate by `theta` degrees, then translate by `offset`.
    pub fn new(theta: f32, offset: Point) -> Self {
        Self {
            theta,
            offset,
            ..Self::identity()
        }
    }

    /// A pure scale about the origin.
    pub fn scaling(scale_x: f32, scale_y: f32) -> Self {
        Self::identity().with_scale(scale_x, scale_y)
    }

    /// Returns the transform with the given per-axis scale factors.
    pub fn with_scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    /// Rotation in degrees
    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Returns true if the transform reverses orientation
    pub fn is_mirroring(&self) -> bool {
        (self.scale_x < 0.0) != (self.scale_y < 0.0)
    }

    /// Maps a point through scale, rotation and translation.
    pub fn apply(&self, point: Point) -> Point {
        self.apply_vector(point).add_point(self.offset)
    }

    /// Maps a direction vector; the translation is not applied.
    pub fn apply_vector(&self, vector: Point) -> Point {
        vector.scale_xy(self.scale_x, self.scale_y).rotate(self.theta)
    }
}

/// Smallest bounds containing all points, see [`Bounds::from_points`].
pub fn bbox_union(points: impl IntoIterator<Item = Point>) -> Option<Bounds> {
    Bounds::from_points(points)
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    fn angle_strategy() -> impl Strategy<Value = f32> {
        -720.0f32..720.0
    }

    /// Rotation preserves the distance from the origin.
    fn check_rotation_preserves_length(p: Point, theta: f32) -> Result<(), TestCaseError> {
        let rotated = p.rotate(theta);
        prop_assert!(approx_eq!(f32, rotated.hypot(), p.hypot(), epsilon = 0.01));
        Ok(())
    }

    /// Rotating forward and back returns the original point.
    fn check_rotation_inverse_roundtrip(p: Point, theta: f32) -> Result<(), TestCaseError> {
        let roundtrip = p.rotate(theta).rotate(-theta);
        prop_assert!(approx_eq!(f32, roundtrip.x(), p.x(), epsilon = 0.01));
        prop_assert!(approx_eq!(f32, roundtrip.y(), p.y(), epsilon = 0.01));
        Ok(())
    }

    /// Every input point lies inside the union bounds.
    fn check_bbox_union_contains_all(points: Vec<Point>) -> Result<(), TestCaseError> {
        let bounds = bbox_union(points.iter().copied());
        prop_assert_eq!(bounds.is_none(), points.is_empty());
        if let Some(bounds) = bounds {
            for point in points {
                prop_assert!(bounds.contains(point));
            }
        }
        Ok(())
    }

    /// Bounds merge should be commutative: a.merge(b) == b.merge(a).
    fn check_bounds_merge_is_commutative(a: Point, b: Point, c: Point) -> Result<(), TestCaseError> {
        let b1 = Bounds::from_point(a).include_point(b);
        let b2 = Bounds::from_point(c);
        prop_assert_eq!(b1.merge(&b2), b2.merge(&b1));
        Ok(())
    }

    /// A rigid transform keeps distances between points.
    fn check_rigid_transform_is_isometry(
        a: Point,
        b: Point,
        theta: f32,
        offset: Point,
    ) -> Result<(), TestCaseError> {
        let transform = Transform::new(theta, offset);
        let before = a.distance(b);
        let after = transform.apply(a).distance(transform.apply(b));
        prop_assert!(approx_eq!(f32, before, after, epsilon = 0.05));
        Ok(())
    }

    proptest! {
        #[test]
        fn rotation_preserves_length(p in point_strategy(), theta in angle_strategy()) {
            check_rotation_preserves_length(p, theta)?;
        }

        #[test]
        fn rotation_inverse_roundtrip(p in point_strategy(), theta in angle_strategy()) {
            check_rotation_inverse_roundtrip(p, theta)?;
        }

        #[test]
        fn bbox_union_contains_all(points in prop::collection::vec(point_strategy(), 0..16)) {
            check_bbox_union_contains_all(points)?;
        }

        #[test]
        fn bounds_merge_is_commutative(a in point_strategy(), b in point_strategy(), c in point_strategy()) {
            check_bounds_merge_is_commutative(a, b, c)?;
        }

        #[test]
        fn rigid_transform_is_isometry(
            a in point_strategy(),
            b in point_strategy(),
            theta in angle_strategy(),
            offset in point_strategy(),
        ) {
            check_rigid_transform_is_isometry(a, b, theta, offset)?;
        }
    }
}
