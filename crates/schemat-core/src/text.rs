//! Text measurement for label and text segment extents.
//!
//! Text extents feed into bounding boxes, so they are measured with real font
//! metrics through cosmic-text. Sizes are returned in drawing units.

use std::sync::{Mutex, OnceLock, PoisonError};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;

use crate::geometry::Size;

/// Typographic points per drawing unit (half an inch per unit).
pub const POINTS_PER_UNIT: f32 = 36.0;

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// Average glyph advance used when no font could shape the text.
const FALLBACK_ADVANCE_FACTOR: f32 = 0.55;

/// Measures `content` set in `font` at `fontsize` points.
///
/// Returns the size in drawing units. Multi-line content is measured line by
/// line; the width is that of the widest line.
pub fn measure(content: &str, font: &str, fontsize: f32) -> Size {
    TEXT_MANAGER
        .get_or_init(TextManager::new)
        .calculate_text_size(content, font, fontsize)
        .scale(1.0 / POINTS_PER_UNIT)
}

/// TextManager handles text measurement and font operations
/// It maintains a reusable FontSystem instance to avoid expensive recreation
struct TextManager {
    font_system: Mutex<FontSystem>,
}

impl TextManager {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }

    /// Calculate the size of text in points using cosmic-text shaping.
    fn calculate_text_size(&self, text: &str, font: &str, fontsize: f32) -> Size {
        if text.is_empty() || fontsize <= 0.0 {
            return Size::default();
        }

        let mut font_system = self
            .font_system
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let metrics = Metrics::new(fontsize, fontsize * LINE_HEIGHT_FACTOR);

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let attrs = Attrs::new().family(Family::Name(font));

        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        let layout_runs: Vec<_> = buffer.layout_runs().collect();
        if !layout_runs.is_empty() {
            for last in layout_runs.iter().map(|run| run.glyphs.last()) {
                if let Some(last) = last {
                    max_width = max_width.max(last.x + last.w);
                }
                total_height += metrics.line_height;
            }
        }

        // No usable font: estimate from the character count
        if max_width == 0.0 {
            let line_count = text.lines().count().max(1);
            let widest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
            max_width = widest as f32 * fontsize * FALLBACK_ADVANCE_FACTOR;
            total_height = line_count as f32 * metrics.line_height;
        }

        Size::new(max_width, total_height)
    }
}

static TEXT_MANAGER: OnceLock<TextManager> = OnceLock::new();
