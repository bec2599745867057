//! Text layer.

use super::LayerId;
use crate::color::Color;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Padding added around the approximate text footprint.
pub const TEXT_PADDING: f64 = 8.0;
/// Vertical gap between consecutive lines, in logical units.
pub const LINE_GAP: f64 = 4.0;

/// Font family options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    /// Clean sans-serif (default).
    #[default]
    Sans,
    /// Serif face.
    Serif,
    /// Monospaced face.
    Mono,
}

impl FontFamily {
    /// Get the font family name as used by the renderer.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Sans => "Sans",
            FontFamily::Serif => "Serif",
            FontFamily::Mono => "Mono",
        }
    }

    /// Get all available font families.
    pub fn all() -> &'static [FontFamily] {
        &[FontFamily::Sans, FontFamily::Serif, FontFamily::Mono]
    }
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontWeight {
    /// Regular weight (default).
    #[default]
    Regular,
    /// Bold weight.
    Bold,
}

impl FontWeight {
    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            FontWeight::Regular => "Regular",
            FontWeight::Bold => "Bold",
        }
    }

    /// Get all available font weights.
    pub fn all() -> &'static [FontWeight] {
        &[FontWeight::Regular, FontWeight::Bold]
    }
}

/// Split content on explicit line breaks. Always yields at least one line
/// so empty content still has a footprint.
pub fn split_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        vec![""]
    } else {
        content.split('\n').collect()
    }
}

/// Approximate text footprint from character count and font size.
///
/// Width is half the font size per character of the widest line; height
/// advances one font size plus a fixed gap per line. A coarse stand-in for
/// glyph metrics, not a precision measurement.
pub fn approximate_text_size(content: &str, font_size: f64) -> Size {
    let lines = split_lines(content);
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = (widest as f64 * font_size / 2.0 + TEXT_PADDING).max(1.0);
    let line_count = lines.len() as f64;
    let height = line_count * font_size + (line_count - 1.0) * LINE_GAP + TEXT_PADDING;
    Size::new(width, height)
}

/// A positioned text layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLayer {
    pub(crate) id: LayerId,
    /// Top-left corner of the text bounding box, in canvas logical units.
    pub position: Point,
    /// The text content. May contain explicit line breaks.
    pub content: String,
    /// Font size in logical units.
    pub font_size: f64,
    /// Font family.
    pub font_family: FontFamily,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Fill color.
    pub color: Color,
    /// Whether the layer is currently accepting direct text input.
    #[serde(default)]
    pub editing: bool,
}

impl TextLayer {
    /// Default font size for new text layers.
    pub const DEFAULT_FONT_SIZE: f64 = 36.0;

    /// Create a new text layer.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            font_weight: FontWeight::default(),
            color: Color::black(),
            editing: false,
        }
    }

    /// The layer's unique id.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Content split on explicit line breaks. Always yields at least one
    /// line so an empty layer still has a footprint.
    pub fn lines(&self) -> Vec<&str> {
        split_lines(&self.content)
    }

    /// Approximate footprint from character count and font size.
    pub fn approximate_size(&self) -> Size {
        approximate_text_size(&self.content, self.font_size)
    }

    /// Bounding box in canvas coordinates (top-left anchored).
    pub fn bounds(&self) -> Rect {
        let size = self.approximate_size();
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + size.width,
            self.position.y + size.height,
        )
    }

    /// Check if a point (in canvas coordinates) hits this layer.
    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }
}
