//! Logo (raster image) layer.

use super::LayerId;
use crate::geometry::MIN_LOGO_DIM;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format of stored logo data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogoFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// WebP format.
    WebP,
}

impl LogoFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            LogoFormat::Png => "image/png",
            LogoFormat::Jpeg => "image/jpeg",
            LogoFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(LogoFormat::Png),
            "jpg" | "jpeg" => Some(LogoFormat::Jpeg),
            "webp" => Some(LogoFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(LogoFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(LogoFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(LogoFormat::WebP);
        }

        None
    }
}

/// A positioned, independently resizable raster image layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoLayer {
    pub(crate) id: LayerId,
    /// Top-left corner position in canvas logical units.
    pub position: Point,
    /// Display width (>= the minimum floor).
    pub width: f64,
    /// Display height (>= the minimum floor).
    pub height: f64,
    /// Original image width in pixels.
    pub source_width: u32,
    /// Original image height in pixels.
    pub source_height: u32,
    /// Image format.
    pub format: LogoFormat,
    /// Image bytes, base64-encoded for JSON serialization.
    pub data_base64: String,
}

impl LogoLayer {
    /// Create a new logo layer from raw image bytes.
    pub fn new(
        position: Point,
        data: &[u8],
        source_width: u32,
        source_height: u32,
        format: LogoFormat,
    ) -> Self {
        use base64::{Engine, engine::general_purpose::STANDARD};

        Self {
            id: Uuid::new_v4(),
            position,
            width: (source_width as f64).max(MIN_LOGO_DIM),
            height: (source_height as f64).max(MIN_LOGO_DIM),
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
        }
    }

    /// The layer's unique id.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Set explicit display dimensions.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Scale the display box to fit within max dimensions, preserving the
    /// source aspect ratio.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        if self.source_height == 0 {
            return self;
        }
        let aspect = self.source_width as f64 / self.source_height as f64;
        let target_aspect = max_width / max_height;

        if aspect > target_aspect {
            self.width = max_width;
            self.height = max_width / aspect;
        } else {
            self.height = max_height;
            self.width = max_height * aspect;
        }

        self
    }

    /// The raw image bytes (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        use base64::{Engine, engine::general_purpose::STANDARD};
        STANDARD.decode(&self.data_base64).ok()
    }

    /// Display size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounding box in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Check if a point (in canvas coordinates) hits this layer.
    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection_magic() {
        let png_magic = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(LogoFormat::from_magic_bytes(&png_magic), Some(LogoFormat::Png));

        let jpeg_magic = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(LogoFormat::from_magic_bytes(&jpeg_magic), Some(LogoFormat::Jpeg));

        assert_eq!(LogoFormat::from_magic_bytes(&[0, 1]), None);
    }

    #[test]
    fn test_format_detection_extension() {
        assert_eq!(LogoFormat::from_extension("png"), Some(LogoFormat::Png));
        assert_eq!(LogoFormat::from_extension("JPG"), Some(LogoFormat::Jpeg));
        assert_eq!(LogoFormat::from_extension("webp"), Some(LogoFormat::WebP));
        assert_eq!(LogoFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_fit_within() {
        let data = vec![0u8; 10];
        let logo = LogoLayer::new(Point::ZERO, &data, 1000, 500, LogoFormat::Png);

        // 2:1 aspect into a 400x400 box fits to width.
        let fitted = logo.fit_within(400.0, 400.0);
        assert!((fitted.width - 400.0).abs() < 0.01);
        assert!((fitted.height - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_bounds() {
        let data = vec![0u8; 10];
        let logo = LogoLayer::new(Point::new(10.0, 20.0), &data, 100, 50, LogoFormat::Png);
        let bounds = logo.bounds();
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_data_round_trip() {
        let data = vec![1u8, 2, 3, 4, 5];
        let logo = LogoLayer::new(Point::ZERO, &data, 1, 1, LogoFormat::Png);
        assert_eq!(logo.data(), Some(data));
    }
}
