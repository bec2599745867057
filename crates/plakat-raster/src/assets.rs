//! Template asset resolution.
//!
//! Background templates are referenced by key inside the canvas settings and
//! resolved through [`AssetSource`] at render time. The source is injected
//! so the pipeline works the same against an in-memory fixture set, a
//! directory on disk, or a remote catalog.

use image::RgbaImage;
use plakat_core::BoxFuture;
use plakat_core::board::{CanvasSpec, Composition, StoreError, TemplateRef};
use plakat_core::layers::LayerId;
use std::collections::HashMap;
use thiserror::Error;

/// Asset resolution errors. These are never fatal to a render; the
/// pipeline logs them and draws without the asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Template not found: {0}")]
    NotFound(String),
    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Asset source error: {0}")]
    Other(String),
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Trait for template providers.
pub trait AssetSource: Send + Sync {
    /// Resolve a template reference to decoded RGBA pixels.
    fn load_template(&self, template: &TemplateRef) -> BoxFuture<'_, AssetResult<RgbaImage>>;
}

/// Decode encoded image bytes (PNG, JPEG or WebP) to RGBA pixels.
pub fn decode_image(bytes: &[u8]) -> AssetResult<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Read the pixel dimensions of encoded image bytes without keeping the
/// decoded pixels around.
pub fn decode_dimensions(bytes: &[u8]) -> AssetResult<(u32, u32)> {
    let img = image::load_from_memory(bytes)?;
    Ok((img.width(), img.height()))
}

/// Ingest user-picked logo bytes: decode the pixel dimensions and insert
/// the layer into the composition. This is the image-loading side of
/// logo insertion; the store itself never decodes.
pub fn insert_logo(
    composition: &mut Composition,
    canvas: &CanvasSpec,
    bytes: &[u8],
) -> AssetResult<LayerId> {
    let (width, height) = decode_dimensions(bytes)?;
    Ok(composition.add_logo(canvas, bytes, width, height)?)
}

/// In-memory template source for testing and bundled assets.
#[derive(Default)]
pub struct MemoryAssets {
    templates: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded template bytes under a key.
    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.templates.insert(key.into(), bytes);
    }
}

impl AssetSource for MemoryAssets {
    fn load_template(&self, template: &TemplateRef) -> BoxFuture<'_, AssetResult<RgbaImage>> {
        let key = template.0.clone();
        Box::pin(async move {
            let bytes = self
                .templates
                .get(&key)
                .ok_or(AssetError::NotFound(key))?;
            decode_image(bytes)
        })
    }
}

/// Source with no templates. Every lookup misses, which the pipeline
/// treats as "render on the plain background".
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn load_template(&self, template: &TemplateRef) -> BoxFuture<'_, AssetResult<RgbaImage>> {
        let key = template.0.clone();
        Box::pin(async move { Err(AssetError::NotFound(key)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plakat_core::block_on;

    fn tiny_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 3, 2);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(img.as_raw()).unwrap();
        }
        out
    }

    #[test]
    fn test_memory_lookup() {
        let mut assets = MemoryAssets::new();
        assets.insert("gig-dark", tiny_png());

        let img = block_on(assets.load_template(&TemplateRef("gig-dark".into()))).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_template() {
        let assets = MemoryAssets::new();
        let result = block_on(assets.load_template(&TemplateRef("nope".into())));
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[test]
    fn test_decode_dimensions() {
        let (w, h) = decode_dimensions(&tiny_png()).unwrap();
        assert_eq!((w, h), (3, 2));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode_image(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }

    #[test]
    fn test_insert_logo_supplies_decoded_dimensions() {
        let canvas = CanvasSpec::new(800.0, 800.0);
        let mut comp = Composition::new();

        let id = insert_logo(&mut comp, &canvas, &tiny_png()).unwrap();
        let logo = comp.get_logo(id).unwrap();
        assert_eq!((logo.source_width, logo.source_height), (3, 2));
        assert_eq!(comp.active, Some(id));
        // Display box keeps the decoded 3:2 aspect.
        assert!((logo.width / logo.height - 1.5).abs() < 0.01);
    }

    #[test]
    fn test_insert_logo_rejects_undecodable_bytes() {
        let canvas = CanvasSpec::new(800.0, 800.0);
        let mut comp = Composition::new();

        let result = insert_logo(&mut comp, &canvas, &[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(result, Err(AssetError::Decode(_))));
        assert!(comp.is_empty());
    }
}
