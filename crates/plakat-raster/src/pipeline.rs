//! The rasterization pipeline.
//!
//! Flattens a composition snapshot onto a fresh offscreen surface at the
//! canvas export scale: background fill, contain-fitted template, then
//! every layer in a deterministic order. Logo decodes run concurrently
//! but draws are issued strictly in order, so stacking never depends on
//! decode timing. Each render targets its own surface; two in-flight
//! exports share nothing.

use crate::assets::{AssetSource, decode_image};
use crate::error::RasterResult;
use crate::fonts::FontCatalog;
use crate::surface;
use futures::future;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use kurbo::Size;
use log::warn;
use plakat_core::BoxFuture;
use plakat_core::board::{CanvasSpec, Composition};
use plakat_core::geometry::contain_fit;
use plakat_core::layers::{LINE_GAP, LayerId, TextLayer};
use std::collections::HashMap;
use std::sync::Arc;

/// Which order layers are flattened in.
///
/// Interactive display promotes the active layer above everything else,
/// but that promotion is transient. The export default ignores it so the
/// same composition always flattens the same way regardless of what
/// happened to be selected when the user hit export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderOrder {
    /// Insertion order of the collections (texts, then logos).
    #[default]
    Insertion,
    /// Insertion order with the active layer drawn last, matching the
    /// interactive display.
    ActiveLast,
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
}

/// The renderer: asset source, registered fonts and flatten order.
pub struct Renderer {
    assets: Arc<dyn AssetSource>,
    fonts: FontCatalog,
    order: RenderOrder,
}

impl Renderer {
    /// Create a renderer over an asset source with no registered fonts.
    pub fn new(assets: Arc<dyn AssetSource>) -> Self {
        Self {
            assets,
            fonts: FontCatalog::new(),
            order: RenderOrder::default(),
        }
    }

    /// Set the flatten order.
    pub fn with_order(mut self, order: RenderOrder) -> Self {
        self.order = order;
        self
    }

    /// Replace the font catalog.
    pub fn with_fonts(mut self, fonts: FontCatalog) -> Self {
        self.fonts = fonts;
        self
    }

    /// Mutable access to the font catalog for registration.
    pub fn fonts_mut(&mut self) -> &mut FontCatalog {
        &mut self.fonts
    }

    /// Rasterize a composition to a PNG at the canvas export scale.
    ///
    /// The composition is snapshotted at call time, before the returned
    /// future runs, so mutations made while the render is in flight do
    /// not tear the output. Missing templates, undecodable logos and
    /// unregistered fonts are logged and skipped; only surface
    /// allocation and encoding fail the call.
    pub fn render(
        &self,
        composition: &Composition,
        canvas: &CanvasSpec,
    ) -> BoxFuture<'_, RasterResult<RenderedImage>> {
        let snapshot = composition.clone();
        let canvas = canvas.clone();
        Box::pin(async move { self.render_snapshot(snapshot, canvas).await })
    }

    async fn render_snapshot(
        &self,
        snapshot: Composition,
        canvas: CanvasSpec,
    ) -> RasterResult<RenderedImage> {
        let scale = canvas.export_scale;
        let width = (canvas.width * scale).round() as u32;
        let height = (canvas.height * scale).round() as u32;

        let mut out = surface::alloc(width, height, canvas.background.rgba8())?;

        if let Some(template) = &canvas.template {
            match self.assets.load_template(template).await {
                Ok(img) => draw_template(&mut out, &img, canvas.export_size()),
                Err(err) => {
                    warn!(
                        "template '{}' unavailable, rendering plain background: {err}",
                        template.0
                    );
                }
            }
        }

        // Decode every logo concurrently. Draws below still walk the
        // flatten order, so stacking is independent of decode timing.
        let decoded: HashMap<LayerId, RgbaImage> =
            future::join_all(snapshot.logos.iter().map(|logo| async move {
                let pixels = logo
                    .data()
                    .ok_or_else(|| "corrupt base64 payload".to_string())
                    .and_then(|bytes| decode_image(&bytes).map_err(|e| e.to_string()));
                (logo.id(), pixels)
            }))
            .await
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(pixels) => Some((id, pixels)),
                Err(err) => {
                    warn!("skipping logo {id}: {err}");
                    None
                }
            })
            .collect();

        let order: Vec<LayerId> = match self.order {
            RenderOrder::Insertion => snapshot.layers().map(|l| l.id()).collect(),
            RenderOrder::ActiveLast => snapshot.display_order(),
        };

        for id in order {
            if let Some(text) = snapshot.get_text(id) {
                self.draw_text(&mut out, text, scale);
            } else if let Some(logo) = snapshot.get_logo(id) {
                let Some(pixels) = decoded.get(&id) else {
                    continue;
                };
                let w = (logo.width * scale).round() as u32;
                let h = (logo.height * scale).round() as u32;
                if w == 0 || h == 0 {
                    continue;
                }
                let scaled = imageops::resize(pixels, w, h, FilterType::Triangle);
                surface::blit(
                    &mut out,
                    &scaled,
                    (logo.position.x * scale).round() as i64,
                    (logo.position.y * scale).round() as i64,
                );
            }
        }

        let png = surface::encode_png(&out)?;
        Ok(RenderedImage { png, width, height })
    }

    /// Draw a text layer line by line. The first baseline sits at the
    /// layer origin; each further line advances by the scaled font size
    /// plus the line gap.
    fn draw_text(&self, out: &mut RgbaImage, layer: &TextLayer, scale: f64) {
        let Some(font) = self.fonts.get(layer.font_family, layer.font_weight) else {
            warn!(
                "no font registered for {:?}/{:?}, skipping text layer {}",
                layer.font_family,
                layer.font_weight,
                layer.id()
            );
            return;
        };

        let px = (layer.font_size * scale) as f32;
        let color = layer.color.rgba8();
        let advance = (layer.font_size + LINE_GAP) * scale;

        for (i, line) in layer.lines().iter().enumerate() {
            let baseline = layer.position.y * scale + i as f64 * advance;
            let mut cursor = layer.position.x * scale;
            for ch in line.chars() {
                let (metrics, bitmap) = font.rasterize(ch, px);
                let gx = cursor + metrics.xmin as f64;
                let gy = baseline - (metrics.height as f64 + metrics.ymin as f64);
                blend_glyph(out, &bitmap, metrics.width, gx, gy, color);
                cursor += metrics.advance_width as f64;
            }
        }
    }
}

/// Contain-fit the template into the export raster and draw it centered.
fn draw_template(out: &mut RgbaImage, template: &RgbaImage, export_size: Size) {
    let src = Size::new(template.width() as f64, template.height() as f64);
    let dst = contain_fit(src, export_size);
    let w = dst.width().round() as u32;
    let h = dst.height().round() as u32;
    if w == 0 || h == 0 {
        return;
    }
    let scaled = imageops::resize(template, w, h, FilterType::Triangle);
    surface::blit(out, &scaled, dst.x0.round() as i64, dst.y0.round() as i64);
}

/// Blend a glyph coverage bitmap at a pixel position.
fn blend_glyph(
    out: &mut RgbaImage,
    bitmap: &[u8],
    glyph_width: usize,
    x: f64,
    y: f64,
    color: [u8; 4],
) {
    if glyph_width == 0 {
        return;
    }
    let x0 = x.round() as i64;
    let y0 = y.round() as i64;
    for (idx, &coverage) in bitmap.iter().enumerate() {
        let tx = x0 + (idx % glyph_width) as i64;
        let ty = y0 + (idx / glyph_width) as i64;
        if tx < 0 || ty < 0 || tx >= out.width() as i64 || ty >= out.height() as i64 {
            continue;
        }
        surface::blend_coverage(out.get_pixel_mut(tx as u32, ty as u32), color, coverage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MemoryAssets, NoAssets};
    use crate::error::RasterError;
    use image::Rgba;
    use plakat_core::Color;
    use plakat_core::block_on;
    use plakat_core::board::{LogoPatch, TemplateRef, TextPatch};
    use plakat_core::layers::{FontFamily, FontWeight};
    use kurbo::Point;

    const TEST_FONT: &[u8] = include_bytes!("../fixtures/test-font.ttf");

    fn encoded_square(side: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(side, side, Rgba(rgba));
        surface::encode_png(&img).unwrap()
    }

    fn decode(rendered: &RenderedImage) -> RgbaImage {
        image::load_from_memory(&rendered.png).unwrap().to_rgba8()
    }

    fn renderer() -> Renderer {
        Renderer::new(Arc::new(NoAssets))
    }

    fn renderer_with_font() -> Renderer {
        let mut fonts = FontCatalog::new();
        fonts
            .register(FontFamily::Sans, FontWeight::Regular, TEST_FONT)
            .unwrap();
        Renderer::new(Arc::new(NoAssets)).with_fonts(fonts)
    }

    /// Count non-white pixels inside a window.
    fn ink_in(img: &RgbaImage, x0: u32, x1: u32, y0: u32, y1: u32) -> usize {
        let mut count = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                if img.get_pixel(x, y).0 != [255, 255, 255, 255] {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_empty_composition_dimensions_and_fill() {
        let _ = env_logger::builder().is_test(true).try_init();
        let canvas = CanvasSpec::new(100.0, 80.0)
            .with_export_scale(2.0)
            .with_background(Color::from_hex("#ff8000"));
        let comp = Composition::new();

        let rendered = block_on(renderer().render(&comp, &canvas)).unwrap();
        assert_eq!((rendered.width, rendered.height), (200, 160));

        let img = decode(&rendered);
        assert_eq!(img.get_pixel(0, 0).0, [255, 128, 0, 255]);
        assert_eq!(img.get_pixel(199, 159).0, [255, 128, 0, 255]);
    }

    #[test]
    fn test_degenerate_canvas_is_allocation_error() {
        let canvas = CanvasSpec::new(0.0, 100.0);
        let comp = Composition::new();
        let result = block_on(renderer().render(&comp, &canvas));
        assert!(matches!(result, Err(RasterError::SurfaceAllocation { .. })));
    }

    #[test]
    fn test_template_contain_fit_centered() {
        let mut assets = MemoryAssets::new();
        let template = RgbaImage::from_pixel(100, 50, Rgba([0, 0, 255, 255]));
        assets.insert("band", surface::encode_png(&template).unwrap());

        let canvas = CanvasSpec::new(200.0, 200.0)
            .with_template(TemplateRef("band".into()));
        let comp = Composition::new();

        let renderer = Renderer::new(Arc::new(assets));
        let img = decode(&block_on(renderer.render(&comp, &canvas)).unwrap());

        // 2:1 template in a square canvas spans the width, centered
        // vertically: rows 50..150 are template, the rest background.
        assert_eq!(img.get_pixel(100, 100).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(100, 10).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(100, 190).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_missing_template_renders_background() {
        let canvas = CanvasSpec::new(50.0, 50.0)
            .with_template(TemplateRef("ghost".into()));
        let comp = Composition::new();

        let img = decode(&block_on(renderer().render(&comp, &canvas)).unwrap());
        assert_eq!(img.get_pixel(25, 25).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_logo_placement_scales_with_export() {
        let canvas = CanvasSpec::new(100.0, 100.0).with_export_scale(2.0);
        let mut comp = Composition::new();
        let id = comp
            .add_logo(&canvas, &encoded_square(10, [255, 0, 0, 255]), 10, 10)
            .unwrap();
        comp.update_logo(
            id,
            LogoPatch {
                position: Some(Point::new(30.0, 40.0)),
                width: Some(20.0),
                height: Some(10.0),
            },
        );
        comp.select(None);

        let img = decode(&block_on(renderer().render(&comp, &canvas)).unwrap());
        // Center of the 20x10 box at (30,40), scaled by 2.
        assert_eq!(img.get_pixel(80, 90).0, [255, 0, 0, 255]);
        // Outside the box: untouched background.
        assert_eq!(img.get_pixel(10, 10).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(80, 110).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_undecodable_logo_is_skipped() {
        let canvas = CanvasSpec::new(100.0, 100.0);
        let mut comp = Composition::new();
        // Valid PNG magic but no image behind it: accepted by the store,
        // rejected by the decoder at render time.
        let magic = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let bad = comp.add_logo(&canvas, &magic, 10, 10).unwrap();
        let good = comp
            .add_logo(&canvas, &encoded_square(10, [0, 255, 0, 255]), 10, 10)
            .unwrap();
        comp.update_logo(
            bad,
            LogoPatch {
                position: Some(Point::new(0.0, 0.0)),
                ..Default::default()
            },
        );
        comp.update_logo(
            good,
            LogoPatch {
                position: Some(Point::new(50.0, 50.0)),
                width: Some(10.0),
                height: Some(10.0),
            },
        );
        comp.select(None);

        let rendered = block_on(renderer().render(&comp, &canvas)).unwrap();
        let img = decode(&rendered);
        assert_eq!(img.get_pixel(55, 55).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_insertion_order_ignores_selection() {
        let canvas = CanvasSpec::new(100.0, 100.0);
        let mut comp = Composition::new();
        let red = comp
            .add_logo(&canvas, &encoded_square(10, [255, 0, 0, 255]), 10, 10)
            .unwrap();
        let blue = comp
            .add_logo(&canvas, &encoded_square(10, [0, 0, 255, 255]), 10, 10)
            .unwrap();
        // Fully overlapping boxes.
        for id in [red, blue] {
            comp.update_logo(
                id,
                LogoPatch {
                    position: Some(Point::new(20.0, 20.0)),
                    width: Some(10.0),
                    height: Some(10.0),
                },
            );
        }
        comp.select(Some(red));

        let img = decode(&block_on(renderer().render(&comp, &canvas)).unwrap());
        // Selection does not promote: blue was inserted later and wins.
        assert_eq!(img.get_pixel(25, 25).0, [0, 0, 255, 255]);

        let display = Renderer::new(Arc::new(NoAssets)).with_order(RenderOrder::ActiveLast);
        let img = decode(&block_on(display.render(&comp, &canvas)).unwrap());
        assert_eq!(img.get_pixel(25, 25).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_rerender_is_pixel_identical() {
        let canvas = CanvasSpec::new(100.0, 100.0).with_export_scale(1.5);
        let mut comp = Composition::new();
        comp.add_logo(&canvas, &encoded_square(8, [10, 200, 30, 255]), 8, 8)
            .unwrap();
        comp.add_text(&canvas, "Hello");

        let r = renderer_with_font();
        let first = block_on(r.render(&comp, &canvas)).unwrap();
        let second = block_on(r.render(&comp, &canvas)).unwrap();
        assert_eq!(first.png, second.png);
        assert_eq!((first.width, first.height), (150, 150));
    }

    #[test]
    fn test_glyph_run_anchors_at_baseline() {
        // 800x800, white background, "Hello" at (200,200) in #111827:
        // the glyph run sits above a baseline at y=200 starting at x=200.
        let canvas = CanvasSpec::new(800.0, 800.0);
        let mut comp = Composition::new();
        let id = comp.add_text(&canvas, "Hello");
        comp.update_text(
            id,
            TextPatch {
                position: Some(Point::new(200.0, 200.0)),
                color: Some(Color::from_hex("#111827")),
                ..Default::default()
            },
        );

        let rendered = block_on(renderer_with_font().render(&comp, &canvas)).unwrap();
        assert_eq!((rendered.width, rendered.height), (800, 800));
        let img = decode(&rendered);

        // Ink above the baseline, within one font size of it.
        assert!(ink_in(&img, 200, 340, 164, 201) > 0);
        // "Hello" has no descenders: nothing well below the baseline.
        assert_eq!(ink_in(&img, 200, 340, 208, 280), 0);
        // Nothing above the ascent or left of the origin.
        assert_eq!(ink_in(&img, 200, 340, 0, 150), 0);
        assert_eq!(ink_in(&img, 0, 198, 100, 300), 0);

        // Full-coverage stem pixels carry the fill color.
        let dark = (164..201)
            .flat_map(|y| (200..340).map(move |x| (x, y)))
            .any(|(x, y)| img.get_pixel(x, y).0 == [0x11, 0x18, 0x27, 255]);
        assert!(dark);
    }

    #[test]
    fn test_multiline_baseline_advance() {
        // Two lines at 36pt advance the baseline by 36 + 4 per line.
        let canvas = CanvasSpec::new(400.0, 400.0);
        let mut comp = Composition::new();
        let id = comp.add_text(&canvas, "Hi\nHi");
        comp.update_text(
            id,
            TextPatch {
                position: Some(Point::new(100.0, 100.0)),
                ..Default::default()
            },
        );

        let img = decode(&block_on(renderer_with_font().render(&comp, &canvas)).unwrap());
        // First line above the y=100 baseline, second above y=140.
        assert!(ink_in(&img, 100, 180, 64, 101) > 0);
        assert!(ink_in(&img, 100, 180, 104, 141) > 0);
        // Nothing below the second baseline.
        assert_eq!(ink_in(&img, 100, 180, 148, 250), 0);
    }

    #[test]
    fn test_glyph_baseline_scales_with_export() {
        let canvas = CanvasSpec::new(400.0, 400.0).with_export_scale(2.0);
        let mut comp = Composition::new();
        let id = comp.add_text(&canvas, "Hello");
        comp.update_text(
            id,
            TextPatch {
                position: Some(Point::new(100.0, 100.0)),
                ..Default::default()
            },
        );

        let img = decode(&block_on(renderer_with_font().render(&comp, &canvas)).unwrap());
        // Baseline lands at 100 * 2 in export pixels; glyphs are double
        // size, so ink spans up to two font sizes above it.
        assert!(ink_in(&img, 200, 480, 128, 201) > 0);
        assert_eq!(ink_in(&img, 200, 480, 212, 380), 0);
    }

    #[test]
    fn test_text_without_font_degrades_to_background() {
        let canvas = CanvasSpec::new(800.0, 800.0);
        let mut comp = Composition::new();
        let id = comp.add_text(&canvas, "Hello");
        comp.update_text(
            id,
            TextPatch {
                position: Some(Point::new(200.0, 200.0)),
                color: Some(Color::from_hex("#111827")),
                ..Default::default()
            },
        );

        let rendered = block_on(renderer().render(&comp, &canvas)).unwrap();
        assert_eq!((rendered.width, rendered.height), (800, 800));
        let img = decode(&rendered);
        assert_eq!(img.get_pixel(210, 210).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_mutation_after_call_does_not_tear() {
        // The snapshot is taken when render() is called, so mutating the
        // store before the future is polled must not affect the output.
        let canvas = CanvasSpec::new(50.0, 50.0);
        let mut comp = Composition::new();
        let id = comp
            .add_logo(&canvas, &encoded_square(8, [255, 0, 0, 255]), 8, 8)
            .unwrap();
        comp.update_logo(
            id,
            LogoPatch {
                position: Some(Point::new(10.0, 10.0)),
                width: Some(10.0),
                height: Some(10.0),
            },
        );

        let r = renderer();
        let pending = r.render(&comp, &canvas);
        comp.remove(id);

        let img = decode(&block_on(pending).unwrap());
        assert_eq!(img.get_pixel(15, 15).0, [255, 0, 0, 255]);
    }
}
