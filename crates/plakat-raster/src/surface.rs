//! CPU compositing surface.
//!
//! All drawing happens on an RGBA byte surface with source-over blending.
//! Blits clip against the surface edges so callers can place content
//! partially outside the canvas without guarding.

use crate::error::{RasterError, RasterResult};
use image::{Rgba, RgbaImage};

/// Refuse surfaces past this edge length. Keeps a bad export scale from
/// turning into a multi-gigabyte allocation.
pub const MAX_SURFACE_DIM: u32 = 16_384;

/// Allocate a surface filled with a background color.
pub fn alloc(width: u32, height: u32, background: [u8; 4]) -> RasterResult<RgbaImage> {
    if width == 0 || height == 0 || width > MAX_SURFACE_DIM || height > MAX_SURFACE_DIM {
        return Err(RasterError::SurfaceAllocation { width, height });
    }
    Ok(RgbaImage::from_pixel(width, height, Rgba(background)))
}

/// Source-over blend of one pixel.
pub fn blend_pixel(dst: &mut Rgba<u8>, src: [u8; 4]) {
    let sa = src[3] as u32;
    if sa == 0 {
        return;
    }
    if sa == 255 {
        *dst = Rgba(src);
        return;
    }
    let da = dst.0[3] as u32;
    let out_a = sa + da * (255 - sa) / 255;
    if out_a == 0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let s = src[i] as u32;
        let d = dst.0[i] as u32;
        dst.0[i] = ((s * sa + d * da * (255 - sa) / 255) / out_a) as u8;
    }
    dst.0[3] = out_a as u8;
}

/// Blend a color through a coverage mask value, as produced by glyph
/// rasterization.
pub fn blend_coverage(dst: &mut Rgba<u8>, color: [u8; 4], coverage: u8) {
    if coverage == 0 {
        return;
    }
    let alpha = (color[3] as u32 * coverage as u32 / 255) as u8;
    blend_pixel(dst, [color[0], color[1], color[2], alpha]);
}

/// Blit an image onto the surface at a position, blending and clipping.
pub fn blit(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    for (sx, sy, px) in src.enumerate_pixels() {
        let tx = x + sx as i64;
        let ty = y + sy as i64;
        if tx < 0 || ty < 0 || tx >= dst.width() as i64 || ty >= dst.height() as i64 {
            continue;
        }
        blend_pixel(dst.get_pixel_mut(tx as u32, ty as u32), px.0);
    }
}

/// Encode a surface as a PNG byte stream.
pub fn encode_png(surface: &RgbaImage) -> RasterResult<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(surface.as_raw())?;
    }
    Ok(out)
}
