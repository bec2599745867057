//! Pure constraint math: position/size clamping and fit computations.
//!
//! Everything here is a pure function over pre-validated numeric input;
//! out-of-bounds proposals are corrected by clamping, never reported as
//! errors.

use kurbo::{Point, Rect, Size};

/// Smallest font size a text layer may be resized to.
pub const MIN_FONT_SIZE: f64 = 12.0;
/// Largest font size a text layer may be resized to.
pub const MAX_FONT_SIZE: f64 = 72.0;
/// Smallest width/height a logo layer may be resized to.
pub const MIN_LOGO_DIM: f64 = 24.0;
/// Pixels of vertical resize drag per point of font size change.
pub const FONT_RESIZE_DIVISOR: f64 = 6.0;

/// Clamp a proposed layer size to the floor and to the canvas bounds.
///
/// The ceiling is the canvas itself: a layer can never be larger than the
/// surface it sits on, which in turn guarantees `clamp_position` always has
/// a valid placement.
pub fn clamp_size(canvas: Size, min: Size, proposed: Size) -> Size {
    Size::new(
        proposed.width.max(min.width).min(canvas.width),
        proposed.height.max(min.height).min(canvas.height),
    )
}

/// Clamp a proposed top-left position so the layer's box stays fully inside
/// the canvas. Assumes `layer_size` has already been clamped to fit.
pub fn clamp_position(canvas: Size, layer_size: Size, proposed: Point) -> Point {
    let max_x = (canvas.width - layer_size.width).max(0.0);
    let max_y = (canvas.height - layer_size.height).max(0.0);
    Point::new(
        proposed.x.clamp(0.0, max_x),
        proposed.y.clamp(0.0, max_y),
    )
}

/// Map a vertical resize drag to a new font size.
///
/// Coarse heuristic: every `FONT_RESIZE_DIVISOR` pixels of drag changes the
/// font size by one point, clamped to `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
pub fn font_size_from_resize(base: f64, delta_height: f64) -> f64 {
    (base + delta_height / FONT_RESIZE_DIVISOR)
        .round()
        .clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Compute a "contain" fit: scale `src` uniformly so it is fully visible
/// inside `dst` without cropping, centered.
pub fn contain_fit(src: Size, dst: Size) -> Rect {
    if src.width <= 0.0 || src.height <= 0.0 {
        return Rect::ZERO;
    }
    let scale = (dst.width / src.width).min(dst.height / src.height);
    let w = src.width * scale;
    let h = src.height * scale;
    let x = (dst.width - w) / 2.0;
    let y = (dst.height - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}
