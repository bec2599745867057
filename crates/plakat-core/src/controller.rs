//! Interaction controller: bridges pointer input to layer store mutations,
//! applying geometry clamping at every step.

use crate::board::{CanvasSpec, Composition, LogoPatch, TextPatch};
use crate::geometry::{
    MIN_LOGO_DIM, clamp_position, clamp_size, font_size_from_resize,
};
use crate::input::{InputState, PointerEvent};
use crate::layers::{LayerId, LayerRef};
use kurbo::{Point, Rect, Size, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in canvas units.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;

/// Corner resize handle positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A resize handle with its position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in canvas coordinates.
    pub position: Point,
    /// Which corner this handle sits on.
    pub corner: Corner,
}

impl Handle {
    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// The four corner handles of a bounding box.
pub fn corner_handles(bounds: Rect) -> [Handle; 4] {
    [
        Handle { position: Point::new(bounds.x0, bounds.y0), corner: Corner::TopLeft },
        Handle { position: Point::new(bounds.x1, bounds.y0), corner: Corner::TopRight },
        Handle { position: Point::new(bounds.x0, bounds.y1), corner: Corner::BottomLeft },
        Handle { position: Point::new(bounds.x1, bounds.y1), corner: Corner::BottomRight },
    ]
}

/// Find which corner handle (if any) is hit at the given point.
pub fn hit_test_handles(bounds: Rect, point: Point, tolerance: f64) -> Option<Corner> {
    corner_handles(bounds)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.corner)
}

/// What the active drag is doing.
#[derive(Debug, Clone)]
enum DragKind {
    /// Moving the whole layer; offset between pointer and the layer's
    /// top-left at press time.
    Move { grab_offset: Vec2 },
    /// Resizing from a corner handle.
    Resize {
        corner: Corner,
        start_bounds: Rect,
        /// Font size at press time (text layers only).
        start_font_size: Option<f64>,
    },
}

/// State of an in-progress drag.
#[derive(Debug, Clone)]
struct DragState {
    layer: LayerId,
    start_point: Point,
    kind: DragKind,
}

/// Translates pointer press/move/release into clamped store mutations.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    drag: Option<DragState>,
}

impl Controller {
    /// Create a new controller with no drag in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag or resize is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Feed a pointer event through the input state and into the store.
    pub fn handle(
        &mut self,
        comp: &mut Composition,
        canvas: &CanvasSpec,
        input: &mut InputState,
        event: PointerEvent,
    ) {
        input.handle(event);
        match event {
            PointerEvent::Down { position } => {
                self.press(comp, position, input.is_double_press());
            }
            PointerEvent::Move { position } => {
                if input.pressed {
                    self.drag_to(comp, canvas, position);
                }
            }
            PointerEvent::Up { .. } => self.release(),
        }
    }

    /// Handle a pointer press. Hit-tests the active layer's resize handles
    /// first, then layers front-to-back in display order. A double press on
    /// the already-active layer deletes it immediately.
    pub fn press(&mut self, comp: &mut Composition, point: Point, double_press: bool) {
        // Resize handles only exist on the active layer.
        if let Some(active) = comp.active_layer() {
            let bounds = active.bounds();
            if let Some(corner) = hit_test_handles(bounds, point, HANDLE_HIT_TOLERANCE) {
                let start_font_size = match active {
                    LayerRef::Text(t) => Some(t.font_size),
                    LayerRef::Logo(_) => None,
                };
                self.drag = Some(DragState {
                    layer: active.id(),
                    start_point: point,
                    kind: DragKind::Resize { corner, start_bounds: bounds, start_font_size },
                });
                return;
            }
        }

        // Front-to-back hit test in display order (active layer on top).
        let hit = comp
            .display_order()
            .into_iter()
            .rev()
            .find(|&id| comp.get(id).is_some_and(|l| l.hit_test(point)));

        match hit {
            Some(id) => {
                if double_press && comp.active == Some(id) {
                    debug!("double press deletes layer {id}");
                    comp.remove(id);
                    self.drag = None;
                    return;
                }
                comp.select(Some(id));
                if let Some(layer) = comp.get(id) {
                    let pos = layer.position();
                    self.drag = Some(DragState {
                        layer: id,
                        start_point: point,
                        kind: DragKind::Move {
                            grab_offset: Vec2::new(point.x - pos.x, point.y - pos.y),
                        },
                    });
                }
            }
            None => {
                comp.select(None);
                self.drag = None;
            }
        }
    }

    /// Handle a pointer move while pressed: apply the clamped drag or
    /// resize to the store.
    pub fn drag_to(&mut self, comp: &mut Composition, canvas: &CanvasSpec, point: Point) {
        let Some(drag) = self.drag.clone() else { return };
        let Some(layer) = comp.get(drag.layer) else {
            self.drag = None;
            return;
        };

        match drag.kind {
            DragKind::Move { grab_offset } => {
                let proposed = Point::new(point.x - grab_offset.x, point.y - grab_offset.y);
                let clamped = clamp_position(canvas.size(), layer.size(), proposed);
                self.write_position(comp, drag.layer, clamped);
            }
            DragKind::Resize { corner, start_bounds, start_font_size } => {
                let delta = Vec2::new(point.x - drag.start_point.x, point.y - drag.start_point.y);
                match layer {
                    LayerRef::Text(_) => self.resize_text(
                        comp,
                        canvas,
                        drag.layer,
                        corner,
                        delta,
                        start_font_size.unwrap_or(crate::layers::TextLayer::DEFAULT_FONT_SIZE),
                    ),
                    LayerRef::Logo(_) => {
                        self.resize_logo(comp, canvas, drag.layer, corner, start_bounds, delta)
                    }
                }
            }
        }
    }

    /// Handle pointer release: the drag ends but the layer stays selected
    /// so style controls remain bound to it.
    pub fn release(&mut self) {
        self.drag = None;
    }

    /// Remove the active layer, if any. No confirmation, no undo.
    pub fn delete_active(&self, comp: &mut Composition) -> bool {
        match comp.active {
            Some(id) => comp.remove(id),
            None => false,
        }
    }

    fn write_position(&self, comp: &mut Composition, id: LayerId, position: Point) {
        if comp.get_text(id).is_some() {
            comp.update_text(id, TextPatch { position: Some(position), ..Default::default() });
        } else {
            comp.update_logo(id, LogoPatch { position: Some(position), ..Default::default() });
        }
    }

    /// Text resize: the vertical handle delta drives a font size change,
    /// which in turn re-derives the approximate box; the position is then
    /// re-clamped because a growing box can cross the canvas edge.
    fn resize_text(
        &self,
        comp: &mut Composition,
        canvas: &CanvasSpec,
        id: LayerId,
        corner: Corner,
        delta: Vec2,
        start_font_size: f64,
    ) {
        // Dragging a bottom handle down grows the box; a top handle up does.
        let grow_y = match corner {
            Corner::TopLeft | Corner::TopRight => -delta.y,
            Corner::BottomLeft | Corner::BottomRight => delta.y,
        };
        let font_size = font_size_from_resize(start_font_size, grow_y);
        comp.update_text(id, TextPatch { font_size: Some(font_size), ..Default::default() });

        let Some(layer) = comp.get_text(id) else { return };
        let size = layer.approximate_size();
        let clamped = clamp_position(canvas.size(), size, layer.position);
        comp.update_text(id, TextPatch { position: Some(clamped), ..Default::default() });
    }

    /// Logo resize: width and height follow the corner independently (no
    /// forced aspect ratio), floored and clamped, then position re-clamped.
    fn resize_logo(
        &self,
        comp: &mut Composition,
        canvas: &CanvasSpec,
        id: LayerId,
        corner: Corner,
        start: Rect,
        delta: Vec2,
    ) {
        let (x0, y0, x1, y1) = match corner {
            Corner::TopLeft => (start.x0 + delta.x, start.y0 + delta.y, start.x1, start.y1),
            Corner::TopRight => (start.x0, start.y0 + delta.y, start.x1 + delta.x, start.y1),
            Corner::BottomLeft => (start.x0 + delta.x, start.y0, start.x1, start.y1 + delta.y),
            Corner::BottomRight => (start.x0, start.y0, start.x1 + delta.x, start.y1 + delta.y),
        };
        let (x0, x1) = if x0 < x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 < y1 { (y0, y1) } else { (y1, y0) };

        let size = clamp_size(
            canvas.size(),
            Size::new(MIN_LOGO_DIM, MIN_LOGO_DIM),
            Size::new(x1 - x0, y1 - y0),
        );
        let position = clamp_position(canvas.size(), size, Point::new(x0, y0));

        comp.update_logo(
            id,
            LogoPatch {
                position: Some(position),
                width: Some(size.width),
                height: Some(size.height),
            },
        );
    }
}
