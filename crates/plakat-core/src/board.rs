//! Canvas settings and the layer store.
//!
//! The [`Composition`] is the single source of truth for both the live
//! on-screen view and the export pipeline: whatever order and geometry it
//! holds is exactly what gets rasterized.

use crate::color::Color;
use crate::geometry::clamp_position;
use crate::layers::{
    FontFamily, FontWeight, LayerId, LayerRef, LogoFormat, LogoLayer, TextLayer,
};
use kurbo::{Point, Size};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default display box for a freshly inserted logo.
const DEFAULT_LOGO_BOX: f64 = 160.0;
/// Offset applied per existing layer so stacked inserts don't fully overlap.
const INSERT_STAGGER: f64 = 24.0;

/// Errors raised by the layer store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported image format for logo data")]
    UnsupportedFormat,
    #[error("Unknown layer: {0}")]
    UnknownLayer(LayerId),
}

/// Opaque reference to a background template image. The engine never
/// interprets it; the asset source collaborator resolves it to pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef(pub String);

/// Per-session canvas settings.
///
/// Width, height and export scale are fixed for the session; background
/// color and template are the only fields the surrounding chrome mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasSpec {
    /// Logical width in display units.
    pub width: f64,
    /// Logical height in display units.
    pub height: f64,
    /// Background fill color.
    pub background: Color,
    /// Ratio of export pixel size to display size.
    pub export_scale: f64,
    /// Currently selected background template, if any.
    pub template: Option<TemplateRef>,
}

impl CanvasSpec {
    /// Create a canvas with a white background and 1:1 export scale.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: Color::white(),
            export_scale: 1.0,
            template: None,
        }
    }

    /// Set the export scale factor.
    pub fn with_export_scale(mut self, scale: f64) -> Self {
        self.export_scale = scale;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Set the background template reference.
    pub fn with_template(mut self, template: TemplateRef) -> Self {
        self.template = Some(template);
        self
    }

    /// Logical size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Export raster size in pixels.
    pub fn export_size(&self) -> Size {
        Size::new(self.width * self.export_scale, self.height * self.export_scale)
    }
}

/// Partial update for a text layer. `None` fields are left untouched.
/// Position and size fields must be pre-clamped by the caller; the store
/// is a pure data container and performs no clamping itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextPatch {
    pub content: Option<String>,
    pub position: Option<Point>,
    pub font_size: Option<f64>,
    pub font_family: Option<FontFamily>,
    pub font_weight: Option<FontWeight>,
    pub color: Option<Color>,
    pub editing: Option<bool>,
}

/// Partial update for a logo layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoPatch {
    pub position: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// The layer store: ordered text and logo collections plus selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composition {
    /// Unique composition identifier.
    pub id: String,
    /// Text layers in insertion order.
    pub texts: Vec<TextLayer>,
    /// Logo layers in insertion order.
    pub logos: Vec<LogoLayer>,
    /// The at-most-one active layer.
    pub active: Option<LayerId>,
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}

impl Composition {
    /// Create a new empty composition.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            texts: Vec::new(),
            logos: Vec::new(),
            active: None,
        }
    }

    /// Insert a new text layer near the canvas center, staggered by the
    /// number of existing layers so repeated inserts stay distinguishable.
    /// The new layer becomes active and enters edit mode.
    pub fn add_text(&mut self, canvas: &CanvasSpec, content: impl Into<String>) -> LayerId {
        let mut layer = TextLayer::new(Point::ZERO, content.into());
        let size = layer.approximate_size();
        let stagger = self.layer_count() as f64 * INSERT_STAGGER;
        let proposed = Point::new(
            (canvas.width - size.width) / 2.0 + stagger,
            (canvas.height - size.height) / 2.0 + stagger,
        );
        layer.position = clamp_position(canvas.size(), size, proposed);
        layer.editing = true;

        let id = layer.id;
        debug!("add text layer {id}");
        self.texts.push(layer);
        self.active = Some(id);
        id
    }

    /// Insert a new logo layer from raw image bytes. The display box fits
    /// the source aspect ratio inside the default box, centered on the
    /// canvas. The new layer becomes active.
    ///
    /// `source_width`/`source_height` are the decoded pixel dimensions,
    /// supplied by the image-loading collaborator.
    pub fn add_logo(
        &mut self,
        canvas: &CanvasSpec,
        data: &[u8],
        source_width: u32,
        source_height: u32,
    ) -> Result<LayerId, StoreError> {
        let format = LogoFormat::from_magic_bytes(data).ok_or(StoreError::UnsupportedFormat)?;

        let layer = LogoLayer::new(Point::ZERO, data, source_width, source_height, format)
            .fit_within(DEFAULT_LOGO_BOX, DEFAULT_LOGO_BOX);
        let size = layer.size();
        let stagger = self.layer_count() as f64 * INSERT_STAGGER;
        let proposed = Point::new(
            (canvas.width - size.width) / 2.0 + stagger,
            (canvas.height - size.height) / 2.0 + stagger,
        );
        let mut layer = layer;
        layer.position = clamp_position(canvas.size(), size, proposed);

        let id = layer.id;
        debug!("add logo layer {id} ({source_width}x{source_height} {:?})", layer.format);
        self.logos.push(layer);
        self.active = Some(id);
        Ok(id)
    }

    /// Merge a partial update into a text layer. Returns false if the id is
    /// unknown (or refers to a logo).
    pub fn update_text(&mut self, id: LayerId, patch: TextPatch) -> bool {
        let Some(layer) = self.texts.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if let Some(content) = patch.content {
            layer.content = content;
        }
        if let Some(position) = patch.position {
            layer.position = position;
        }
        if let Some(font_size) = patch.font_size {
            layer.font_size = font_size;
        }
        if let Some(font_family) = patch.font_family {
            layer.font_family = font_family;
        }
        if let Some(font_weight) = patch.font_weight {
            layer.font_weight = font_weight;
        }
        if let Some(color) = patch.color {
            layer.color = color;
        }
        if let Some(editing) = patch.editing {
            layer.editing = editing;
        }
        true
    }

    /// Merge a partial update into a logo layer. Returns false if the id is
    /// unknown (or refers to a text layer).
    pub fn update_logo(&mut self, id: LayerId, patch: LogoPatch) -> bool {
        let Some(layer) = self.logos.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        if let Some(position) = patch.position {
            layer.position = position;
        }
        if let Some(width) = patch.width {
            layer.width = width;
        }
        if let Some(height) = patch.height {
            layer.height = height;
        }
        true
    }

    /// Remove a layer from whichever collection holds it. Clears the
    /// selection if the removed layer was active.
    pub fn remove(&mut self, id: LayerId) -> bool {
        let before = self.layer_count();
        self.texts.retain(|t| t.id != id);
        self.logos.retain(|l| l.id != id);
        let removed = self.layer_count() != before;
        if removed {
            debug!("removed layer {id}");
            if self.active == Some(id) {
                self.active = None;
            }
        }
        removed
    }

    /// Set (or clear) the active layer. Selecting an unknown id clears the
    /// selection. Does not alter insertion order.
    pub fn select(&mut self, id: Option<LayerId>) {
        self.active = id.filter(|&id| self.get(id).is_some());
        // Leaving edit mode is implied for every text layer that is no
        // longer the active one.
        let active = self.active;
        for text in &mut self.texts {
            if Some(text.id) != active {
                text.editing = false;
            }
        }
    }

    /// Look up a layer by id.
    pub fn get(&self, id: LayerId) -> Option<LayerRef<'_>> {
        self.texts
            .iter()
            .find(|t| t.id == id)
            .map(LayerRef::Text)
            .or_else(|| self.logos.iter().find(|l| l.id == id).map(LayerRef::Logo))
    }

    /// Look up a text layer by id.
    pub fn get_text(&self, id: LayerId) -> Option<&TextLayer> {
        self.texts.iter().find(|t| t.id == id)
    }

    /// Look up a logo layer by id.
    pub fn get_logo(&self, id: LayerId) -> Option<&LogoLayer> {
        self.logos.iter().find(|l| l.id == id)
    }

    /// The currently active layer, if any.
    pub fn active_layer(&self) -> Option<LayerRef<'_>> {
        self.active.and_then(|id| self.get(id))
    }

    /// All layers in insertion order: texts first, then logos.
    pub fn layers(&self) -> impl Iterator<Item = LayerRef<'_>> {
        self.texts
            .iter()
            .map(LayerRef::Text)
            .chain(self.logos.iter().map(LayerRef::Logo))
    }

    /// Layer ids in display order: insertion order with the active layer
    /// promoted last (topmost). This is a view-time affordance only; the
    /// underlying collections are never reordered.
    pub fn display_order(&self) -> Vec<LayerId> {
        let mut order: Vec<LayerId> = self
            .layers()
            .map(|l| l.id())
            .filter(|&id| Some(id) != self.active)
            .collect();
        if let Some(active) = self.active {
            if self.get(active).is_some() {
                order.push(active);
            }
        }
        order
    }

    /// Total number of layers.
    pub fn layer_count(&self) -> usize {
        self.texts.len() + self.logos.len()
    }

    /// Check if the composition holds no layers.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.logos.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
