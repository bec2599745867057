//! Layer definitions for the composition.

mod logo;
mod text;

pub use logo::{LogoFormat, LogoLayer};
pub use text::{
    FontFamily, FontWeight, LINE_GAP, TEXT_PADDING, TextLayer, approximate_text_size, split_lines,
};

use kurbo::{Point, Rect, Size};
use uuid::Uuid;

/// Unique identifier for layers. Generated at creation and never reused
/// within a session.
pub type LayerId = Uuid;

/// A reference to either kind of layer, for code that walks the
/// composition without caring which collection a layer lives in.
#[derive(Debug, Clone, Copy)]
pub enum LayerRef<'a> {
    Text(&'a TextLayer),
    Logo(&'a LogoLayer),
}

impl LayerRef<'_> {
    pub fn id(&self) -> LayerId {
        match self {
            LayerRef::Text(t) => t.id,
            LayerRef::Logo(l) => l.id,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            LayerRef::Text(t) => t.bounds(),
            LayerRef::Logo(l) => l.bounds(),
        }
    }

    pub fn position(&self) -> Point {
        match self {
            LayerRef::Text(t) => t.position,
            LayerRef::Logo(l) => l.position,
        }
    }

    pub fn size(&self) -> Size {
        self.bounds().size()
    }

    pub fn hit_test(&self, point: Point) -> bool {
        match self {
            LayerRef::Text(t) => t.hit_test(point),
            LayerRef::Logo(l) => l.hit_test(point),
        }
    }
}
