//! Plakat Core Library
//!
//! Platform-agnostic layer model, constraint geometry and interaction
//! logic for the Plakat composition engine.

pub mod board;
pub mod color;
pub mod controller;
pub mod geometry;
pub mod input;
pub mod layers;
pub mod session;

pub use board::{CanvasSpec, Composition, LogoPatch, StoreError, TemplateRef, TextPatch};
pub use color::Color;
pub use controller::{Controller, Corner, Handle, HANDLE_HIT_TOLERANCE, corner_handles, hit_test_handles};
pub use input::{InputState, PointerEvent};
pub use layers::{
    FontFamily, FontWeight, LayerId, LayerRef, LogoFormat, LogoLayer, TextLayer,
    approximate_text_size, split_lines,
};
pub use session::{
    BoxFuture, MemorySessionStore, SessionError, SessionResult, SessionStore, block_on,
};
