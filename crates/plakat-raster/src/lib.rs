//! Plakat Raster Library
//!
//! Deterministic CPU rasterization for Plakat compositions: flattens the
//! layer store onto an offscreen RGBA surface at the export scale and
//! encodes it as PNG.

mod assets;
mod error;
mod fonts;
mod pipeline;
mod surface;

pub use assets::{
    AssetError, AssetResult, AssetSource, MemoryAssets, NoAssets, decode_dimensions, decode_image,
    insert_logo,
};
pub use error::{RasterError, RasterResult};
pub use fonts::{FontCatalog, FontError, HeuristicMeasure, MetricsMeasure, TextMeasure};
pub use pipeline::{RenderOrder, RenderedImage, Renderer};
pub use surface::MAX_SURFACE_DIM;
