//! Rasterization errors.
//!
//! Only surface allocation and final encoding abort a render. Everything
//! else (missing template, undecodable logo, unregistered font) degrades
//! to a warning so one bad asset cannot take the whole export down.

use thiserror::Error;

/// Fatal rasterization errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Cannot allocate {width}x{height} export surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for rasterization.
pub type RasterResult<T> = Result<T, RasterError>;
