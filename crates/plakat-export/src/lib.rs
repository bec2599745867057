//! Plakat Export Library
//!
//! Hands finished renders to the outside world: file downloads, share
//! links and backend uploads.

mod error;
mod file;
mod share;
mod upload;

pub use error::{ExportError, ExportResult};
pub use file::{default_file_name, save_to_file};
pub use share::ShareLink;
pub use upload::{BackendUploader, UploadMeta, UploadReceipt};
