//! Saving rendered images to disk.

use crate::error::ExportResult;
use log::info;
use plakat_raster::RenderedImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Default file name for an export, derived from the composition id.
/// The full UUID is noisy in a downloads folder, eight characters is
/// plenty to keep repeated exports apart.
pub fn default_file_name(composition_id: &str) -> String {
    let short: String = composition_id.chars().take(8).collect();
    format!("plakat-{short}.png")
}

/// Write the PNG bytes to a path. Appends a `.png` extension when the
/// caller left it off. Returns the path actually written.
pub fn save_to_file(image: &RenderedImage, path: &Path) -> ExportResult<PathBuf> {
    let path = if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("png")
    };
    fs::write(&path, &image.png)?;
    info!(
        "saved {}x{} export to {}",
        image.width,
        image.height,
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered() -> RenderedImage {
        RenderedImage {
            png: vec![0x89, 0x50, 0x4E, 0x47],
            width: 2,
            height: 2,
        }
    }

    #[test]
    fn test_default_file_name() {
        let name = default_file_name("c0ffee11-2222-3333-4444-555566667777");
        assert_eq!(name, "plakat-c0ffee11.png");
    }

    #[test]
    fn test_save_appends_extension() {
        let dir = std::env::temp_dir();
        let target = dir.join("plakat_save_test");
        let written = save_to_file(&rendered(), &target).unwrap();
        assert_eq!(written.extension().unwrap(), "png");
        assert_eq!(fs::read(&written).unwrap(), rendered().png);
        let _ = fs::remove_file(written);
    }
}
