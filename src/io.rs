//! Image file I/O: layer import and PNG export.

use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};

/// File name of the exported composite.
pub const EXPORT_FILE_NAME: &str = "posed_character_design.png";

/// Decode any supported image file to 8-bit RGBA.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to decode image: {}", path.display()))?;
    log::debug!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.to_rgba8())
}

/// Layer name for an imported file: the file stem, or "Layer" when there is none.
pub fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Layer".to_string())
}

pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write PNG: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn test_layer_name_is_stem() {
        assert_eq!(layer_name(Path::new("/tmp/arm_left.png")), "arm_left");
        assert_eq!(layer_name(Path::new("torso.v2.jpg")), "torso.v2");
        assert_eq!(layer_name(Path::new("/")), "Layer");
    }

    #[test]
    fn test_png_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("head.png");
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
        save_png(&img, &path).unwrap();
        assert_eq!(load_image(&path).unwrap(), img);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load_image(Path::new("/nonexistent/head.png")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/head.png"));
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let img = RgbaImage::new(1, 1);
        assert!(save_png(&img, &path).is_err());
    }
}
