//! Image producer feeding decoded bitmaps into the pipeline.

use crate::constants::IMAGE_EXTENSIONS;
use crate::error::{Error, Result};
use crate::imaging::Bitmap;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A decoded (or undecodable) input image.
#[derive(Debug)]
pub struct CapturedImage {
    /// Where the image came from.
    pub source: PathBuf,
    /// Decoded pixels, or the reason decoding failed.
    pub bitmap: Result<Bitmap>,
}

/// Decode `paths` in order on the blocking pool and send them downstream.
///
/// The channel closes after the last image, or early if the receiver is
/// dropped.
pub fn spawn_file_source(paths: Vec<PathBuf>, capacity: usize) -> mpsc::Receiver<CapturedImage> {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    tokio::task::spawn_blocking(move || {
        for source in paths {
            let bitmap = Bitmap::open(&source);
            if let Ok(bitmap) = &bitmap {
                debug!(
                    "Decoded {} ({}x{})",
                    source.display(),
                    bitmap.width(),
                    bitmap.height()
                );
            }
            if tx.blocking_send(CapturedImage { source, bitmap }).is_err() {
                debug!("Image consumer went away, stopping decode");
                break;
            }
        }
    });

    rx
}

/// Collect image files from paths (files and directories).
///
/// Directories are walked recursively and sorted so output order is stable.
/// Explicitly named files are kept even with an unfamiliar extension.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            collect_images_recursive(path, &mut found)?;
            found.sort();
            files.extend(found);
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    if files.is_empty() {
        return Err(Error::NoValidImageFiles);
    }
    Ok(files)
}

fn collect_images_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_images_recursive(&path, files)?;
        } else if is_image_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Check if a file has a supported image extension.
fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("bite.jpg")));
        assert!(is_image_file(Path::new("tick.JPEG")));
        assert!(is_image_file(Path::new("spider.png")));
        assert!(is_image_file(Path::new("mückenstich.webp")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn test_collect_walks_directories_sorted() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("b.png"), b"").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"").unwrap();
        std::fs::write(nested.join("c.bmp"), b"").unwrap();

        let files = collect_input_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.jpg", "b.png", "c.bmp"]);
    }

    #[test]
    fn test_collect_nothing_found() {
        let dir = TempDir::new().unwrap();
        let result = collect_input_files(&[dir.path().join("missing.png")]);
        assert!(matches!(result, Err(Error::NoValidImageFiles)));
    }

    #[tokio::test]
    async fn test_file_source_yields_in_order() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        write_png(&good, 3, 2);
        std::fs::write(&bad, b"not an image").unwrap();

        let mut rx = spawn_file_source(vec![good.clone(), bad.clone()], 1);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.source, good);
        let bitmap = first.bitmap.unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (3, 2));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.source, bad);
        assert!(matches!(
            second.bitmap,
            Err(Error::PreprocessFailure { .. })
        ));

        assert!(rx.recv().await.is_none());
    }
}
