//! Image upload pipeline.
//!
//! Uploaded files are restricted to `jpg`/`png`, stored under the static
//! images directory with a randomly generated filename, and resized to a
//! fixed 200x200 canvas before the filename is persisted on the owning
//! record. The filesystem write happens outside any database
//! transaction; a later DB failure leaves an orphaned file, which is
//! tolerated.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use rand::RngCore;
use thiserror::Error;

use crate::error::AppError;

/// File extensions accepted for uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Width and height of the stored canvas.
const CANVAS_SIZE: u32 = 200;

/// Number of random bytes in a generated filename (hex-encoded to twice
/// as many characters).
const FILENAME_BYTES: usize = 10;

/// Errors that can occur while storing an uploaded image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Filename has no extension or one outside the allowed set.
    #[error("File extension not supported")]
    UnsupportedExtension,

    /// Upload carried no file part.
    #[error("No file provided")]
    MissingFile,

    /// Bytes did not decode as an image.
    #[error("invalid image data: {0}")]
    Decode(#[from] image::ImageError),

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking resize task was cancelled.
    #[error("image task failed")]
    TaskJoin,
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::UnsupportedExtension | ImageError::MissingFile => {
                Self::Validation(e.to_string())
            }
            ImageError::Decode(_) => Self::Validation("Invalid image data".to_owned()),
            ImageError::Io(_) | ImageError::TaskJoin => Self::Internal(e.to_string()),
        }
    }
}

/// Writes validated, resized images into the static directory.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at the images directory.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Validate, resize, and persist an uploaded file.
    ///
    /// Returns the generated filename (not the full path); callers
    /// persist it on the owning record and build URLs from the static
    /// mount.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::UnsupportedExtension` for anything but
    /// `jpg`/`png`, `ImageError::Decode` for undecodable bytes, and
    /// `ImageError::Io` for filesystem failures.
    pub async fn save(&self, original_filename: &str, bytes: Vec<u8>) -> Result<String, ImageError> {
        let extension = validate_extension(original_filename)?;
        let filename = format!("{}.{extension}", random_hex());
        let path = self.dir.join(&filename);

        tokio::fs::create_dir_all(&self.dir).await?;

        // Decode + resize is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || -> Result<(), ImageError> {
            let img = image::load_from_memory(&bytes)?;
            let resized = img.resize_exact(CANVAS_SIZE, CANVAS_SIZE, FilterType::Triangle);
            resized.save(&path)?;
            Ok(())
        })
        .await
        .map_err(|_| ImageError::TaskJoin)??;

        Ok(filename)
    }
}

/// Check the extension of an uploaded filename against the allowed set.
///
/// # Errors
///
/// Returns `ImageError::UnsupportedExtension` for a missing or
/// unsupported extension.
pub fn validate_extension(filename: &str) -> Result<String, ImageError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or(ImageError::UnsupportedExtension)?;

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(ImageError::UnsupportedExtension)
    }
}

/// Random hex filename stem, e.g. `9f2c4be0a1d37c55e8b1`.
fn random_hex() -> String {
    let mut bytes = [0u8; FILENAME_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_extension_accepts_jpg_and_png() {
        assert_eq!(validate_extension("photo.jpg").unwrap(), "jpg");
        assert_eq!(validate_extension("logo.png").unwrap(), "png");
        // case-insensitive
        assert_eq!(validate_extension("PHOTO.JPG").unwrap(), "jpg");
    }

    #[test]
    fn test_validate_extension_rejects_others() {
        assert!(matches!(
            validate_extension("malware.exe"),
            Err(ImageError::UnsupportedExtension)
        ));
        assert!(matches!(
            validate_extension("animation.gif"),
            Err(ImageError::UnsupportedExtension)
        ));
        assert!(matches!(
            validate_extension("no_extension"),
            Err(ImageError::UnsupportedExtension)
        ));
    }

    #[test]
    fn test_unsupported_extension_is_a_validation_error() {
        // The upload contract: bad extension -> 400 before any state change.
        let err: AppError = ImageError::UnsupportedExtension.into();
        assert!(matches!(&err, AppError::Validation(msg) if msg == "File extension not supported"));
    }

    #[test]
    fn test_random_hex_shape() {
        let a = random_hex();
        let b = random_hex();
        assert_eq!(a.len(), FILENAME_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_save_resizes_to_canvas() {
        let dir = std::env::temp_dir().join(format!("vendora-images-{}", random_hex()));
        let store = ImageStore::new(dir.clone());

        // 4x3 all-red source image, encoded as PNG in memory.
        let mut source = image::RgbImage::new(4, 3);
        for pixel in source.pixels_mut() {
            *pixel = image::Rgb([255, 0, 0]);
        }
        let mut encoded = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(source)
            .write_to(&mut encoded, image::ImageFormat::Png)
            .unwrap();

        let filename = store.save("tiny.png", encoded.into_inner()).await.unwrap();
        let stored = image::open(dir.join(&filename)).unwrap();
        assert_eq!(stored.width(), CANVAS_SIZE);
        assert_eq!(stored.height(), CANVAS_SIZE);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_bad_extension_before_touching_disk() {
        let dir = std::env::temp_dir().join("vendora-images-never-created");
        let store = ImageStore::new(dir.clone());

        let result = store.save("file.gif", vec![1, 2, 3]).await;
        assert!(matches!(result, Err(ImageError::UnsupportedExtension)));
        assert!(!dir.exists());
    }
}
