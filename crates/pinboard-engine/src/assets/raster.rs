use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;

use crate::coords::Vec2;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a decoded image.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

impl ImageId {
    fn next() -> Self {
        Self(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Decoded RGBA8 image, rows stored top-first.
///
/// Clones share the pixel buffer and the id.
#[derive(Clone)]
pub struct Image {
    id: ImageId,
    pixels: Arc<RgbaImage>,
}

impl Image {
    /// Decodes any raster format enabled on the `image` crate, guessing the
    /// format from the file contents.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, image::ImageError> {
        let decoded = image::ImageReader::open(path.as_ref())?
            .with_guessed_format()?
            .decode()?;
        Ok(Self::from_rgba(decoded.into_rgba8()))
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { id: ImageId::next(), pixels: Arc::new(pixels) }
    }

    #[inline]
    pub fn id(&self) -> ImageId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Size in pixels as a vector.
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    #[inline]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pinboard-raster-{}-{name}", std::process::id()))
    }

    #[test]
    fn ids_are_unique_and_shared_by_clones() {
        let a = Image::from_rgba(RgbaImage::new(2, 2));
        let b = Image::from_rgba(RgbaImage::new(2, 2));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn size_reports_pixel_dimensions() {
        let img = Image::from_rgba(RgbaImage::new(7, 3));
        assert_eq!((img.width(), img.height()), (7, 3));
        assert_eq!(img.size(), Vec2::new(7.0, 3.0));
    }

    #[test]
    fn load_decodes_png_from_disk() {
        let path = temp_path("load.png");
        let src = RgbaImage::from_pixel(4, 5, image::Rgba([10, 20, 30, 255]));
        src.save(&path).unwrap();

        let img = Image::load(&path).unwrap();
        assert_eq!((img.width(), img.height()), (4, 5));
        assert_eq!(img.pixels().get_pixel(3, 4).0, [10, 20, 30, 255]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_rejects_non_image_bytes() {
        let path = temp_path("not-an-image.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(Image::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(Image::load(temp_path("missing.png")).is_err());
    }
}
