use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use super::SampleError;

/// Edge length of the square raster every image is reduced to before sampling.
pub const RASTER_SIZE: u32 = 50;

/// Platform image loader. Locators are opaque strings owned by the catalog.
pub trait ImageSource: Send + Sync {
    fn load(&self, locator: &str) -> Result<DynamicImage, SampleError>;
}

/// Resolves locators against an asset directory, treating a leading `/` as
/// the directory root.
#[derive(Debug, Clone)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, locator: &str) -> PathBuf {
        self.root.join(locator.trim_start_matches('/'))
    }
}

impl ImageSource for FsImageSource {
    fn load(&self, locator: &str) -> Result<DynamicImage, SampleError> {
        let path = self.resolve(locator);
        image::open(&path).map_err(|source| SampleError::ImageLoad {
            locator: locator.to_string(),
            source,
        })
    }
}

/// Squash an image into a `RASTER_SIZE` x `RASTER_SIZE` RGBA buffer,
/// ignoring aspect ratio.
pub fn rasterize(img: &DynamicImage) -> Result<RgbaImage, SampleError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(SampleError::RasterAccess(format!(
            "image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }

    let raster = img
        .resize_exact(RASTER_SIZE, RASTER_SIZE, FilterType::Triangle)
        .to_rgba8();

    let expected = (RASTER_SIZE * RASTER_SIZE * 4) as usize;
    if raster.as_raw().len() != expected {
        return Err(SampleError::RasterAccess(format!(
            "raster holds {} bytes, expected {expected}",
            raster.as_raw().len()
        )));
    }
    Ok(raster)
}
