//! Representative-color extraction for cover art.
//!
//! An image is squashed to a 50x50 raster, a quarter of its pixels are
//! sampled, and the brightest frequent color bucket is lightened to serve as
//! a card background. Every failure resolves to [`Color::DEFAULT_FALLBACK`].

pub mod bucket;
pub mod cache;
pub mod raster;
pub mod worker;

use tracing::{debug, warn};

use crate::catalog::{Catalog, Item};
use crate::color::Color;

pub use bucket::Buckets;
pub use cache::ColorCache;
pub use raster::{FsImageSource, ImageSource, RASTER_SIZE};
pub use worker::{ExtractionUpdate, ExtractionWorker};

/// Amount added to each channel of the chosen bucket.
pub const LIGHTEN_AMOUNT: u8 = 50;

/// Reasons extraction fell back to the default color.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("failed to load image {locator}: {source}")]
    ImageLoad {
        locator: String,
        #[source]
        source: image::ImageError,
    },
    #[error("cannot read raster pixels: {0}")]
    RasterAccess(String),
    #[error("no pixel passed the brightness and saturation filters")]
    NoQualifyingPixels,
}

/// Extract a color, reporting why extraction failed.
pub fn try_extract<S>(source: &S, locator: &str) -> Result<Color, SampleError>
where
    S: ImageSource + ?Sized,
{
    let img = source.load(locator)?;
    let raster = raster::rasterize(&img)?;
    let buckets = Buckets::accumulate(&raster);
    let chosen = buckets.select().ok_or(SampleError::NoQualifyingPixels)?;
    debug!(locator, buckets = buckets.len(), %chosen, "selected bucket");
    Ok(chosen.lighten(LIGHTEN_AMOUNT))
}

/// Extract a light representative color from the image at `locator`.
///
/// Never fails: load errors, unreadable rasters and images with no usable
/// pixels all resolve to [`Color::DEFAULT_FALLBACK`].
pub fn extract_representative_color<S>(source: &S, locator: &str) -> Color
where
    S: ImageSource + ?Sized,
{
    match try_extract(source, locator) {
        Ok(color) => color,
        Err(err @ SampleError::RasterAccess(_)) => {
            warn!(locator, error = %err, "color extraction failed");
            Color::DEFAULT_FALLBACK
        }
        Err(err) => {
            debug!(locator, error = %err, "using default color");
            Color::DEFAULT_FALLBACK
        }
    }
}

/// Color for a catalog item: its pinned color if it has one, otherwise the
/// extracted color of its cover art.
pub fn extract_for_item<S>(source: &S, catalog: &Catalog, item: &Item) -> Color
where
    S: ImageSource + ?Sized,
{
    if let Some(pinned) = catalog.pinned_color(item.id) {
        debug!(id = item.id, %pinned, "pinned color, skipping extraction");
        return pinned;
    }
    extract_representative_color(source, &item.image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GOLDEN;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::collections::HashMap;

    /// Serves images from memory, keyed by locator.
    #[derive(Default)]
    struct MemorySource(HashMap<String, DynamicImage>);

    impl MemorySource {
        fn with(mut self, locator: &str, img: RgbaImage) -> Self {
            self.0
                .insert(locator.to_string(), DynamicImage::ImageRgba8(img));
            self
        }
    }

    impl ImageSource for MemorySource {
        fn load(&self, locator: &str) -> Result<DynamicImage, SampleError> {
            self.0
                .get(locator)
                .cloned()
                .ok_or_else(|| SampleError::ImageLoad {
                    locator: locator.to_string(),
                    source: image::ImageError::IoError(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "not in memory source",
                    )),
                })
        }
    }

    fn solid(rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(RASTER_SIZE, RASTER_SIZE, Rgba(rgba))
    }

    /// A transparent raster-sized image with the given pixels set, addressed
    /// by row-major index.
    fn sparse(pixels: &[(u32, [u8; 3])]) -> RgbaImage {
        let mut img = solid([0, 0, 0, 0]);
        for &(index, [r, g, b]) in pixels {
            img.put_pixel(index % RASTER_SIZE, index / RASTER_SIZE, Rgba([r, g, b, 255]));
        }
        img
    }

    fn extract(img: RgbaImage) -> Color {
        let source = MemorySource::default().with("cover", img);
        extract_representative_color(&source, "cover")
    }

    #[test]
    fn solid_color_is_quantized_and_lightened() {
        assert_eq!(extract(solid([200, 100, 50, 255])), Color::new(254, 146, 98));
    }

    #[test]
    fn lightening_clamps_at_255() {
        // quantizes to (96, 216, 252)
        assert_eq!(extract(solid([100, 220, 255, 255])), Color::new(146, 255, 255));
    }

    #[test]
    fn transparent_image_uses_default() {
        let source = MemorySource::default().with("clear", solid([200, 100, 50, 0]));
        assert!(matches!(
            try_extract(&source, "clear"),
            Err(SampleError::NoQualifyingPixels)
        ));
        assert_eq!(
            extract_representative_color(&source, "clear"),
            Color::DEFAULT_FALLBACK
        );
    }

    #[test]
    fn near_white_image_uses_default() {
        assert_eq!(extract(solid([240, 240, 240, 255])), Color::DEFAULT_FALLBACK);
    }

    #[test]
    fn dark_image_uses_default() {
        assert_eq!(extract(solid([20, 30, 40, 255])), Color::DEFAULT_FALLBACK);
    }

    #[test]
    fn light_gray_image_uses_default() {
        assert_eq!(extract(solid([210, 212, 215, 255])), Color::DEFAULT_FALLBACK);
    }

    #[test]
    fn rare_bright_color_loses_to_frequent_one() {
        let base: [u8; 3] = [200, 100, 50];
        let accent: [u8; 3] = [100, 220, 255];
        let mut pixels: Vec<(u32, [u8; 3])> = (2..200).map(|i| (i * 4, base)).collect();
        pixels.extend([(0, accent), (4, accent)]);
        assert_eq!(extract(sparse(&pixels)), Color::new(254, 146, 98));

        pixels.push((800, accent));
        assert_eq!(extract(sparse(&pixels)), Color::new(146, 255, 255));
    }

    #[test]
    fn unsampled_pixels_are_ignored() {
        // Indices not divisible by four are never inspected.
        let pixels: Vec<(u32, [u8; 3])> = (0..50).map(|i| (i * 4 + 1, [200, 100, 50])).collect();
        assert_eq!(extract(sparse(&pixels)), Color::DEFAULT_FALLBACK);
    }

    #[test]
    fn bucket_brightness_follows_last_sample() {
        let brighter: [u8; 3] = [209, 100, 50]; // bucket (204, 96, 48), brightness ~126.9
        let dimmer: [u8; 3] = [198, 100, 50]; // same bucket, brightness ~123.6
        let other: [u8; 3] = [180, 110, 50]; // bucket (180, 108, 48), brightness ~124.1

        let others: [(u32, [u8; 3]); 3] = [(0, other), (4, other), (8, other)];

        let mut pixels = others.to_vec();
        pixels.extend([(12, brighter), (16, brighter), (20, dimmer)]);
        assert_eq!(extract(sparse(&pixels)), Color::new(230, 158, 98));

        let mut pixels = others.to_vec();
        pixels.extend([(12, dimmer), (16, brighter), (20, brighter)]);
        assert_eq!(extract(sparse(&pixels)), Color::new(254, 146, 98));
    }

    #[test]
    fn missing_image_uses_default() {
        let source = MemorySource::default();
        assert!(matches!(
            try_extract(&source, "nope"),
            Err(SampleError::ImageLoad { .. })
        ));
        assert_eq!(
            extract_representative_color(&source, "nope"),
            Color::DEFAULT_FALLBACK
        );
    }

    #[test]
    fn unreadable_raster_uses_default() {
        let source = MemorySource::default().with("empty", RgbaImage::new(0, 0));
        assert!(matches!(
            try_extract(&source, "empty"),
            Err(SampleError::RasterAccess(_))
        ));
        assert_eq!(
            extract_representative_color(&source, "empty"),
            Color::DEFAULT_FALLBACK
        );
    }

    #[test]
    fn extraction_is_repeatable() {
        let pixels: Vec<(u32, [u8; 3])> = (0..625)
            .map(|i| (i * 4, [(i % 200) as u8 + 40, 120, (i % 90) as u8 + 100]))
            .collect();
        let source = MemorySource::default().with("noisy", sparse(&pixels));
        let first = extract_representative_color(&source, "noisy");
        for _ in 0..5 {
            assert_eq!(extract_representative_color(&source, "noisy"), first);
        }
    }

    #[test]
    fn pinned_item_skips_extraction() {
        let catalog = Catalog::builtin();
        let love_story = catalog.get(0).unwrap();
        let source = MemorySource::default().with(&love_story.image, solid([200, 100, 50, 255]));
        assert_eq!(extract_for_item(&source, &catalog, love_story), GOLDEN);
        assert_eq!(
            extract_for_item(&MemorySource::default(), &catalog, love_story),
            GOLDEN
        );
    }

    #[test]
    fn first_item_of_json_catalog_is_golden_without_sampling() {
        let catalog = Catalog::from_json_str(
            r#"{"items": [{"id": 1, "title": "Love Story", "price": 3, "rarity": "COMMON", "image": "cover"}]}"#,
        )
        .unwrap();
        let item = catalog.get(0).unwrap();
        let source = MemorySource::default().with("cover", solid([200, 100, 50, 255]));
        assert_eq!(extract_for_item(&source, &catalog, item), GOLDEN);
    }

    #[test]
    fn unpinned_item_is_extracted() {
        let catalog = Catalog::builtin();
        let item = catalog.get(1).unwrap();
        let source = MemorySource::default().with(&item.image, solid([200, 100, 50, 255]));
        assert_eq!(
            extract_for_item(&source, &catalog, item),
            Color::new(254, 146, 98)
        );
    }
}
