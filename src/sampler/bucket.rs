//! Quantized color buckets built from a sampled raster.

use std::collections::HashMap;

use image::RgbaImage;

use crate::color::{luma, Color};

/// Only every Nth pixel of the raster is inspected.
pub const SAMPLE_STRIDE: usize = 4;
/// Buckets seen fewer times than this are only used when nothing else qualifies.
pub const MIN_BUCKET_COUNT: u32 = 3;

const MIN_ALPHA: u8 = 128;
const MIN_BRIGHTNESS: f32 = 100.0;
const MAX_BRIGHTNESS: f32 = 250.0;
const NEAR_WHITE: u8 = 230;
const GRAY_SPREAD: i16 = 15;
const GRAY_MIN_BRIGHTNESS: f32 = 200.0;
const QUANT_STEP: u16 = 12;

/// A group of sampled pixels that quantize to the same color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub color: Color,
    pub count: u32,
    /// Brightness of the most recent sample that landed in this bucket.
    pub brightness: f32,
}

/// Buckets in the order they were first created.
#[derive(Debug, Clone, Default)]
pub struct Buckets {
    buckets: Vec<Bucket>,
    index: HashMap<Color, usize>,
}

impl Buckets {
    /// Sample `raster` and bucket every pixel that survives the filters.
    pub fn accumulate(raster: &RgbaImage) -> Self {
        let mut buckets = Self::default();
        for pixel in raster.pixels().step_by(SAMPLE_STRIDE) {
            let [r, g, b, a] = pixel.0;
            if let Some(brightness) = qualifying_brightness(r, g, b, a) {
                buckets.record(quantize_color(r, g, b), brightness);
            }
        }
        buckets
    }

    fn record(&mut self, key: Color, brightness: f32) {
        match self.index.get(&key) {
            Some(&i) => {
                let bucket = &mut self.buckets[i];
                bucket.count += 1;
                bucket.brightness = brightness;
            }
            None => {
                self.index.insert(key, self.buckets.len());
                self.buckets.push(Bucket {
                    color: key,
                    count: 1,
                    brightness,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    /// The brightest bucket among those seen at least `MIN_BUCKET_COUNT`
    /// times, or the brightest overall if none were. Ties keep the older bucket.
    pub fn select(&self) -> Option<Color> {
        let frequent = brightest(self.iter().filter(|b| b.count >= MIN_BUCKET_COUNT));
        frequent
            .or_else(|| brightest(self.iter()))
            .map(|bucket| bucket.color)
    }
}

fn brightest<'a>(buckets: impl Iterator<Item = &'a Bucket>) -> Option<&'a Bucket> {
    buckets.fold(None, |best, bucket| match best {
        Some(current) if current.brightness >= bucket.brightness => Some(current),
        _ => Some(bucket),
    })
}

/// Brightness of a pixel if it is opaque, mid-bright and neither near-white
/// nor a light gray.
fn qualifying_brightness(r: u8, g: u8, b: u8, a: u8) -> Option<f32> {
    if a < MIN_ALPHA {
        return None;
    }

    let brightness = luma(r, g, b);
    if !(MIN_BRIGHTNESS..=MAX_BRIGHTNESS).contains(&brightness) {
        return None;
    }

    let near_white = r > NEAR_WHITE && g > NEAR_WHITE && b > NEAR_WHITE;
    let (r16, g16, b16) = (r as i16, g as i16, b as i16);
    let near_gray = (r16 - g16).abs() < GRAY_SPREAD
        && (g16 - b16).abs() < GRAY_SPREAD
        && (r16 - b16).abs() < GRAY_SPREAD
        && brightness > GRAY_MIN_BRIGHTNESS;
    if near_white || near_gray {
        return None;
    }

    Some(brightness)
}

/// Round a channel to the nearest multiple of `QUANT_STEP`, halves rounding up.
fn quantize(channel: u8) -> u8 {
    let step = QUANT_STEP;
    ((channel as u16 + step / 2) / step * step) as u8
}

fn quantize_color(r: u8, g: u8, b: u8) -> Color {
    Color::new(quantize(r), quantize(g), quantize(b))
}
