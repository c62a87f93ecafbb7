use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageReader, Limits};
use serde::Serialize;
use std::path::Path;

use crate::constants::{JPEG_QUALITY, THUMBNAIL_SIZE};
use crate::error::{PhotoError, ThumbnailError};
use crate::metadata::MetadataMap;
use crate::orientation::correct_orientation;

/// Per-call decoder settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Upper bound on decoder allocations in bytes. `None` decodes images of any size.
    pub max_alloc: Option<u64>,
}

impl DecodeOptions {
    fn limits(&self) -> Limits {
        match self.max_alloc {
            Some(bytes) => {
                let mut limits = Limits::default();
                limits.max_alloc = Some(bytes);
                limits
            }
            None => Limits::no_limits(),
        }
    }
}

/// Decodes the pixels of an image file, guessing the format from its content.
pub fn open_image(path: &Path, options: &DecodeOptions) -> Result<DynamicImage, PhotoError> {
    let mut reader = ImageReader::open(path)?.with_guessed_format()?;
    reader.limits(options.limits());
    Ok(reader.decode()?)
}

#[derive(Debug, Clone, Copy)]
pub struct ThumbnailOptions {
    /// Bounding box edge in pixels
    pub max_size: u32,
    pub quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            max_size: THUMBNAIL_SIZE,
            quality: JPEG_QUALITY,
        }
    }
}

/// Base64 JPEG preview ready to be inlined into a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailPayload {
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub base64: String,
}

impl ThumbnailPayload {
    pub fn data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.base64)
    }
}

/// Largest size with the same aspect ratio that fits in a `max`×`max` box.
/// Images already inside the box are never upscaled.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    let max = max.max(1);
    if width <= max && height <= max {
        return (width, height);
    }

    let scale = f64::min(max as f64 / width as f64, max as f64 / height as f64);
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max);
    (scaled(width), scaled(height))
}

/// Orientation-corrects, downscales and JPEG-encodes an image.
pub fn encode_thumbnail(
    img: DynamicImage,
    metadata: &MetadataMap,
    options: &ThumbnailOptions,
) -> Result<ThumbnailPayload, ThumbnailError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ThumbnailError::EmptyImage { width, height });
    }

    let img = correct_orientation(img, metadata);
    let (thumb_width, thumb_height) = fit_within(img.width(), img.height(), options.max_size);
    let scaled = if (thumb_width, thumb_height) == img.dimensions() {
        img
    } else {
        // Triangle is fast and good enough at this size
        img.resize_exact(thumb_width, thumb_height, image::imageops::FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb_image = scaled.to_rgb8();
    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, options.quality).encode_image(&rgb_image)?;

    Ok(ThumbnailPayload {
        width: thumb_width,
        height: thumb_height,
        base64: general_purpose::STANDARD.encode(&jpeg_data),
    })
}
