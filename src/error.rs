use thiserror::Error;

/// Failure while turning a single file into a record. Never fatal to a scan.
#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed EXIF container: {0}")]
    Exif(#[from] exif::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Thumbnail generation failed: {0}")]
    Thumbnail(#[from] ThumbnailError),
}

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for `{key}`: {value}")]
    InvalidValue { key: String, value: String },
}
