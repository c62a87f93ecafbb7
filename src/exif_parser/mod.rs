pub mod generic;
pub mod jpeg;

pub use generic::{captured_at, metadata_from_exif};
pub use jpeg::read_metadata;
