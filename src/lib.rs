//! Scan a folder of photos, read their GPS position from EXIF and build a clustered map
//! with inline thumbnails.
//!
//! The pipeline per photo is: decode EXIF into a [`MetadataMap`], pull the GPS block out
//! with [`extract_geotags`], turn it into a [`Coordinate`] with [`normalize`], then
//! orientation-correct and shrink the pixels into a [`ThumbnailPayload`]. Located photos
//! become [`PhotoRecord`]s which [`aggregate`] packs into a [`MapDataset`].

pub mod constants;
pub mod coordinates;
pub mod error;
pub mod exif_parser;
pub mod geotags;
pub mod html_template;
pub mod image_processing;
pub mod metadata;
pub mod orientation;
pub mod processing;
pub mod records;
pub mod server;
pub mod settings;
pub mod tags;

pub use coordinates::{normalize, Coordinate, SexagesimalTriple};
pub use error::{PhotoError, SettingsError, ThumbnailError};
pub use geotags::extract_geotags;
pub use html_template::{render_map_html, write_map, MapOptions};
pub use image_processing::{encode_thumbnail, ThumbnailOptions, ThumbnailPayload};
pub use metadata::{GeoTagMap, MetadataMap, TagValue};
pub use orientation::correct_orientation;
pub use processing::{process_photo, scan_folder, PhotoOutcome, ScanOptions, ScanReport, SkipReason};
pub use records::{aggregate, centroid, MapDataset, PhotoRecord};
pub use settings::Settings;
pub use tags::{resolve, TagName, TagTable};
