use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use super::generic::metadata_from_exif;
use crate::error::PhotoError;
use crate::metadata::MetadataMap;

/// Reads the embedded EXIF block of an image file.
///
/// `Ok(None)` means the container carries no EXIF block at all. A block that is only
/// partially readable still yields whatever fields survived.
pub fn read_metadata(path: &Path) -> Result<Option<MetadataMap>, PhotoError> {
    let file = File::open(path)?;
    let mut buf_reader = BufReader::new(file);
    let mut exif_reader = exif::Reader::new();
    exif_reader.continue_on_error(true); // Tolerate non-standard EXIF structures

    match exif_reader.read_from_container(&mut buf_reader) {
        Ok(exif) => Ok(Some(metadata_from_exif(&exif))),
        Err(exif::Error::PartialResult(partial)) => {
            let (exif, errors) = partial.into_inner();
            debug!(path = %path.display(), errors = errors.len(), "EXIF block partially readable");
            Ok(Some(metadata_from_exif(&exif)))
        }
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(e) => Err(PhotoError::Exif(e)),
    }
}
