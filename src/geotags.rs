use crate::metadata::{GeoTagMap, MetadataMap, TagValue};
use crate::tags::{resolve, TagTable, GPS_INFO};

/// Resolves the GPS block of `metadata` into named GPS fields.
///
/// Returns `None` when there is no `GPSInfo` block. Required fields are not checked
/// here, a partially populated block comes back as-is.
pub fn extract_geotags(metadata: &MetadataMap) -> Option<GeoTagMap> {
    let block = metadata.get(GPS_INFO).and_then(TagValue::as_block)?;

    Some(
        block
            .iter()
            .map(|(&tag_id, value)| (resolve(tag_id, TagTable::Gps), value.clone()))
            .collect(),
    )
}
