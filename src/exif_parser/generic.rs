use chrono::NaiveDateTime;
use exif::{Context, In, Value};

use crate::metadata::{MetadataMap, RawBlock, TagValue};
use crate::tags::{resolve, TagName, TagTable, GPS_INFO, GPS_INFO_TAG};

/// Flattens the primary directory of a parsed EXIF block into a [`MetadataMap`].
///
/// TIFF and EXIF tags are resolved through the general table. GPS tags are collected
/// under `GPSInfo` with their numeric ids untouched; resolving those is the geotag
/// extractor's job.
pub fn metadata_from_exif(exif: &exif::Exif) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    let mut gps_block = RawBlock::new();
    let mut has_gps_pointer = false;

    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        let number = field.tag.number();
        match field.tag.context() {
            Context::Gps => {
                gps_block.insert(number, convert_value(&field.value));
            }
            Context::Tiff | Context::Exif => {
                if number == GPS_INFO_TAG {
                    has_gps_pointer = true;
                    continue;
                }
                metadata.insert(resolve(number, TagTable::General), convert_value(&field.value));
            }
            // Interoperability tags are not used
            _ => {}
        }
    }

    if has_gps_pointer || !gps_block.is_empty() {
        metadata.insert(TagName::Named(GPS_INFO), TagValue::Block(gps_block));
    }

    metadata
}

fn convert_value(value: &Value) -> TagValue {
    match value {
        Value::Byte(v) => TagValue::Integers(v.iter().map(|&x| i64::from(x)).collect()),
        Value::Short(v) => TagValue::Integers(v.iter().map(|&x| i64::from(x)).collect()),
        Value::Long(v) => TagValue::Integers(v.iter().map(|&x| i64::from(x)).collect()),
        Value::SByte(v) => TagValue::Integers(v.iter().map(|&x| i64::from(x)).collect()),
        Value::SShort(v) => TagValue::Integers(v.iter().map(|&x| i64::from(x)).collect()),
        Value::SLong(v) => TagValue::Integers(v.iter().map(|&x| i64::from(x)).collect()),
        Value::Rational(v) => TagValue::Reals(v.iter().map(|r| r.to_f64()).collect()),
        Value::SRational(v) => TagValue::Reals(v.iter().map(|r| r.to_f64()).collect()),
        Value::Float(v) => TagValue::Reals(v.iter().map(|&x| f64::from(x)).collect()),
        Value::Double(v) => TagValue::Reals(v.clone()),
        Value::Ascii(v) => TagValue::Text(ascii_text(v)),
        Value::Undefined(bytes, _) => TagValue::Bytes(bytes.clone()),
        _ => TagValue::Bytes(Vec::new()),
    }
}

// Multi-string ASCII values are rare; the first string is the meaningful one.
fn ascii_text(strings: &[Vec<u8>]) -> String {
    strings
        .first()
        .map(|s| String::from_utf8_lossy(s).trim_end_matches('\0').to_string())
        .unwrap_or_default()
}

/// Capture time from `DateTimeOriginal`, falling back to `DateTime`.
///
/// EXIF stores it as "YYYY:MM:DD HH:MM:SS"; anything else yields `None`.
pub fn captured_at(metadata: &MetadataMap) -> Option<NaiveDateTime> {
    ["DateTimeOriginal", "DateTime"]
        .into_iter()
        .filter_map(|name| metadata.get(name).and_then(TagValue::as_text))
        .find_map(|text| NaiveDateTime::parse_from_str(text.trim(), "%Y:%m:%d %H:%M:%S").ok())
}
