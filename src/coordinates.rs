use serde::Serialize;
use tracing::debug;

use crate::metadata::{GeoTagMap, TagValue};

/// Signed decimal degrees; south and west are negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Degrees, minutes and seconds as stored in the GPS directory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SexagesimalTriple {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl SexagesimalTriple {
    pub fn new(degrees: f64, minutes: f64, seconds: f64) -> Self {
        Self { degrees, minutes, seconds }
    }

    /// Reads the first three numeric components of a tag value.
    pub fn from_value(value: &TagValue) -> Option<Self> {
        match value.as_reals()?.as_slice() {
            [degrees, minutes, seconds, ..] => Some(Self::new(*degrees, *minutes, *seconds)),
            _ => None,
        }
    }

    pub fn to_decimal(self) -> f64 {
        self.degrees + (self.minutes / 60.0) + (self.seconds / 3600.0)
    }
}

/// Converts named GPS fields into a signed coordinate.
///
/// All of `GPSLatitude`, `GPSLatitudeRef`, `GPSLongitude` and `GPSLongitudeRef` must be
/// present. A latitude reference other than exactly "N" counts as south, a longitude
/// reference other than exactly "E" counts as west.
pub fn normalize(geotags: &GeoTagMap) -> Option<Coordinate> {
    let (Some(lat), Some(lat_ref), Some(lon), Some(lon_ref)) = (
        geotags.get("GPSLatitude"),
        geotags.get("GPSLatitudeRef"),
        geotags.get("GPSLongitude"),
        geotags.get("GPSLongitudeRef"),
    ) else {
        return None;
    };

    let Some(lat) = SexagesimalTriple::from_value(lat) else {
        debug!(value = ?lat, "GPSLatitude is not a degree/minute/second triple");
        return None;
    };
    let Some(lon) = SexagesimalTriple::from_value(lon) else {
        debug!(value = ?lon, "GPSLongitude is not a degree/minute/second triple");
        return None;
    };

    let coordinate = Coordinate::new(
        lat.to_decimal() * hemisphere_sign(lat_ref, "N", "S"),
        lon.to_decimal() * hemisphere_sign(lon_ref, "E", "W"),
    );

    if !coordinate.is_valid() {
        debug!(?coordinate, "GPS position out of range");
        return None;
    }
    Some(coordinate)
}

fn hemisphere_sign(reference: &TagValue, positive: &str, negative: &str) -> f64 {
    match reference.as_text() {
        Some(r) if r == positive => 1.0,
        Some(r) if r == negative => -1.0,
        _ => {
            // Kept for compatibility with camera firmware that writes odd references
            debug!(?reference, "unexpected hemisphere reference, treating as {}", negative);
            -1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagName;

    const REQUIRED: [&str; 4] = ["GPSLatitude", "GPSLatitudeRef", "GPSLongitude", "GPSLongitudeRef"];

    fn geotags(lat: [f64; 3], lat_ref: TagValue, lon: [f64; 3], lon_ref: TagValue) -> GeoTagMap {
        [
            (TagName::Named("GPSLatitude"), TagValue::Reals(lat.to_vec())),
            (TagName::Named("GPSLatitudeRef"), lat_ref),
            (TagName::Named("GPSLongitude"), TagValue::Reals(lon.to_vec())),
            (TagName::Named("GPSLongitudeRef"), lon_ref),
        ]
        .into_iter()
        .collect()
    }

    fn text(s: &str) -> TagValue {
        TagValue::Text(s.to_string())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_north_east_is_positive() {
        let cases = [
            ([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
            ([52.0, 22.0, 44.4], [4.0, 53.0, 58.0]),
            ([35.0, 30.0, 0.0], [139.0, 45.0, 36.0]),
            ([89.0, 59.0, 59.9], [179.0, 59.0, 59.9]),
        ];
        for (lat, lon) in cases {
            let coordinate = normalize(&geotags(lat, text("N"), lon, text("E"))).unwrap();
            assert_close(coordinate.latitude, lat[0] + lat[1] / 60.0 + lat[2] / 3600.0);
            assert_close(coordinate.longitude, lon[0] + lon[1] / 60.0 + lon[2] / 3600.0);
        }
    }

    #[test]
    fn test_south_west_is_negative() {
        let coordinate =
            normalize(&geotags([33.0, 51.0, 54.0], text("S"), [151.0, 12.0, 36.0], text("W")))
                .unwrap();
        assert_close(coordinate.latitude, -(33.0 + 51.0 / 60.0 + 54.0 / 3600.0));
        assert_close(coordinate.longitude, -(151.0 + 12.0 / 60.0 + 36.0 / 3600.0));
    }

    #[test]
    fn test_malformed_references_fall_to_south_and_west() {
        let refs = [
            text(""),
            text("n"),
            text("North"),
            text("X"),
            TagValue::Integers(vec![78]),
            TagValue::Bytes(b"N".to_vec()),
        ];
        for reference in refs {
            let coordinate = normalize(&geotags(
                [10.0, 0.0, 0.0],
                reference.clone(),
                [20.0, 0.0, 0.0],
                reference.clone(),
            ))
            .unwrap();
            assert_close(coordinate.latitude, -10.0);
            assert_close(coordinate.longitude, -20.0);
        }
    }

    #[test]
    fn test_longitude_reference_n_is_west() {
        // Only "E" makes a longitude positive
        let coordinate =
            normalize(&geotags([1.0, 0.0, 0.0], text("N"), [2.0, 0.0, 0.0], text("N"))).unwrap();
        assert_close(coordinate.latitude, 1.0);
        assert_close(coordinate.longitude, -2.0);
    }

    #[test]
    fn test_missing_any_required_field_is_absent() {
        let full = geotags([40.0, 26.0, 46.0], text("N"), [79.0, 56.0, 55.0], text("W"));
        for missing in REQUIRED {
            let partial: GeoTagMap = full
                .iter()
                .filter(|(name, _)| name.as_str() != Some(missing))
                .map(|(name, value)| (*name, value.clone()))
                .collect();
            assert_eq!(partial.len(), 3);
            assert!(normalize(&partial).is_none(), "{} missing should be absent", missing);
        }
    }

    #[test]
    fn test_pittsburgh_example() {
        let coordinate =
            normalize(&geotags([40.0, 26.0, 46.0], text("N"), [79.0, 56.0, 55.0], text("W")))
                .unwrap();
        assert!((coordinate.latitude - 40.4461).abs() < 1e-4);
        assert!((coordinate.longitude + 79.9486).abs() < 1e-4);
    }

    #[test]
    fn test_short_or_non_numeric_triples_are_absent() {
        let mut short = geotags([1.0, 2.0, 3.0], text("N"), [4.0, 5.0, 6.0], text("E"));
        short.insert(TagName::Named("GPSLatitude"), TagValue::Reals(vec![40.0, 26.0]));
        assert!(normalize(&short).is_none());

        let mut textual = geotags([1.0, 2.0, 3.0], text("N"), [4.0, 5.0, 6.0], text("E"));
        textual.insert(TagName::Named("GPSLongitude"), text("79 56 55"));
        assert!(normalize(&textual).is_none());
    }

    #[test]
    fn test_integer_triples_are_accepted() {
        let mut tags = geotags([0.0; 3], text("N"), [0.0; 3], text("E"));
        tags.insert(TagName::Named("GPSLatitude"), TagValue::Integers(vec![12, 30, 0]));
        let coordinate = normalize(&tags).unwrap();
        assert_close(coordinate.latitude, 12.5);
    }

    #[test]
    fn test_non_finite_or_out_of_range_is_absent() {
        // Zero-denominator rationals decode to NaN or infinity
        let nan = geotags([f64::NAN, 0.0, 0.0], text("N"), [1.0, 0.0, 0.0], text("E"));
        assert!(normalize(&nan).is_none());

        let beyond_pole = geotags([95.0, 0.0, 0.0], text("N"), [1.0, 0.0, 0.0], text("E"));
        assert!(normalize(&beyond_pole).is_none());
    }
}
