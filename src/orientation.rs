use image::DynamicImage;

use crate::metadata::{MetadataMap, TagValue};

/// Rotation applied to undo the camera's orientation, in counter-clockwise degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Ccw90,
    Ccw180,
    Ccw270,
}

impl Rotation {
    /// Only the pure rotations 3, 6 and 8 are corrected. Mirrored orientations
    /// and unknown values are left alone.
    pub fn from_orientation(orientation: Option<i64>) -> Self {
        match orientation {
            Some(3) => Rotation::Ccw180,
            Some(6) => Rotation::Ccw270,
            Some(8) => Rotation::Ccw90,
            _ => Rotation::None,
        }
    }

    /// Rotates the whole canvas; width and height swap for quarter turns.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        // image's rotate90/rotate270 turn clockwise
        match self {
            Rotation::None => img,
            Rotation::Ccw90 => img.rotate270(),
            Rotation::Ccw180 => img.rotate180(),
            Rotation::Ccw270 => img.rotate90(),
        }
    }
}

/// Orientation tag value, if present and numeric.
pub fn read_orientation(metadata: &MetadataMap) -> Option<i64> {
    metadata.get("Orientation").and_then(TagValue::as_integer)
}

/// Applies the rotation named by the `Orientation` tag. A missing or unreadable tag
/// leaves the image untouched.
pub fn correct_orientation(img: DynamicImage, metadata: &MetadataMap) -> DynamicImage {
    Rotation::from_orientation(read_orientation(metadata)).apply(img)
}
