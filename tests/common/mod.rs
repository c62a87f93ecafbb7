#![allow(dead_code)]

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Where a fixture photo was taken and how the camera was held.
pub struct Fixture {
    pub width: u32,
    pub height: u32,
    pub gps: Option<([u32; 3], &'static str, [u32; 3], &'static str)>,
    pub orientation: Option<u16>,
    pub taken_at: Option<&'static str>,
}

impl Fixture {
    pub fn plain(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            gps: None,
            orientation: None,
            taken_at: None,
        }
    }

    pub fn pittsburgh() -> Self {
        Self {
            gps: Some(([40, 26, 46], "N", [79, 56, 55], "W")),
            ..Self::plain(64, 32)
        }
    }

    pub fn at(lat: [u32; 3], lat_ref: &'static str, lon: [u32; 3], lon_ref: &'static str) -> Self {
        Self {
            gps: Some((lat, lat_ref, lon, lon_ref)),
            ..Self::plain(16, 16)
        }
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.to_jpeg()).unwrap();
    }

    pub fn to_jpeg(&self) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(self.width, self.height, image::Rgb([90, 140, 200])));
        let mut jpeg = Cursor::new(Vec::new());
        img.write_to(&mut jpeg, ImageFormat::Jpeg).unwrap();
        let jpeg = jpeg.into_inner();

        let fields = self.fields();
        if fields.is_empty() {
            return jpeg;
        }
        with_exif_segment(&jpeg, &tiff_bytes(&fields))
    }

    fn fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        if let Some((lat, lat_ref, lon, lon_ref)) = self.gps {
            fields.push(field(Tag::GPSLatitudeRef, ascii(lat_ref)));
            fields.push(field(Tag::GPSLatitude, rationals(lat)));
            fields.push(field(Tag::GPSLongitudeRef, ascii(lon_ref)));
            fields.push(field(Tag::GPSLongitude, rationals(lon)));
        }
        if let Some(orientation) = self.orientation {
            fields.push(field(Tag::Orientation, Value::Short(vec![orientation])));
        }
        if let Some(taken_at) = self.taken_at {
            fields.push(field(Tag::DateTimeOriginal, ascii(taken_at)));
        }
        fields
    }
}

fn field(tag: Tag, value: Value) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value,
    }
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

fn rationals(values: [u32; 3]) -> Value {
    Value::Rational(values.iter().map(|&num| Rational { num, denom: 1 }).collect())
}

fn tiff_bytes(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    buf.into_inner()
}

// APP1 goes right after SOI
fn with_exif_segment(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let length = u16::try_from(2 + 6 + tiff.len()).unwrap();

    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}
