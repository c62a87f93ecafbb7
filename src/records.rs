use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::coordinates::Coordinate;
use crate::image_processing::ThumbnailPayload;

/// One located photo. Built once per image and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoRecord {
    path: PathBuf,
    coordinate: Coordinate,
    thumbnail: ThumbnailPayload,
    taken_at: Option<NaiveDateTime>,
}

impl PhotoRecord {
    pub fn new(
        path: PathBuf,
        coordinate: Coordinate,
        thumbnail: ThumbnailPayload,
        taken_at: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            path,
            coordinate,
            thumbnail,
            taken_at,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn thumbnail(&self) -> &ThumbnailPayload {
        &self.thumbnail
    }

    pub fn taken_at(&self) -> Option<NaiveDateTime> {
        self.taken_at
    }
}

/// Records in discovery order plus the point the map opens on.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDataset {
    records: Vec<PhotoRecord>,
    centroid: Coordinate,
}

impl MapDataset {
    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn centroid(&self) -> Coordinate {
        self.centroid
    }
}

/// Mean latitude and mean longitude, `None` for no records.
pub fn centroid(records: &[PhotoRecord]) -> Option<Coordinate> {
    if records.is_empty() {
        return None;
    }

    let count = records.len() as f64;
    let (lat_sum, lon_sum) = records.iter().fold((0.0, 0.0), |(lat, lon), record| {
        (lat + record.coordinate.latitude, lon + record.coordinate.longitude)
    });
    Some(Coordinate::new(lat_sum / count, lon_sum / count))
}

/// Packs records into a renderable dataset; `None` means there is nothing to draw.
pub fn aggregate(records: Vec<PhotoRecord>) -> Option<MapDataset> {
    let centroid = centroid(&records)?;
    Some(MapDataset { records, centroid })
}
