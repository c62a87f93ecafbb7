use anyhow::Result;
use ignore::WalkBuilder;
use image::DynamicImage;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::constants::SUPPORTED_EXTENSIONS;
use crate::coordinates::{normalize, Coordinate};
use crate::error::PhotoError;
use crate::exif_parser::{captured_at, read_metadata};
use crate::geotags::extract_geotags;
use crate::image_processing::{encode_thumbnail, open_image, DecodeOptions, ThumbnailOptions};
use crate::metadata::MetadataMap;
use crate::records::{aggregate, MapDataset, PhotoRecord};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub thumbnail: ThumbnailOptions,
    pub decode: DecodeOptions,
    /// Process photos on the rayon pool. Results keep discovery order either way.
    pub parallel: bool,
    pub include_hidden: bool,
}

/// Why a readable photo produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoMetadata,
    NoGeotags,
    IncompleteGeotags,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NoMetadata => "no EXIF metadata",
            SkipReason::NoGeotags => "no GPS block",
            SkipReason::IncompleteGeotags => "incomplete GPS position",
        };
        f.write_str(text)
    }
}

#[derive(Debug)]
pub enum PhotoOutcome {
    Located(PhotoRecord),
    Skipped(SkipReason),
}

/// Finds the position recorded in decoded metadata.
pub fn locate(metadata: &MetadataMap) -> Result<Coordinate, SkipReason> {
    let geotags = extract_geotags(metadata).ok_or(SkipReason::NoGeotags)?;
    normalize(&geotags).ok_or(SkipReason::IncompleteGeotags)
}

/// Builds the record for an already located photo from its decoded pixels.
pub fn build_record(
    path: &Path,
    coordinate: Coordinate,
    metadata: &MetadataMap,
    img: DynamicImage,
    options: &ThumbnailOptions,
) -> Result<PhotoRecord, PhotoError> {
    let thumbnail = encode_thumbnail(img, metadata, options)?;
    Ok(PhotoRecord::new(
        path.to_path_buf(),
        coordinate,
        thumbnail,
        captured_at(metadata),
    ))
}

/// Runs the whole pipeline for one file.
///
/// Pixels are only decoded once a position has been found.
pub fn process_photo(path: &Path, options: &ScanOptions) -> Result<PhotoOutcome, PhotoError> {
    let Some(metadata) = read_metadata(path)? else {
        return Ok(PhotoOutcome::Skipped(SkipReason::NoMetadata));
    };

    let coordinate = match locate(&metadata) {
        Ok(coordinate) => coordinate,
        Err(reason) => return Ok(PhotoOutcome::Skipped(reason)),
    };

    let img = open_image(path, &options.decode)?;
    let record = build_record(path, coordinate, &metadata, img, &options.thumbnail)?;
    Ok(PhotoOutcome::Located(record))
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lists candidate photos under `root` in file-name order.
pub fn discover_photos(root: &Path, include_hidden: bool) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(!include_hidden)
        .sort_by_file_name(|a, b| a.cmp(b));

    builder
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        // Symlinked files count, symlinked directories are not descended into
        .filter(|e| {
            e.file_type()
                .map_or(false, |ft| ft.is_file() || (ft.is_symlink() && e.path().is_file()))
        })
        .map(|e| e.into_path())
        .filter(|path| is_supported(path))
        .collect()
}

/// Outcome of a whole scan. Every candidate lands in exactly one list.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub records: Vec<PhotoRecord>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub failed: Vec<(PathBuf, PhotoError)>,
    pub candidates: usize,
    pub elapsed: Duration,
}

impl ScanReport {
    fn push(&mut self, path: PathBuf, outcome: Result<PhotoOutcome, PhotoError>) {
        match outcome {
            Ok(PhotoOutcome::Located(record)) => {
                debug!(path = %path.display(), "located");
                self.records.push(record);
            }
            Ok(PhotoOutcome::Skipped(reason)) => {
                debug!(path = %path.display(), %reason, "skipped");
                self.skipped.push((path, reason));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to process photo");
                self.failed.push((path, e));
            }
        }
    }

    /// Hands the located records to the aggregator.
    pub fn into_dataset(self) -> Option<MapDataset> {
        aggregate(self.records)
    }

    pub fn print_summary(&self) {
        let secs = self.elapsed.as_secs_f64();
        let avg_time_per_file_ms = if self.candidates > 0 {
            (secs * 1000.0) / self.candidates as f64
        } else {
            0.0
        };

        println!("\n📊 Processing statistics:");
        println!("   🔍 Photos checked: {}", self.candidates);
        println!("   🗺️  With GPS data: {}", self.records.len());
        println!("   ❌ Without GPS: {}", self.skipped.len());
        println!("   ⚠️  Failed: {}", self.failed.len());
        println!("   ⏱️  Processing time: {:.2} s", secs);
        println!("   📈 Average per file: {:.1} ms", avg_time_per_file_ms);
    }
}

/// Scans `root` recursively and collects a record for every located photo.
///
/// A single bad file never aborts the scan; only a missing root does.
pub fn scan_folder(root: &Path, options: &ScanOptions) -> Result<ScanReport> {
    if !root.is_dir() {
        anyhow::bail!("Photos directory not found: {}", root.display());
    }

    let files = discover_photos(root, options.include_hidden);
    info!(root = %root.display(), candidates = files.len(), parallel = options.parallel, "scanning photos");

    let start_time = Instant::now();
    let outcomes: Vec<(PathBuf, Result<PhotoOutcome, PhotoError>)> = if options.parallel {
        // Indexed parallel iterators collect in input order
        files
            .into_par_iter()
            .map(|path| {
                let outcome = process_photo(&path, options);
                (path, outcome)
            })
            .collect()
    } else {
        files
            .into_iter()
            .map(|path| {
                let outcome = process_photo(&path, options);
                (path, outcome)
            })
            .collect()
    };

    let mut report = ScanReport {
        candidates: outcomes.len(),
        ..Default::default()
    };
    for (path, outcome) in outcomes {
        report.push(path, outcome);
    }
    report.elapsed = start_time.elapsed();

    info!(
        located = report.records.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "scan finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{RawBlock, TagValue};
    use crate::tags::{TagName, GPS_INFO};
    use image::RgbImage;
    use std::fs;

    fn pittsburgh() -> MetadataMap {
        let gps = RawBlock::from([
            (1, TagValue::Text("N".to_string())),
            (2, TagValue::Reals(vec![40.0, 26.0, 46.0])),
            (3, TagValue::Text("W".to_string())),
            (4, TagValue::Reals(vec![79.0, 56.0, 55.0])),
        ]);
        [
            (TagName::Named(GPS_INFO), TagValue::Block(gps)),
            (TagName::Named("DateTimeOriginal"), TagValue::Text("2021:05:01 10:00:00".to_string())),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_locate_end_to_end_from_metadata() {
        let coordinate = locate(&pittsburgh()).unwrap();
        assert!((coordinate.latitude - 40.4461).abs() < 1e-4);
        assert!((coordinate.longitude + 79.9486).abs() < 1e-4);
    }

    #[test]
    fn test_locate_without_gps_info() {
        let metadata: MetadataMap = [(TagName::Named("Make"), TagValue::Text("Sony".to_string()))]
            .into_iter()
            .collect();
        assert_eq!(locate(&metadata), Err(SkipReason::NoGeotags));
        assert_eq!(locate(&MetadataMap::new()), Err(SkipReason::NoGeotags));
    }

    #[test]
    fn test_locate_with_partial_gps_block() {
        let gps = RawBlock::from([(2, TagValue::Reals(vec![40.0, 26.0, 46.0]))]);
        let metadata: MetadataMap = [(TagName::Named(GPS_INFO), TagValue::Block(gps))].into_iter().collect();
        assert_eq!(locate(&metadata), Err(SkipReason::IncompleteGeotags));
    }

    #[test]
    fn test_build_record_carries_all_parts() {
        let metadata = pittsburgh();
        let coordinate = locate(&metadata).unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::new(400, 200));
        let record = build_record(
            Path::new("trip/IMG_0001.jpg"),
            coordinate,
            &metadata,
            img,
            &ThumbnailOptions::default(),
        )
        .unwrap();

        assert_eq!(record.path(), Path::new("trip/IMG_0001.jpg"));
        assert_eq!(record.coordinate(), coordinate);
        assert_eq!((record.thumbnail().width, record.thumbnail().height), (150, 75));
        assert_eq!(record.taken_at().unwrap().to_string(), "2021-05-01 10:00:00");
    }

    #[test]
    fn test_discover_filters_extensions_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2023").join("summer");
        fs::create_dir_all(&nested).unwrap();
        for name in ["b.JPG", "a.jpeg", "notes.txt", "clip.mp4", "c.png"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::write(nested.join("d.jpg"), b"x").unwrap();
        fs::write(dir.path().join("fakejpg"), b"x").unwrap();

        let found: Vec<String> = discover_photos(dir.path(), false)
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(found, vec!["2023/summer/d.jpg", "a.jpeg", "b.JPG"]);
    }

    #[test]
    fn test_hidden_entries_are_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let hidden = dir.path().join(".thumbnails");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("x.jpg"), b"x").unwrap();
        fs::write(dir.path().join(".y.jpg"), b"x").unwrap();
        fs::write(dir.path().join("z.jpg"), b"x").unwrap();

        assert_eq!(discover_photos(dir.path(), false).len(), 1);
        assert_eq!(discover_photos(dir.path(), true).len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_photos_are_discovered() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("library");
        let album = dir.path().join("album");
        fs::create_dir_all(&library).unwrap();
        fs::create_dir_all(&album).unwrap();
        fs::write(library.join("real.jpg"), b"x").unwrap();
        std::os::unix::fs::symlink(library.join("real.jpg"), album.join("linked.jpg")).unwrap();
        std::os::unix::fs::symlink(library.join("missing.jpg"), album.join("dangling.jpg")).unwrap();

        let found: Vec<_> = discover_photos(&album, false)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["linked.jpg"]);
    }

    #[test]
    fn test_photo_without_exif_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        DynamicImage::ImageRgb8(RgbImage::new(8, 8)).save(&path).unwrap();

        let outcome = process_photo(&path, &ScanOptions::default()).unwrap();
        assert!(matches!(outcome, PhotoOutcome::Skipped(SkipReason::NoMetadata)));
    }

    #[test]
    fn test_corrupt_photo_is_a_failure_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"definitely not a jpeg").unwrap();

        assert!(process_photo(&path, &ScanOptions::default()).is_err());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(scan_folder(&missing, &ScanOptions::default()).is_err());
    }

    #[test]
    fn test_empty_folder_yields_no_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let report = scan_folder(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.candidates, 0);
        assert!(report.into_dataset().is_none());
    }

    #[test]
    fn test_every_candidate_is_accounted_for() {
        let dir = tempfile::tempdir().unwrap();
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
            .save(dir.path().join("a.jpg"))
            .unwrap();
        fs::write(dir.path().join("b.jpg"), b"garbage").unwrap();

        let report = scan_folder(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.candidates, 2);
        assert_eq!(report.records.len() + report.skipped.len() + report.failed.len(), 2);
        assert_eq!(report.skipped[0].0.file_name().unwrap(), "a.jpg");
        assert_eq!(report.failed[0].0.file_name().unwrap(), "b.jpg");
    }
}
