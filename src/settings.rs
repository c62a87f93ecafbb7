use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::constants::{DEFAULT_OUTPUT, DEFAULT_PORT, DEFAULT_ZOOM, JPEG_QUALITY, POPUP_SIZE, THUMBNAIL_SIZE};
use crate::error::SettingsError;
use crate::html_template::MapOptions;
use crate::image_processing::{DecodeOptions, ThumbnailOptions};
use crate::processing::ScanOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub last_folder: Option<String>,
    pub output: PathBuf,
    pub thumbnail_size: u32,
    pub jpeg_quality: u8,
    pub zoom_start: u8,
    pub parallel: bool,
    pub include_hidden: bool,
    /// Decoder allocation cap in MiB, `None` for unlimited
    pub max_decode_mb: Option<u64>,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_folder: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            thumbnail_size: THUMBNAIL_SIZE,
            jpeg_quality: JPEG_QUALITY,
            zoom_start: DEFAULT_ZOOM,
            parallel: false,
            include_hidden: false,
            max_decode_mb: None,
            port: DEFAULT_PORT,
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value.parse::<T>().map_err(|_| SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn invalid(key: &str, value: impl ToString) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

impl Settings {
    /// Missing file means defaults.
    pub fn load_from(config_path: &Path) -> Result<Self, SettingsError> {
        if !config_path.exists() {
            debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(config_path)?;
        Self::parse(&content)
    }

    /// Parses `key = value` lines. `#` starts a comment line, unknown keys are ignored.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let mut config_map = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(key.trim().to_string(), value.trim().trim_matches('"').to_string());
            }
        }

        let mut settings = Settings::default();
        if let Some(last_folder) = config_map.get("last_folder") {
            settings.last_folder = Some(last_folder.clone());
        }
        if let Some(output) = config_map.get("output") {
            settings.output = PathBuf::from(output);
        }
        if let Some(size) = config_map.get("thumbnail_size") {
            settings.thumbnail_size = parse_value("thumbnail_size", size)?;
        }
        if let Some(quality) = config_map.get("jpeg_quality") {
            settings.jpeg_quality = parse_value("jpeg_quality", quality)?;
        }
        if let Some(zoom) = config_map.get("zoom_start") {
            settings.zoom_start = parse_value("zoom_start", zoom)?;
        }
        if let Some(parallel) = config_map.get("parallel") {
            settings.parallel = parse_value("parallel", parallel)?;
        }
        if let Some(hidden) = config_map.get("include_hidden") {
            settings.include_hidden = parse_value("include_hidden", hidden)?;
        }
        if let Some(limit) = config_map.get("max_decode_mb") {
            settings.max_decode_mb = match limit.as_str() {
                "" | "none" => None,
                mb => Some(parse_value("max_decode_mb", mb)?),
            };
        }
        if let Some(port) = config_map.get("port") {
            settings.port = parse_value("port", port)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.thumbnail_size == 0 {
            return Err(invalid("thumbnail_size", self.thumbnail_size));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(invalid("jpeg_quality", self.jpeg_quality));
        }
        if self.zoom_start > 19 {
            return Err(invalid("zoom_start", self.zoom_start));
        }
        Ok(())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut content = String::new();
        content.push_str("# Photo Location Mapper configuration\n");
        if let Some(ref last_folder) = self.last_folder {
            content.push_str(&format!("last_folder = \"{}\"\n", last_folder));
        }
        content.push_str(&format!("output = \"{}\"\n", self.output.display()));
        content.push_str(&format!("thumbnail_size = {}\n", self.thumbnail_size));
        content.push_str(&format!("jpeg_quality = {}\n", self.jpeg_quality));
        content.push_str(&format!("zoom_start = {}\n", self.zoom_start));
        content.push_str(&format!("parallel = {}\n", self.parallel));
        content.push_str(&format!("include_hidden = {}\n", self.include_hidden));
        match self.max_decode_mb {
            Some(mb) => content.push_str(&format!("max_decode_mb = {}\n", mb)),
            None => content.push_str("max_decode_mb = none\n"),
        }
        content.push_str(&format!("port = {}\n", self.port));

        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Remembers `folder_path`. A path that is not valid UTF-8 cannot be stored, so the
    /// previously saved folder is kept.
    pub fn update_last_folder<P: AsRef<Path>>(&mut self, folder_path: P) {
        match folder_path.as_ref().to_str() {
            Some(folder) => self.last_folder = Some(folder.to_string()),
            None => debug!(path = %folder_path.as_ref().display(), "folder is not valid UTF-8, keeping last_folder"),
        }
    }

    /// `photomap.ini` next to the executable, or at the project root for cargo builds.
    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .unwrap_or_default()
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        if path.ends_with("target/debug") || path.ends_with("target/release") {
            path.pop();
            path.pop();
        }
        path.push("photomap.ini");
        path
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            thumbnail: ThumbnailOptions {
                max_size: self.thumbnail_size,
                quality: self.jpeg_quality,
            },
            decode: DecodeOptions {
                max_alloc: self.max_decode_mb.map(|mb| mb.saturating_mul(1024 * 1024)),
            },
            parallel: self.parallel,
            include_hidden: self.include_hidden,
        }
    }

    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            zoom_start: self.zoom_start,
            popup_size: POPUP_SIZE.max(self.thumbnail_size.saturating_add(20)),
        }
    }
}
