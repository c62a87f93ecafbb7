use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::constants::{DEFAULT_ZOOM, POPUP_SIZE};
use crate::records::MapDataset;

#[derive(Debug, Clone, Copy)]
pub struct MapOptions {
    pub zoom_start: u8,
    /// Popup width and height in pixels
    pub popup_size: u32,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            zoom_start: DEFAULT_ZOOM,
            popup_size: POPUP_SIZE,
        }
    }
}

// One marker as seen by the page script
#[derive(Serialize)]
struct MarkerData {
    lat: f64,
    lng: f64,
    path: String,
    thumbnail: String,
    taken_at: Option<String>,
}

/// Renders a self-contained clustered map of the dataset.
pub fn render_map_html(dataset: &MapDataset, options: &MapOptions) -> Result<String> {
    let markers: Vec<MarkerData> = dataset
        .records()
        .iter()
        .map(|record| MarkerData {
            lat: record.coordinate().latitude,
            lng: record.coordinate().longitude,
            path: record.path().display().to_string(),
            thumbnail: record.thumbnail().data_url(),
            taken_at: record.taken_at().map(|t| t.format("%d.%m.%Y %H:%M").to_string()),
        })
        .collect();

    let markers_json = serde_json::to_string(&markers).context("Failed to serialize markers")?;
    let center = dataset.centroid();

    // Markers last, file paths may contain placeholder names
    let html = MAP_HTML
        .replace("__CENTER_LAT__", &center.latitude.to_string())
        .replace("__CENTER_LNG__", &center.longitude.to_string())
        .replace("__ZOOM__", &options.zoom_start.to_string())
        .replace("__POPUP_SIZE__", &options.popup_size.to_string())
        .replace("__PHOTO_COUNT__", &dataset.records().len().to_string())
        .replace("__MARKERS__", &escape_script(&markers_json));
    Ok(html)
}

/// Writes the rendered map to `path`.
pub fn write_map(dataset: &MapDataset, path: &Path, options: &MapOptions) -> Result<()> {
    let html = render_map_html(dataset, options)?;
    std::fs::write(path, html).with_context(|| format!("Failed to write map to {}", path.display()))
}

// JSON inside <script> must not contain a closing tag
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

// HTML template for the map page
const MAP_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Photo Map (__PHOTO_COUNT__ photos)</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css" />
    <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css" />
    <style>
        body { margin: 0; padding: 0; font-family: Arial, sans-serif; }
        #map { height: 100vh; width: 100%; }
        .photo-popup { text-align: center; }
        .photo-popup img { max-width: 100%; height: auto; cursor: pointer; }
        .photo-popup .filename {
            background: rgba(255, 255, 255, 0.8);
            color: black;
            padding: 5px;
            font-size: 0.8em;
            word-break: break-all;
        }
        .photo-popup .datetime { color: #666; font-size: 0.8em; }
    </style>
</head>
<body>
    <div id="map"></div>
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script src="https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js"></script>
    <script>
        const photos = __MARKERS__;
        const popupSize = __POPUP_SIZE__;

        const map = L.map('map').setView([__CENTER_LAT__, __CENTER_LNG__], __ZOOM__);
        L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
            maxZoom: 19,
            attribution: '&copy; OpenStreetMap contributors'
        }).addTo(map);

        function fileUrl(path) {
            return 'file:///' + encodeURI(path.replace(/\\/g, '/').replace(/^\/+/, ''));
        }

        function buildPopup(photo) {
            const container = document.createElement('div');
            container.className = 'photo-popup';
            container.style.width = popupSize + 'px';

            const url = fileUrl(photo.path);
            const img = document.createElement('img');
            img.src = photo.thumbnail;
            img.alt = photo.path;
            img.title = 'Copy file URL';
            img.addEventListener('click', () => {
                navigator.clipboard.writeText(url);
                alert('Copied URL to clipboard: ' + url);
            });
            container.appendChild(img);

            if (photo.taken_at) {
                const date = document.createElement('div');
                date.className = 'datetime';
                date.textContent = photo.taken_at;
                container.appendChild(date);
            }

            const name = document.createElement('div');
            name.className = 'filename';
            name.textContent = photo.path;
            container.appendChild(name);
            return container;
        }

        const cluster = L.markerClusterGroup();
        for (const photo of photos) {
            L.marker([photo.lat, photo.lng])
                .bindPopup(() => buildPopup(photo), { maxWidth: popupSize })
                .addTo(cluster);
        }
        map.addLayer(cluster);
    </script>
</body>
</html>
"#;
