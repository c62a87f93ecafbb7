use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use photo_location_mapper::server::{start_server, AppState};
use photo_location_mapper::{scan_folder, write_map, Settings};

/// Scan a photo folder and plot every geotagged photo on an interactive map.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Folder to scan, defaults to the last scanned folder
    folder: Option<PathBuf>,
    /// Where to write the HTML map
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Bounding box edge of the popup thumbnails in pixels
    #[clap(long)]
    thumbnail_size: Option<u32>,
    /// Process photos on all cores
    #[clap(long, default_value_t = false)]
    parallel: bool,
    /// Serve the map over HTTP after writing it
    #[clap(long, default_value_t = false)]
    serve: bool,
    /// Port for --serve
    #[clap(long)]
    port: Option<u16>,
    /// Configuration file, defaults to photomap.ini next to the binary
    #[clap(long)]
    config: Option<PathBuf>,
    /// Log every photo
    #[clap(short, long, default_value_t = false)]
    verbose: bool,
    /// Do not remember the scanned folder
    #[clap(long, default_value_t = false)]
    no_save: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "photo_location_mapper=debug"
    } else {
        "photo_location_mapper=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let mut settings = Settings::load_from(&config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;

    if let Some(output) = cli.output {
        settings.output = output;
    }
    if let Some(size) = cli.thumbnail_size {
        settings.thumbnail_size = size;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    settings.parallel |= cli.parallel;
    settings.validate()?;

    let folder = cli
        .folder
        .or_else(|| settings.last_folder.as_ref().map(PathBuf::from))
        .context("No folder given and no saved folder found")?;

    println!("🔍 Scanning photos directory: {}", folder.display());
    let options = settings.scan_options();
    let scan_root = folder.clone();
    let report = tokio::task::spawn_blocking(move || scan_folder(&scan_root, &options)).await??;
    report.print_summary();

    if !cli.no_save {
        settings.update_last_folder(&folder);
        if let Err(e) = settings.save_to(&config_path) {
            warn!("Could not save settings to {}: {}", config_path.display(), e);
        }
    }

    let Some(dataset) = report.into_dataset() else {
        println!("⚠️  No geotagged images found.");
        return Ok(());
    };

    println!("\n📸 Found {} geotagged images.", dataset.records().len());
    for record in dataset.records() {
        let coordinate = record.coordinate();
        println!(
            "   Image: {}, Coordinates: ({:.6}, {:.6})",
            record.path().display(),
            coordinate.latitude,
            coordinate.longitude
        );
    }

    let map_options = settings.map_options();
    write_map(&dataset, &settings.output, &map_options)?;
    println!("\n✅ Map has been created and saved as '{}'.", settings.output.display());

    if cli.serve {
        let state = AppState::new(&dataset, &map_options)?;
        start_server(state, settings.port).await?;
    }

    Ok(())
}
