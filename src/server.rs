use anyhow::Result;
use axum::{extract::State, response::Html, routing::get, Json, Router};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::html_template::{render_map_html, MapOptions};
use crate::records::MapDataset;

// Structure for API responses
#[derive(Serialize, Debug, Clone)]
pub struct PhotoSummary {
    pub path: String,
    pub lat: f64,
    pub lng: f64,
    pub taken_at: Option<NaiveDateTime>,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
}

// Rendered once after the scan, served read-only
#[derive(Clone)]
pub struct AppState {
    html: Arc<String>,
    photos: Arc<Vec<PhotoSummary>>,
}

impl AppState {
    pub fn new(dataset: &MapDataset, options: &MapOptions) -> Result<Self> {
        let photos = dataset
            .records()
            .iter()
            .map(|record| PhotoSummary {
                path: record.path().display().to_string(),
                lat: record.coordinate().latitude,
                lng: record.coordinate().longitude,
                taken_at: record.taken_at(),
                thumbnail_width: record.thumbnail().width,
                thumbnail_height: record.thumbnail().height,
            })
            .collect();

        Ok(Self {
            html: Arc::new(render_map_html(dataset, options)?),
            photos: Arc::new(photos),
        })
    }
}

pub async fn serve_map_html(State(state): State<AppState>) -> Html<String> {
    Html(state.html.as_str().to_owned())
}

pub async fn get_all_photos(State(state): State<AppState>) -> Json<Vec<PhotoSummary>> {
    Json(state.photos.as_ref().clone())
}

// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_map_html))
        .route("/api/photos", get(get_all_photos))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<()> {
    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "HTTP server started");
    println!("   🌐 Map available at http://{}", addr);
    println!("      - GET /api/photos - List all located photos");

    axum::serve(listener, app).await?;
    Ok(())
}
