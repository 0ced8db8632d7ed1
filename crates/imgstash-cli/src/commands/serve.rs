//! Serve command: assemble the router and run the HTTP server

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use clap::Args;
use imgstash_core::ServerConfig;
use imgstash_server::{configure_routes, AppState, ImagesApiDoc};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:3000", env = "IMGSTASH_ADDRESS")]
    address: String,

    /// Directory to store uploaded images in (default: ./uploads)
    #[arg(long, env = "IMGSTASH_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Static public base URL; when unset, URLs follow the request Host
    #[arg(long, env = "IMGSTASH_BASE_URL")]
    base_url: Option<String>,
}

impl ServeCommand {
    pub async fn execute(self) -> anyhow::Result<()> {
        let config = ServerConfig::new(self.address, self.upload_dir, self.base_url)?;
        info!("Storing uploads in {}", config.upload_dir.display());

        let state = Arc::new(AppState::new(config.clone()));
        let app = configure_routes(state)
            .route("/api/openapi.json", get(openapi_json))
            .fallback(not_found)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&config.address).await?;
        info!("Imgstash server listening on {}", config.address);

        axum::serve(listener, app).await?;
        info!("Imgstash server exited");
        Ok(())
    }
}

async fn openapi_json() -> impl IntoResponse {
    Json(ImagesApiDoc::openapi())
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Sorry, can't find that!")
}
