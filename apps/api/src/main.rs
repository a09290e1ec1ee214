mod classifier;
mod config;
mod errors;
mod ingest;
mod normalize;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::classifier::RoleClassifierHandle;
use crate::config::Config;
use crate::ingest::archive::ArchiveLimits;
use crate::ingest::extract::doc::AntiwordConverter;
use crate::ingest::extract::pdf::PdfExtractReader;
use crate::ingest::extract::TextExtractor;
use crate::ingest::fetch::DriveFetcher;
use crate::ingest::pipeline::{Pipeline, PipelineLimits};
use crate::normalize::Normalizer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    let fetcher = DriveFetcher::new(
        &config.drive_base_url,
        config.fetch_max_retries,
        config.max_download_bytes,
    )?;
    info!("Drive fetcher initialized ({})", config.drive_base_url);

    let extractor = TextExtractor::new(
        Arc::new(PdfExtractReader),
        Arc::new(AntiwordConverter::locate(config.antiword_path.clone())),
    );

    let pipeline = Pipeline::new(
        Arc::new(fetcher),
        Arc::new(extractor),
        PipelineLimits {
            fetch_timeout: config.fetch_timeout,
            extract_timeout: config.extract_timeout,
            archive: ArchiveLimits {
                max_depth: config.max_archive_depth,
                max_uncompressed_bytes: config.max_archive_bytes,
            },
            work_dir: config.work_dir.clone(),
        },
    );

    // Role prediction is only wired when a model is configured.
    let role_classifier = config
        .role_model_path
        .as_deref()
        .map(RoleClassifierHandle::load);
    if role_classifier.is_none() {
        info!("ROLE_MODEL_PATH not set; role prediction disabled");
    }

    let state = AppState {
        pipeline: Arc::new(pipeline),
        normalizer: Arc::new(Normalizer::english()),
        role_classifier,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
