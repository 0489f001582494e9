use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::media::MediaStore;
use common::media::memory::MemoryMediaStore;
use common::media::s3::{S3MediaStore, S3Settings};
use tracing::{Level, info};

use server::config::{AppConfig, MediaConfig};
use server::database;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = database::init_db(&config.database.url).await?;
    let media = build_media_store(&config.media)?;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState {
        db,
        media,
        config: Arc::new(config),
    };
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_media_store(cfg: &MediaConfig) -> anyhow::Result<Arc<dyn MediaStore>> {
    match cfg.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryMediaStore::new(
            cfg.public_base_url.clone(),
        ))),
        "s3" => {
            let settings = S3Settings {
                endpoint: cfg
                    .endpoint
                    .clone()
                    .context("media.endpoint is required for the s3 backend")?,
                region: cfg
                    .region
                    .clone()
                    .unwrap_or_else(|| "us-east-1".to_string()),
                bucket: cfg
                    .bucket
                    .clone()
                    .context("media.bucket is required for the s3 backend")?,
                access_key: cfg
                    .access_key
                    .clone()
                    .context("media.access_key is required for the s3 backend")?,
                secret_key: cfg
                    .secret_key
                    .clone()
                    .context("media.secret_key is required for the s3 backend")?,
                public_base_url: cfg.public_base_url.clone(),
            };
            Ok(Arc::new(S3MediaStore::new(&settings)?))
        }
        other => anyhow::bail!("Unknown media backend '{other}' (expected 'memory' or 's3')"),
    }
}
