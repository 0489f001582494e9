#![allow(dead_code)] // Each test binary uses a different slice of this harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use common::media::memory::MemoryMediaStore;
use common::media::{MediaError, MediaKey, MediaStore, PendingUpload, UploadedMedia};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use server::config::{
    AppConfig, CorsConfig, DatabaseConfig, MediaConfig, ServerConfig,
};
use server::state::AppState;

/// Fresh in-memory SQLite database with the schema synced from the
/// entity registry. One connection: every pooled connection of a
/// `sqlite::memory:` URL would otherwise get its own database.
pub async fn test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await
        .expect("Failed to sync schema");
    db
}

/// Media host test double: delegates to an in-memory store, counts
/// operations, and can be told to fail uploads.
pub struct TestMediaStore {
    pub inner: MemoryMediaStore,
    fail_uploads: AtomicBool,
    uploads: AtomicUsize,
    deletes: AtomicUsize,
}

impl TestMediaStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryMediaStore::default(),
            fail_uploads: AtomicBool::new(false),
            uploads: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        })
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Whether the store still holds the object behind a persisted key
    /// column value.
    pub fn holds(&self, stored_key: &str) -> bool {
        match MediaKey::parse(stored_key) {
            Ok(key) => self.inner.contains(&key),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl MediaStore for TestMediaStore {
    async fn upload(
        &self,
        upload: &PendingUpload,
        folder: &str,
    ) -> Result<UploadedMedia, MediaError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(MediaError::Transport("injected upload failure".into()));
        }
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.inner.upload(upload, folder).await
    }

    async fn delete(&self, key: &MediaKey) -> Result<bool, MediaError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }
}

/// A small PNG-ish payload for upload tests.
pub fn png_upload(name: &str) -> PendingUpload {
    PendingUpload::new(
        vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a],
        name.to_string(),
        Some("image/png".to_string()),
    )
}

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: Vec::new(),
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        media: MediaConfig {
            backend: "memory".to_string(),
            public_base_url: "memory://media".to_string(),
            max_upload_size: 4 * 1024 * 1024,
            endpoint: None,
            region: None,
            bucket: None,
            access_key: None,
            secret_key: None,
        },
    }
}

/// Spawn the application on an ephemeral port; returns its base URL plus
/// handles to the backing database and media store.
pub async fn spawn_app() -> (String, Arc<TestMediaStore>, DatabaseConnection) {
    let db = test_db().await;
    let media = TestMediaStore::new();
    let media_dyn: Arc<dyn MediaStore> = media.clone();

    let state = AppState {
        db: db.clone(),
        media: media_dyn,
        config: Arc::new(test_config()),
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server crashed");
    });

    (format!("http://{addr}"), media, db)
}
