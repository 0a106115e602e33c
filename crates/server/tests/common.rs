//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port with a scripted
//! provider and a temporary output directory.

#![allow(unused)]

use anyhow::Result;
use knowbatch::AppConfig;
use knowbatch_server::{router::create_router, state::AppState};
use knowbatch_test_utils::MockAiProvider;
use reqwest::Client;
use std::{net::SocketAddr, path::PathBuf, sync::Arc, sync::Once};
use tempfile::TempDir;
use tokio::{net::TcpListener, task::JoinHandle};

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub provider: MockAiProvider,
    /// Parent of `output_dir`, for files that must not be reachable.
    pub root: TempDir,
    pub output_dir: PathBuf,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    pub async fn spawn(provider: MockAiProvider) -> Result<Self> {
        Self::spawn_with(provider, |_| {}).await
    }

    /// Like [`TestApp::spawn`], with a hook to adjust the configuration.
    pub async fn spawn_with(
        provider: MockAiProvider,
        configure: impl FnOnce(&mut AppConfig),
    ) -> Result<Self> {
        setup_tracing();
        let root = tempfile::tempdir()?;
        let output_dir = root.path().join("reports");

        let mut config = AppConfig::default();
        config.report.output_dir = output_dir.display().to_string();
        configure(&mut config);

        let app_state = AppState {
            config: Arc::new(config),
            ai_provider: Arc::new(provider.clone()),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = create_router(app_state);
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            provider,
            root,
            output_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// File names currently in the output directory, sorted.
    pub fn rendered_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.output_dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
