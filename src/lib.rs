use std::sync::Arc;
use tokio::sync::Mutex;
pub mod api;
pub mod config;
pub mod model;
pub mod storage;
pub mod validation;

pub use config::Config;

pub struct AppState {
    /// One lock for the whole map; add/update read, compare and append under it.
    pub store: Mutex<storage::WeatherStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(storage::WeatherStore::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Router over a fresh, empty store.
pub fn app() -> axum::Router {
    api::http::router(Arc::new(AppState::new()))
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new());

    // broadcast channel for shutdown signaling
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    let http_shutdown = shutdown_tx.subscribe();
    let mut server = tokio::spawn(api::http::run(state, config.bind_addr, http_shutdown));

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("ctrl-c received, shutting down");
            let _ = shutdown_tx.send(());
        }
        // server exited on its own, e.g. bind failure
        res = &mut server => return res?,
    }

    server.await?
}
