use std::net::SocketAddr;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::protocol::{SharedStore, add, admin, next, remove};

/// Build the HTTP router over `store`
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(admin::welcome))
        .route("/next", get(next::next))
        .route(
            "/add-to-jokes",
            get(add::add_from_query).post(add::add_from_json),
        )
        .route(
            "/remove-from-jokes",
            get(remove::remove_from_query).post(remove::remove_from_json),
        )
        .route("/jokes", get(admin::list))
        .route("/open-jokes", get(admin::open))
        .route("/close-jokes", get(admin::close))
        .route("/clear-jokes", get(admin::clear))
        .with_state(store)
}

/// HTTP server
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    store: SharedStore,
}

impl Server {
    /// Bind the server to the configured address
    pub async fn start(config: &Config, store: SharedStore) -> std::io::Result<Self> {
        Self::bind(&config.server_addr(), store).await
    }

    /// Bind the server to `addr`
    pub async fn bind(addr: &str, store: SharedStore) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            store,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until the process exits
    pub async fn run(self) -> std::io::Result<()> {
        info!("Server started, listening on {}", self.local_addr);
        axum::serve(self.listener, router(self.store)).await
    }
}
