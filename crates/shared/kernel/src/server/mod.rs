//! Local HTTP server for previewing a catalog.
//!
//! ## Example
//! ```no_run
//! use catalog_kernel::server::StaticServer;
//!
//! # async fn example() -> Result<(), catalog_kernel::server::ServerError> {
//! StaticServer::builder()
//!     .root("/data/catalog")
//!     .port(8000)
//!     .build()?
//!     .run()
//!     .await
//! # }
//! ```

mod health;
mod router;

pub use router::{HEALTH_PATH, site_router};

use axum_server::Handle;
use catalog_domain::config::ServerConfig;
use std::borrow::Cow;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[catalog_derive::catalog_error]
pub enum ServerError {
    #[error("Server I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
    #[error("Server configuration error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// A fluent builder for configuring the [`StaticServer`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct StaticServerBuilder {
    cfg: ServerConfig,
    root: Option<PathBuf>,
}

impl StaticServerBuilder {
    pub fn config(mut self, cfg: ServerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub const fn address(mut self, address: IpAddr) -> Self {
        self.cfg.address = address;
        self
    }

    pub const fn port(mut self, port: u16) -> Self {
        self.cfg.port = port;
        self
    }

    /// Consumes the builder and checks the served directory.
    ///
    /// # Errors
    /// Returns [`ServerError::Validation`] when no root was supplied or it is not a directory.
    pub fn build(self) -> Result<StaticServer, ServerError> {
        let root = self.root.ok_or_else(|| ServerError::Validation {
            message: "root directory not provided".into(),
            context: None,
        })?;

        if !root.is_dir() {
            return Err(ServerError::Validation {
                message: root.display().to_string().into(),
                context: Some("Served root is not a directory".into()),
            });
        }

        let address = SocketAddr::new(self.cfg.address, self.cfg.port);
        Ok(StaticServer { root, address })
    }
}

/// A configured static file server ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct StaticServer {
    root: PathBuf,
    address: SocketAddr,
}

impl StaticServer {
    pub fn builder() -> StaticServerBuilder {
        StaticServerBuilder::default()
    }

    #[must_use]
    pub const fn address(&self) -> SocketAddr {
        self.address
    }

    /// Serves until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// Returns [`ServerError::Io`] if binding the address fails.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(async {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
            }
        })
        .await
    }

    /// Serves until `shutdown` resolves, then drains open connections.
    ///
    /// # Errors
    /// Returns [`ServerError::Io`] if binding the address fails.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = site_router(&self.root);

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            shutdown.await;
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        info!(address = %self.address, root = %self.root.display(), "Serving catalog");
        info!("Navigate to http://{} in your browser, press CTRL+C to stop", self.address);

        axum_server::bind(self.address)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context(format!("HTTP server failed on {}", self.address))?;

        info!("Server shutdown complete");
        Ok(())
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<(), ServerError> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, ServerError>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<(), ServerError>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}
