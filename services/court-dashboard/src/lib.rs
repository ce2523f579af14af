//! Court Dashboard - tennis court booking schedule dashboard
//!
//! Reads the scheduler backend through a shared query cache, keeps health
//! and scheduler status fresh in the background, and serves a status page
//! plus JSON endpoints.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod mutations;
pub mod poller;
pub mod queries;
pub mod query;

pub use config::{load_config, Config};
pub use error::{DashboardError, Result};
pub use mutations::Mutation;
pub use queries::Queries;
pub use query::{make_query_client, QueryClient, QueryKey, QueryObserver, QueryPolicy, QueryState};

use std::net::SocketAddr;
use std::sync::Arc;

use court_api::{ApiClient, HttpClient, ReqwestHttpClient};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Assembles a [`Dashboard`] from configuration
pub struct DashboardBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
}

impl DashboardBuilder {
    pub fn new(config: Config) -> Self {
        Self { config, http: None }
    }

    /// Transport to the backend; defaults to reqwest
    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Create the cache and bind the dashboard listener if enabled
    pub async fn build(self) -> Result<Dashboard> {
        let http = self
            .http
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()) as Arc<dyn HttpClient>);
        let api = ApiClient::new(self.config.api.base_url.clone(), http);
        let queries = Queries::new(make_query_client(), api).with_polling(&self.config.polling);

        let listener = if self.config.dashboard.enabled {
            let addr = SocketAddr::from(([0, 0, 0, 0], self.config.dashboard.port));
            let listener = TcpListener::bind(addr).await.inspect_err(|e| {
                tracing::error!(
                    "Failed to bind dashboard to port {}: {}",
                    self.config.dashboard.port,
                    e
                )
            })?;
            Some(listener)
        } else {
            None
        };

        Ok(Dashboard {
            config: self.config,
            queries,
            listener,
            cancel: CancellationToken::new(),
        })
    }
}

/// A configured dashboard, ready to start
pub struct Dashboard {
    config: Config,
    queries: Queries,
    listener: Option<TcpListener>,
    cancel: CancellationToken,
}

impl Dashboard {
    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    /// Address of the bound dashboard listener, if enabled
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Cancelling this token stops [`start`](Self::start)
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run pollers and the dashboard until cancelled or Ctrl-C
    pub async fn start(self) -> Result<()> {
        let cancel = self.cancel;

        let cancel_for_signal = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown signal received"),
                Err(e) => {
                    tracing::error!("Failed to listen for ctrl-c: {}", e);
                    return;
                }
            }
            cancel_for_signal.cancel();
        });

        let _health = self.queries.watch_health().await;
        let _scheduler_status = self.queries.watch_scheduler_status().await;
        let gc = poller::spawn_gc_loop(
            self.queries.client().clone(),
            self.config.polling.gc_interval,
            cancel.clone(),
        );

        tracing::info!(
            "Court dashboard started against {}",
            self.queries.api().base_url()
        );

        if let Some(listener) = self.listener {
            if let Ok(addr) = listener.local_addr() {
                tracing::info!("Dashboard listening on http://{}", addr);
            }
            let router =
                dashboard::build_router(self.queries.clone(), self.config.dashboard.upcoming_days);
            let cancel_for_dashboard = cancel.clone();
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel_for_dashboard.cancelled().await;
                })
                .await
                .map_err(|e| DashboardError::Server(e.to_string()))?;
            tracing::debug!("Dashboard stopped");
        } else {
            cancel.cancelled().await;
        }

        let _ = gc.await;
        tracing::info!("Court dashboard stopped");
        Ok(())
    }
}
