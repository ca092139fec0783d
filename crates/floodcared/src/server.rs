//! HTTP server for floodcared

use crate::routes;
use anyhow::{Context, Result};
use axum::Router;
use floodcare_common::cache::LocalCache;
use floodcare_common::classifier::{ModelClassifier, RiskClassifier, TieredClassifier};
use floodcare_common::config::FloodConfig;
use floodcare_common::gateway::{ReportGateway, SheetGateway};
use floodcare_common::geo::{CommandLocation, LocationProvider, NoLocation};
use floodcare_common::model_client::ModelClient;
use floodcare_common::session::AdminSession;
use floodcare_common::store::{FloodStore, SharedStore};
use floodcare_common::sync::SyncLoop;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub store: SharedStore,
    pub session: AdminSession,
    pub gateway: Arc<dyn ReportGateway>,
    pub classifier: Arc<dyn RiskClassifier>,
    pub sync: Arc<SyncLoop>,
    /// Advice chat; the classifier holds its own client
    pub advisor: ModelClient,
    pub locator: Arc<dyn LocationProvider>,
    pub sos_timeout: Duration,
    pub remote_configured: bool,
    pub start_time: Instant,
}

impl AppState {
    /// Wire every component from config. Reads the cache, touches no network.
    pub fn from_config(config: &FloodConfig) -> Result<Self> {
        let data_dir = config.data_dir();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;

        let store = FloodStore::open(LocalCache::new(&data_dir)).into_shared();
        let gateway = SheetGateway::from_config(&config.remote)?;

        let classifier: Arc<dyn RiskClassifier> = if config.classifier.enabled {
            let client = ModelClient::new(config.classifier.clone())?;
            info!("  Model tier enabled ({})", config.classifier.model);
            Arc::new(TieredClassifier::with_external(
                Arc::new(ModelClassifier::new(client)),
                Duration::from_secs(config.classifier.timeout_secs),
            ))
        } else {
            info!("  Model tier disabled, keyword classification only");
            Arc::new(TieredClassifier::keyword_only())
        };

        let sync = Arc::new(SyncLoop::new(
            gateway.clone(),
            store.clone(),
            config.sync.merge_policy,
            Duration::from_secs(config.sync.interval_secs.max(1)),
        ));

        let locator: Arc<dyn LocationProvider> =
            match CommandLocation::from_argv(&config.geo.locate_command) {
                Some(command) => Arc::new(command),
                None => Arc::new(NoLocation),
            };

        Ok(Self {
            store,
            session: AdminSession::new(&config.admin.password, &data_dir),
            gateway,
            classifier,
            sync,
            advisor: ModelClient::new(config.classifier.clone())?,
            locator,
            sos_timeout: Duration::from_secs(config.geo.sos_timeout_secs),
            remote_configured: config
                .remote
                .endpoint
                .as_deref()
                .is_some_and(|e| !e.trim().is_empty()),
            start_time: Instant::now(),
        })
    }
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::report_routes())
        .merge(routes::announcement_routes())
        .merge(routes::admin_routes())
        .merge(routes::sync_routes())
        .merge(routes::advice_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until `shutdown` resolves
pub async fn run(
    state: Arc<AppState>,
    bind: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("  Listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
