//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Resolve each request against the versioned handler registries
//! - Swap in recompiled registries when the config changes
//! - Observability (metrics, request IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigError, ServiceConfig};
use crate::http::endpoints::Dispatcher;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ArcSwap<Dispatcher>>,
}

/// HTTP server for versioned endpoints.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    dispatcher: Arc<ArcSwap<Dispatcher>>,
}

impl HttpServer {
    /// Create a new HTTP server, compiling the configured endpoints.
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        let compiled = Dispatcher::from_config(&config)?;
        tracing::info!(
            endpoints = compiled.endpoints().count(),
            handlers = compiled.handler_count(),
            "Handler tables compiled"
        );

        let dispatcher = Arc::new(ArcSwap::from_pointee(compiled));
        let state = AppState {
            dispatcher: dispatcher.clone(),
        };
        let router = Self::build_router(&config, state);

        Ok(Self {
            router,
            config,
            dispatcher,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Router clone, for serving or driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The currently active handler tables.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.load_full()
    }

    /// Recompile and swap in the endpoints of `config`.
    ///
    /// Listener and timeout settings only take effect on restart.
    pub fn reload(&self, config: &ServiceConfig) -> Result<usize, ConfigError> {
        swap_dispatcher(&self.dispatcher, config)
    }

    /// Get a reference to the startup config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Serve until `shutdown` fires, applying configs from `config_updates`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServiceConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let handle = self.dispatcher.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match swap_dispatcher(&handle, &config) {
                    Ok(handlers) => tracing::info!(handlers, "Handler tables reloaded"),
                    Err(e) => tracing::error!(error = %e, "Reload rejected, keeping current handlers"),
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn swap_dispatcher(handle: &ArcSwap<Dispatcher>, config: &ServiceConfig) -> Result<usize, ConfigError> {
    let compiled = Dispatcher::from_config(config)?;
    let handlers = compiled.handler_count();
    handle.store(Arc::new(compiled));
    Ok(handlers)
}

/// Resolve the request's version against the endpoint's handlers.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path();
    let dispatcher = state.dispatcher.load_full();

    let Some(registry) = dispatcher.endpoint(path) else {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, "No versioned endpoint");
        metrics::record_dispatch(method.as_str(), metrics::Outcome::NoEndpoint, start_time);
        return response::error(StatusCode::NOT_FOUND, format!("no endpoint at {}", path));
    };

    let version = match dispatcher.headers().extract(request.headers()) {
        Ok(version) => version,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Unreadable request version");
            metrics::record_dispatch(method.as_str(), metrics::Outcome::BadVersion, start_time);
            return response::error(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    match registry.resolve(&method, &version) {
        Ok(resolved) => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                version = %version,
                handler = %resolved.handler.name,
                "Dispatching request"
            );
            metrics::record_dispatch(method.as_str(), metrics::Outcome::Resolved(resolved.tier), start_time);
            response::render(resolved, dispatcher.envelope())
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "No handler for request version");
            metrics::record_dispatch(method.as_str(), metrics::Outcome::NotFound, start_time);
            response::error(StatusCode::NOT_FOUND, e.to_string())
        }
    }
}
