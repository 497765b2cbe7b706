use crate::{
    app::AppContext,
    config::Config,
    error::Result,
    health,
    http::RouteModule,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Assigns a UUID v4 `x-request-id` to requests that arrive without one
#[derive(Clone, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let request_id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(request_id))
    }
}

/// The webhook service: routes, shared context and server settings
pub struct App {
    router: Router<AppContext>,
    config: Config,
    context: AppContext,
}

impl App {
    /// Creates a new App with default configuration and no credentials
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a new App with the provided configuration.
    ///
    /// The context is left empty; use [`App::from_config`] to also load the
    /// credentials listed in `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            router: Self::build_router(),
            config,
            context: AppContext::new(),
        }
    }

    /// Creates an App whose context is built from `config.credentials`
    pub fn from_config(config: Config) -> Result<Self> {
        let store = config.credential_store()?;
        tracing::info!(credentials = store.len(), "Loaded partner credentials");

        let context = AppContext::builder()
            .with_credentials(Arc::new(store))
            .build();

        Ok(Self::with_config(config).with_context(context))
    }

    /// Builder pattern for constructing an App
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    fn build_router() -> Router<AppContext> {
        Router::<AppContext>::new().route("/health", get(health::health_handler))
    }

    /// Register a route module with the application
    pub fn register_module<M: RouteModule>(mut self, module: M) -> Self {
        self.router = module.register(self.router);
        self
    }

    /// Set the application context
    pub fn with_context(mut self, context: AppContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Router with the full middleware stack and state applied
    pub fn into_router(self) -> Router {
        let app = self.with_middleware();
        app.router.with_state(app.context)
    }

    /// Same as [`App::into_router`]; for use with `cardhook::testing`
    pub fn into_test_router(self) -> Router {
        self.into_router()
    }

    /// Apply middleware stack and prepare for serving
    fn with_middleware(mut self) -> Self {
        let mut router = self.router;

        // The last layer added is the outermost. Outer to inner: set request
        // id, propagate request id, trace, timeout, body limit.
        router = router.layer(DefaultBodyLimit::max(self.config.server.max_body_size));

        if let Some(timeout) = self.config.server.request_timeout() {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        router = router
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        self.router = router;
        self
    }

    /// Start the application server
    pub async fn serve(self) -> std::result::Result<(), std::io::Error> {
        let addr = self
            .config
            .server
            .addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let router = self.into_router();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("Server starting on http://{}", addr);
        tracing::info!("Health check available at http://{}/health", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for App with fluent API
#[must_use = "builder does nothing until you call build()"]
pub struct AppBuilder {
    config: Config,
    context: AppContext,
    router: Router<AppContext>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            context: AppContext::new(),
            router: Router::new(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_context(mut self, context: AppContext) -> Self {
        self.context = context;
        self
    }

    pub fn register_module<M: RouteModule>(mut self, module: M) -> Self {
        self.router = module.register(self.router);
        self
    }

    pub fn build(self) -> App {
        let mut app = App::with_config(self.config).with_context(self.context);
        app.router = app.router.merge(self.router);
        app
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }

    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!("Shutdown complete");
}
