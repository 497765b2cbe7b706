//! cardhook - signed card-transaction webhooks on Axum
//!
//! A card issuer ("the partner") calls your service with HMAC-SHA256 signed
//! requests and expects HMAC-SHA256 signed responses. cardhook verifies the
//! inbound signature over the exact body bytes, hands the verified request
//! to your [`TransactionProcessor`], and signs whatever you answer with the
//! same shared secret.
//!
//! # Features
//!
//! - **Signatures**: canonical message, constant-time verification, response signing
//! - **Credentials**: pluggable [`CredentialStore`] with an in-memory default
//! - **HTTP**: [`SignedRequest`] extractor and [`SignedResponse`] for any Axum route
//! - **Transactions**: ready-made authorization and adjustment webhooks
//! - **Health Checks**: reports degraded while no credentials are loaded
//! - **Testing**: in-process scenarios that sign requests like a partner would
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cardhook::{App, ConfigBuilder, TransactionsModule};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     cardhook::init_tracing_with_config(&config);
//!
//!     App::from_config(config)?
//!         .register_module(TransactionsModule)
//!         .serve()
//!         .await?;
//!     Ok(())
//! }
//! ```

mod app;
mod config;
mod core;
pub mod credentials;
mod error;
pub mod health;
mod http;
pub mod signature;
pub mod testing;
pub mod transactions;
mod utils;

pub use app::{AppContext, AppContextBuilder};
pub use config::{
    Config, ConfigBuilder, CredentialConfig, LoggingConfig, ServerConfig, parse_credentials,
};
pub use core::{App, AppBuilder, MakeRequestUuid};
pub use credentials::{
    Credential, CredentialError, CredentialStore, InMemoryCredentialStore, SharedSecret,
};
pub use error::{CardhookError, ErrorResponse, INVALID_SIGNATURE_MESSAGE, Result};
pub use health::{ComponentHealth, HealthCheck, HealthChecker, HealthStatus};
pub use http::{RouteModule, SignedRequest, SignedResponse};
pub use signature::{
    ResponseSigner, SignatureAlgorithm, SignatureVerifier, SigningError, VerificationError,
    VerifiedContext,
};
pub use transactions::{
    ApproveAllProcessor, AuthorizationResponse, AuthorizationStatus, TransactionProcessor,
    TransactionsModule,
};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main()
/// before creating the App.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "cardhook=debug")
/// - `CARDHOOK_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing from a validated [`Config`].
///
/// `RUST_LOG` still wins over `config.logging.level` when set.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
