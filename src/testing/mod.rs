//! Testing utilities for cardhook services.
//!
//! Drive a router in-process with a fluent request builder, sign requests
//! the way a partner would, and check the signature on the response.
//!
//! # Example
//!
//! ```rust,ignore
//! use cardhook::{App, testing};
//!
//! #[tokio::test]
//! async fn test_authorization() {
//!     let app = App::from_config(config)?.register_module(TransactionsModule).into_test_router();
//!
//!     testing::post(app, "/transactions/authorizations")
//!         .json_body(&serde_json::json!({"amount": 100}))
//!         .signed("partner", SECRET_B64)
//!         .execute()
//!         .await
//!         .assert_ok()
//!         .assert_signed_by(SECRET_B64)
//!         .await;
//! }
//! ```

mod scenario;

pub use scenario::{DEFAULT_TIMESTAMP, Scenario, ScenarioAssert, get, post};
