//! The two partner-facing transaction webhooks.
//!
//! - `POST /transactions/authorizations`: the partner asks whether to approve
//!   a card transaction; the answer is a signed JSON body.
//! - `POST /transactions/adjustments`: the partner reports an adjustment to a
//!   past transaction; the answer is a signed, empty body.
//!
//! Both verify the request signature first and never reach the
//! [`TransactionProcessor`] when verification fails.

pub mod processor;
pub mod routes;
pub mod types;

pub use processor::{ApproveAllProcessor, TransactionProcessor};
pub use routes::TransactionsModule;
pub use types::{AuthorizationResponse, AuthorizationStatus};
