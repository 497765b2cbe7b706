//! HTTP glue: signed request extraction, signed responses, and route modules.

pub mod routes;
pub mod signed;

pub use routes::RouteModule;
pub use signed::{SignedRequest, SignedResponse};
