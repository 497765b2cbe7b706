use crate::app::AppContext;
use axum::Router;

/// A group of routes mounted into the application.
///
/// # Example
///
/// ```rust,ignore
/// struct TransactionsModule;
///
/// impl RouteModule for TransactionsModule {
///     fn routes(&self) -> Router<AppContext> {
///         Router::new().route("/authorizations", post(authorizations))
///     }
///
///     fn prefix(&self) -> Option<&str> {
///         Some("/transactions")
///     }
/// }
/// ```
pub trait RouteModule {
    /// Routes without state applied; the App provides `AppContext`
    fn routes(&self) -> Router<AppContext>;

    /// Optional path prefix for all routes in this module
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Mount this module's routes into `router`, nested under the prefix if any
    fn register(&self, router: Router<AppContext>) -> Router<AppContext> {
        let routes = self.routes();

        match self.prefix() {
            Some(prefix) => router.nest(prefix, routes),
            None => router.merge(routes),
        }
    }
}
