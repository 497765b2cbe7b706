use crate::app::AppContext;
use crate::error::Result;
use crate::http::{RouteModule, SignedRequest, SignedResponse};
use axum::{Router, extract::State, routing::post};

/// Mounts the transaction webhooks under `/transactions`
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionsModule;

impl RouteModule for TransactionsModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/authorizations", post(authorize))
            .route("/adjustments", post(adjust))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/transactions")
    }
}

/// `POST /transactions/authorizations`
async fn authorize(
    State(ctx): State<AppContext>,
    request: SignedRequest,
) -> Result<SignedResponse> {
    let decision = match ctx.processor.authorize(&request.context, &request.body).await {
        Ok(decision) => decision,
        Err(err) => {
            ctx.processor.on_error(&request.context, &err).await;
            return Err(err);
        }
    };

    SignedResponse::json(&ctx.signer, &request.context, &decision)
}

/// `POST /transactions/adjustments`
async fn adjust(State(ctx): State<AppContext>, request: SignedRequest) -> Result<SignedResponse> {
    if let Err(err) = ctx.processor.adjust(&request.context, &request.body).await {
        ctx.processor.on_error(&request.context, &err).await;
        return Err(err);
    }

    SignedResponse::empty(&ctx.signer, &request.context)
}
