use super::types::AuthorizationResponse;
use crate::error::{CardhookError, Result};
use crate::signature::VerifiedContext;
use async_trait::async_trait;

/// Business logic behind the transaction webhooks.
///
/// Called only after the request signature has been verified. `body` is the
/// raw request body; parse it however your integration needs.
///
/// # Example
///
/// ```rust,ignore
/// struct LedgerProcessor { ledger: Ledger }
///
/// #[async_trait]
/// impl TransactionProcessor for LedgerProcessor {
///     async fn authorize(&self, _ctx: &VerifiedContext, body: &[u8]) -> Result<AuthorizationResponse> {
///         let request: AuthorizationRequest = serde_json::from_slice(body)?;
///         Ok(self.ledger.decide(&request).await?)
///     }
///
///     async fn adjust(&self, _ctx: &VerifiedContext, body: &[u8]) -> Result<()> {
///         self.ledger.apply_adjustment(serde_json::from_slice(body)?).await
///     }
/// }
/// ```
#[async_trait]
pub trait TransactionProcessor: Send + Sync {
    /// Decide on an authorization request
    async fn authorize(&self, context: &VerifiedContext, body: &[u8])
    -> Result<AuthorizationResponse>;

    /// Record an adjustment
    async fn adjust(&self, context: &VerifiedContext, body: &[u8]) -> Result<()>;

    /// Optional: observe processing failures
    async fn on_error(&self, context: &VerifiedContext, error: &CardhookError) {
        tracing::error!(
            api_key_id = %context.api_key_id,
            endpoint = %context.endpoint,
            error = %error,
            "Transaction processing failed"
        );
    }
}

/// Approves every authorization and accepts every adjustment
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveAllProcessor;

#[async_trait]
impl TransactionProcessor for ApproveAllProcessor {
    async fn authorize(
        &self,
        context: &VerifiedContext,
        body: &[u8],
    ) -> Result<AuthorizationResponse> {
        tracing::info!(
            api_key_id = %context.api_key_id,
            body_len = body.len(),
            "Authorization processed"
        );
        Ok(AuthorizationResponse::approved())
    }

    async fn adjust(&self, context: &VerifiedContext, body: &[u8]) -> Result<()> {
        tracing::info!(
            api_key_id = %context.api_key_id,
            body_len = body.len(),
            "Adjustment processed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::AuthorizationStatus;
    use std::sync::Arc;

    fn context() -> VerifiedContext {
        VerifiedContext {
            endpoint: "/transactions/authorizations".to_string(),
            timestamp: "1700000000".to_string(),
            api_key_id: "partner".to_string(),
        }
    }

    #[tokio::test]
    async fn test_approve_all_authorizes() {
        let response = ApproveAllProcessor.authorize(&context(), b"{}").await.unwrap();
        assert_eq!(response.status, AuthorizationStatus::Approved);
        assert_eq!(response, AuthorizationResponse::approved());
    }

    #[tokio::test]
    async fn test_approve_all_accepts_adjustments() {
        assert!(ApproveAllProcessor.adjust(&context(), b"").await.is_ok());
    }

    #[tokio::test]
    async fn test_processor_as_dyn_trait() {
        let processor: Arc<dyn TransactionProcessor> = Arc::new(ApproveAllProcessor);
        let response = processor.authorize(&context(), b"{}").await.unwrap();
        assert_eq!(response.message, "OK");
    }
}
