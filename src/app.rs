use crate::credentials::{CredentialStore, InMemoryCredentialStore};
use crate::signature::{ResponseSigner, SignatureVerifier};
use crate::transactions::{ApproveAllProcessor, TransactionProcessor};
use axum::extract::FromRef;
use std::sync::Arc;

/// Shared, read-only dependencies for request handlers.
///
/// The verifier and signer are built from the same credential store so a
/// response is always signed with the secret its request was verified with.
/// Nothing in here is mutated after startup; per-request values travel in
/// [`VerifiedContext`](crate::signature::VerifiedContext).
#[derive(Clone)]
pub struct AppContext {
    pub credentials: Arc<dyn CredentialStore>,
    pub verifier: Arc<SignatureVerifier>,
    pub signer: Arc<ResponseSigner>,
    pub processor: Arc<dyn TransactionProcessor>,
}

impl AppContext {
    /// Context with no credentials; every signed request is rejected
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FromRef<AppContext> for Arc<SignatureVerifier> {
    fn from_ref(context: &AppContext) -> Self {
        context.verifier.clone()
    }
}

impl FromRef<AppContext> for Arc<ResponseSigner> {
    fn from_ref(context: &AppContext) -> Self {
        context.signer.clone()
    }
}

/// Builder for AppContext with fluent API
#[must_use = "builder does nothing until you call build()"]
pub struct AppContextBuilder {
    credentials: Option<Arc<dyn CredentialStore>>,
    processor: Option<Arc<dyn TransactionProcessor>>,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self {
            credentials: None,
            processor: None,
        }
    }

    /// Set the credential store shared by the verifier and the signer
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the business logic; defaults to [`ApproveAllProcessor`]
    pub fn with_processor(mut self, processor: Arc<dyn TransactionProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn build(self) -> AppContext {
        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(InMemoryCredentialStore::new()));
        let processor = self
            .processor
            .unwrap_or_else(|| Arc::new(ApproveAllProcessor));

        AppContext {
            verifier: Arc::new(SignatureVerifier::new(credentials.clone())),
            signer: Arc::new(ResponseSigner::new(credentials.clone())),
            credentials,
            processor,
        }
    }
}

impl Default for AppContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
