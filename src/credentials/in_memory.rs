use super::{Credential, CredentialStore, SharedSecret};
use std::collections::HashMap;

/// Credential store backed by a `HashMap`, filled once at startup.
///
/// Used for tests and for deployments that load their partner secrets from
/// configuration. The map is never mutated after construction, so concurrent
/// lookups need no locking.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    secrets: HashMap<String, SharedSecret>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a credential, replacing any previous secret for the same key id
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.insert(credential);
        self
    }

    pub fn insert(&mut self, credential: Credential) {
        let Credential { api_key_id, secret } = credential;
        if self.secrets.insert(api_key_id.clone(), secret).is_some() {
            tracing::warn!(api_key_id = %api_key_id, "Duplicate credential replaced");
        }
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl FromIterator<Credential> for InMemoryCredentialStore {
    fn from_iter<I: IntoIterator<Item = Credential>>(iter: I) -> Self {
        let mut store = Self::new();
        for credential in iter {
            store.insert(credential);
        }
        store
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn lookup(&self, api_key_id: &str) -> Option<SharedSecret> {
        self.secrets.get(api_key_id).cloned()
    }

    fn credential_count(&self) -> Option<usize> {
        Some(self.secrets.len())
    }
}
