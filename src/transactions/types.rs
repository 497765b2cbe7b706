use serde::{Deserialize, Serialize};

/// Decision for an authorization request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
    Approved,
    Rejected,
}

/// Body of the authorization response.
///
/// Serializes with PascalCase keys in declaration order:
/// `{"Status":"APPROVED","StatusDetail":"APPROVED","Message":"OK"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizationResponse {
    pub status: AuthorizationStatus,
    pub status_detail: String,
    pub message: String,
}

impl AuthorizationResponse {
    pub fn approved() -> Self {
        Self {
            status: AuthorizationStatus::Approved,
            status_detail: "APPROVED".to_string(),
            message: "OK".to_string(),
        }
    }

    pub fn rejected(status_detail: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: AuthorizationStatus::Rejected,
            status_detail: status_detail.into(),
            message: message.into(),
        }
    }
}
