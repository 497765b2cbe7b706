use crate::error::{CardhookError, Result};
use crate::signature::{ResponseSigner, SignatureVerifier, VerifiedContext};
use axum::{
    body::{Body, Bytes},
    extract::{FromRef, FromRequest, Request},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// Extractor for a request whose signature has been verified.
///
/// Buffers the whole body once, verifies `x-signature` over the raw bytes,
/// and hands both to the handler. Any verification failure rejects the
/// request with a generic 401 before the handler runs. Must be the last
/// extractor of a handler since it consumes the body.
///
/// # Example
///
/// ```rust,ignore
/// async fn authorize(
///     State(ctx): State<AppContext>,
///     request: SignedRequest,
/// ) -> cardhook::Result<SignedResponse> {
///     let decision = approve(&request.body)?;
///     SignedResponse::json(&ctx.signer, &request.context, &decision)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub context: VerifiedContext,
    /// The body exactly as received
    pub body: Bytes,
}

impl SignedRequest {
    /// Deserialize the verified body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl<S> FromRequest<S> for SignedRequest
where
    Arc<SignatureVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CardhookError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let verifier = Arc::<SignatureVerifier>::from_ref(state);
        let headers = req.headers().clone();

        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::warn!(error = %rejection, "Failed to buffer webhook body");
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                CardhookError::payload_too_large(rejection.body_text())
            } else {
                CardhookError::bad_request(rejection.body_text())
            }
        })?;

        let context = verifier.verify(&headers, &body)?;

        Ok(SignedRequest { context, body })
    }
}

/// A JSON response signed over its exact body bytes.
///
/// The body is serialized once, signed, and written unchanged, so the
/// signature always covers what goes on the wire. Headers are complete
/// before the response is handed to the transport.
#[derive(Debug, Clone)]
pub struct SignedResponse {
    headers: HeaderMap,
    body: Bytes,
}

impl SignedResponse {
    /// Serialize `value` with `serde_json` and sign the resulting bytes
    pub fn json<T: Serialize>(
        signer: &ResponseSigner,
        context: &VerifiedContext,
        value: &T,
    ) -> Result<Self> {
        let body = serde_json::to_vec(value)?;
        Self::from_bytes(signer, context, Bytes::from(body))
    }

    /// A response with no body; the signature covers `timestamp || endpoint`
    pub fn empty(signer: &ResponseSigner, context: &VerifiedContext) -> Result<Self> {
        let signature = signer.sign_response(context, None)?;
        let mut headers = HeaderMap::new();
        signature.apply(&mut headers)?;

        Ok(Self {
            headers,
            body: Bytes::new(),
        })
    }

    /// Sign pre-rendered body bytes
    pub fn from_bytes(
        signer: &ResponseSigner,
        context: &VerifiedContext,
        body: Bytes,
    ) -> Result<Self> {
        let signature = signer.sign_response(context, Some(&body[..]))?;
        let mut headers = HeaderMap::new();
        signature.apply(&mut headers)?;

        Ok(Self { headers, body })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl IntoResponse for SignedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = StatusCode::OK;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Credential, InMemoryCredentialStore};
    use crate::signature::{X_API_KEY, X_ENDPOINT, X_SIGNATURE, X_TIMESTAMP};
    use axum::{Router, http::Request as HttpRequest, routing::post};
    use tower::ServiceExt;

    const API_KEY: &str = "partner-key";
    const SECRET_B64: &str = "YWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWE=";

    fn store() -> Arc<InMemoryCredentialStore> {
        Arc::new(
            InMemoryCredentialStore::new()
                .with_credential(Credential::new(API_KEY, SECRET_B64).unwrap()),
        )
    }

    fn context() -> VerifiedContext {
        VerifiedContext {
            endpoint: "/e".to_string(),
            timestamp: "1".to_string(),
            api_key_id: API_KEY.to_string(),
        }
    }

    async fn echo(request: SignedRequest) -> String {
        format!("{}|{}", request.context.api_key_id, String::from_utf8_lossy(&request.body))
    }

    #[derive(serde::Deserialize)]
    struct Amount {
        amount: i64,
    }

    async fn amount(request: SignedRequest) -> Result<String> {
        let parsed: Amount = request.json()?;
        Ok(parsed.amount.to_string())
    }

    fn router() -> Router {
        Router::new()
            .route("/echo", post(echo))
            .route("/amount", post(amount))
            .with_state(Arc::new(SignatureVerifier::new(store())))
    }

    fn request(signature: &str, body: &'static str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri("/echo")
            .header(X_ENDPOINT, "/e")
            .header(X_TIMESTAMP, "1")
            .header(X_SIGNATURE, signature)
            .header(X_API_KEY, API_KEY)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_extractor_accepts_valid_signature() {
        let signature = ResponseSigner::new(store())
            .sign(API_KEY, "1", "/e", Some(b"payload"))
            .unwrap();

        let response = router().oneshot(request(&signature, "payload")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"partner-key|payload");
    }

    #[tokio::test]
    async fn test_extractor_rejects_bad_signature() {
        let signature = ResponseSigner::new(store())
            .sign(API_KEY, "1", "/e", Some(b"payload"))
            .unwrap();

        let response = router().oneshot(request(&signature, "tampered")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(X_SIGNATURE).is_none());
    }

    fn amount_request(body: &'static str) -> HttpRequest<Body> {
        let signature = ResponseSigner::new(store())
            .sign(API_KEY, "1", "/e", Some(body.as_bytes()))
            .unwrap();
        let mut request = request(&signature, body);
        *request.uri_mut() = "/amount".parse().unwrap();
        request
    }

    #[tokio::test]
    async fn test_verified_body_parsed_as_json() {
        let response = router()
            .oneshot(amount_request(r#"{"amount":1250}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"1250");
    }

    #[tokio::test]
    async fn test_signed_but_invalid_json_is_bad_request() {
        let response = router()
            .oneshot(amount_request(r#"{"amount":"lots"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_signed_json_body_is_signed_verbatim() {
        let signer = ResponseSigner::new(store());
        let response =
            SignedResponse::json(&signer, &context(), &serde_json::json!({"Status": "APPROVED"}))
                .unwrap();

        assert_eq!(&response.body()[..], br#"{"Status":"APPROVED"}"#);
        let expected = signer
            .sign(API_KEY, "1", "/e", Some(br#"{"Status":"APPROVED"}"#))
            .unwrap();
        assert_eq!(response.headers().get(X_SIGNATURE).unwrap(), expected.as_str());
    }

    #[tokio::test]
    async fn test_empty_response() {
        let signer = ResponseSigner::new(store());
        let response = SignedResponse::empty(&signer, &context()).unwrap().into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-timestamp").unwrap(), "1");
        assert_eq!(response.headers().get("x-endpoint").unwrap(), "/e");
        assert_eq!(response.headers().get("content-type").unwrap(), "application/json");

        let expected = signer.sign(API_KEY, "1", "/e", None).unwrap();
        assert_eq!(response.headers().get(X_SIGNATURE).unwrap(), expected.as_str());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_signing_failure_surfaces_as_internal_error() {
        let signer = ResponseSigner::new(Arc::new(InMemoryCredentialStore::new()));
        let err = SignedResponse::empty(&signer, &context()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
