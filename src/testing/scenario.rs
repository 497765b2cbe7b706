use crate::credentials::SharedSecret;
use crate::signature::{
    CanonicalMessage, SignatureAlgorithm, SignatureHeader, X_API_KEY, X_ENDPOINT, X_SIGNATURE,
    X_TIMESTAMP, constant_time_eq, format_signature,
};
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, header},
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

/// `x-timestamp` used by [`Scenario::signed`] when none is set
pub const DEFAULT_TIMESTAMP: &str = "1700000000";

/// Test scenario builder for driving a router without a server
pub struct Scenario {
    app: Router,
    request: Request<Body>,
    body: Bytes,
    signing: Option<(String, SharedSecret)>,
    omitted: Vec<HeaderName>,
}

impl Scenario {
    /// Create a new test scenario with the given app
    pub fn new(app: Router) -> Self {
        Self {
            app,
            request: Request::builder()
                .method(Method::GET)
                .uri("/")
                .body(Body::empty())
                .unwrap(),
            body: Bytes::new(),
            signing: None,
            omitted: Vec::new(),
        }
    }

    /// Set the HTTP method
    pub fn method(mut self, method: Method) -> Self {
        *self.request.method_mut() = method;
        self
    }

    /// Set the URI/path
    pub fn uri(mut self, uri: &str) -> Self {
        *self.request.uri_mut() = uri.parse().unwrap();
        self
    }

    /// Add a header
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.request.headers_mut().insert(
            HeaderName::from_bytes(key.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        self
    }

    /// Drop a header right before sending, after any signing
    pub fn without_header(mut self, key: &str) -> Self {
        self.omitted.push(HeaderName::from_bytes(key.as_bytes()).unwrap());
        self
    }

    /// Set JSON body from a serializable type
    pub fn json_body<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Bytes::from(serde_json::to_vec(body).unwrap());
        self.request
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Set raw body bytes, signed exactly as given
    pub fn raw_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sign the request as partner `api_key_id`.
    ///
    /// At execution the signature is computed over the final body with the
    /// request's `x-timestamp` and `x-endpoint`. Those default to
    /// [`DEFAULT_TIMESTAMP`] and the request path when not set. Headers set
    /// after this call still take part in the signature.
    pub fn signed(mut self, api_key_id: &str, secret_b64: &str) -> Self {
        let secret = SharedSecret::from_base64(secret_b64).unwrap();
        self.signing = Some((api_key_id.to_string(), secret));
        self
    }

    /// Execute the request and get an assertion builder
    pub async fn execute(mut self) -> ScenarioAssert {
        if let Some((api_key_id, secret)) = self.signing.take() {
            self = self.apply_signature(&api_key_id, &secret);
        }
        for name in &self.omitted {
            self.request.headers_mut().remove(name);
        }

        let (parts, _) = self.request.into_parts();
        let request = Request::from_parts(parts, Body::from(self.body));
        let response = self.app.oneshot(request).await.unwrap();
        ScenarioAssert { response }
    }

    fn apply_signature(mut self, api_key_id: &str, secret: &SharedSecret) -> Self {
        let path = self.request.uri().path().to_string();
        let headers = self.request.headers_mut();

        if !headers.contains_key(X_TIMESTAMP) {
            headers.insert(X_TIMESTAMP, HeaderValue::from_static(DEFAULT_TIMESTAMP));
        }
        if !headers.contains_key(X_ENDPOINT) {
            headers.insert(X_ENDPOINT, HeaderValue::from_str(&path).unwrap());
        }

        let timestamp = headers[X_TIMESTAMP].to_str().unwrap().to_string();
        let endpoint = headers[X_ENDPOINT].to_str().unwrap().to_string();
        let tag = CanonicalMessage::new(&timestamp, &endpoint, Some(&self.body[..])).tag(secret);

        headers.insert(
            X_SIGNATURE,
            HeaderValue::from_str(&format_signature(SignatureAlgorithm::HmacSha256, &tag))
                .unwrap(),
        );
        headers.insert(X_API_KEY, HeaderValue::from_str(api_key_id).unwrap());
        self
    }
}

/// Assertion builder for test responses
pub struct ScenarioAssert {
    response: axum::response::Response,
}

impl ScenarioAssert {
    /// Assert the response status code
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status(),
            expected,
            "Expected status {}, got {}",
            expected,
            self.response.status()
        );
        self
    }

    /// Assert status is 200 OK
    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    /// Assert status is 400 Bad Request
    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    /// Assert a 401 with no signature headers on the response
    pub fn assert_unauthorized(self) -> Self {
        let this = self.assert_status(StatusCode::UNAUTHORIZED);
        assert!(
            this.response.headers().get(X_SIGNATURE).is_none(),
            "Rejected response must not be signed"
        );
        this
    }

    /// Assert status is 404 Not Found
    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    /// Assert a header exists with the given value
    pub fn assert_header(self, key: &str, expected: &str) -> Self {
        let value = self
            .response
            .headers()
            .get(key)
            .unwrap_or_else(|| panic!("Header '{}' not found", key))
            .to_str()
            .unwrap();
        assert_eq!(value, expected, "Header '{}' value mismatch", key);
        self
    }

    /// Assert the response content type is JSON
    pub fn assert_json(self) -> Self {
        let content_type = self
            .response
            .headers()
            .get(header::CONTENT_TYPE)
            .expect("Content-Type header not found")
            .to_str()
            .unwrap();
        assert!(
            content_type.contains("application/json"),
            "Expected JSON content type, got: {}",
            content_type
        );
        self
    }

    /// Assert `X-Signature` is a valid tag over
    /// `X-Timestamp || X-Endpoint || body` under `secret_b64`
    pub async fn assert_signed_by(self, secret_b64: &str) -> Self {
        let secret = SharedSecret::from_base64(secret_b64).unwrap();
        let (parts, body) = self.response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .unwrap_or_else(|| panic!("Header '{}' not found", name))
                .to_str()
                .unwrap()
                .to_string()
        };

        let signature = header(X_SIGNATURE);
        let received = SignatureHeader::parse(&signature)
            .and_then(|h| h.decode())
            .unwrap_or_else(|e| panic!("Unparseable response signature '{}': {}", signature, e));

        let body = (!bytes.is_empty()).then_some(&bytes[..]);
        let expected = CanonicalMessage::new(&header(X_TIMESTAMP), &header(X_ENDPOINT), body)
            .tag(&secret);

        assert!(
            constant_time_eq(&expected, &received),
            "Response signature does not match its body"
        );

        Self {
            response: axum::response::Response::from_parts(parts, Body::from(bytes)),
        }
    }

    /// Get the response body as bytes
    pub async fn body_bytes(self) -> Vec<u8> {
        axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    /// Get the response body as a string
    pub async fn body_string(self) -> String {
        String::from_utf8(self.body_bytes().await).unwrap()
    }

    /// Parse the JSON response body into a type
    pub async fn json<T: for<'de> Deserialize<'de>>(self) -> T {
        let bytes = self.body_bytes().await;
        serde_json::from_slice(&bytes).expect("Failed to parse JSON response")
    }

    /// Assert JSON field equals a value using dot notation ("checks.0.status")
    pub async fn assert_json_path(self, path: &str, expected: serde_json::Value) -> Self {
        let (parts, body) = self.response.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let actual = json_path_get(&json, path)
            .unwrap_or_else(|| panic!("Path '{}' not found in JSON", path));
        assert_eq!(actual, &expected, "JSON path '{}' value mismatch", path);

        Self {
            response: axum::response::Response::from_parts(parts, Body::from(bytes)),
        }
    }

    /// Get the underlying response for custom assertions
    pub fn response(self) -> axum::response::Response {
        self.response
    }
}

fn json_path_get<'a>(json: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = json;

    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(index) => current.get(index)?,
            Err(_) => current.get(part)?,
        };
    }

    Some(current)
}

/// Convenience function to create a GET request scenario
pub fn get(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::GET).uri(uri)
}

/// Convenience function to create a POST request scenario
pub fn post(app: Router, uri: &str) -> Scenario {
    Scenario::new(app).method(Method::POST).uri(uri)
}
