//! Transaction webhooks served through the full App middleware stack

use cardhook::signature::{X_API_KEY, X_ENDPOINT, X_SIGNATURE};
use cardhook::testing::{DEFAULT_TIMESTAMP, get, post};
use cardhook::{App, ConfigBuilder, TransactionsModule};
use serde_json::json;

const API_KEY: &str = "partner-1";
const SECRET_B64: &str = "YWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWFhYWE=";
const OTHER_SECRET_B64: &str = "hByKl5U+zzpMibm7MiEnjEsnBHC4ntATnEhjzKRw2fw=";

fn app() -> axum::Router {
    let config = ConfigBuilder::new()
        .with_credential(API_KEY, SECRET_B64)
        .with_credential("partner-2", OTHER_SECRET_B64)
        .with_max_body_size(1024)
        .build()
        .unwrap();

    App::from_config(config)
        .unwrap()
        .register_module(TransactionsModule)
        .into_test_router()
}

#[tokio::test]
async fn test_authorization_approved_and_signed() {
    let response = post(app(), "/transactions/authorizations")
        .json_body(&json!({"transaction": {"id": "ctx-1", "amount": 1250}}))
        .signed(API_KEY, SECRET_B64)
        .execute()
        .await
        .assert_ok()
        .assert_json()
        .assert_header("x-timestamp", DEFAULT_TIMESTAMP)
        .assert_header("x-endpoint", "/transactions/authorizations")
        .assert_signed_by(SECRET_B64)
        .await;

    let body = response.body_string().await;
    assert_eq!(
        body,
        r#"{"Status":"APPROVED","StatusDetail":"APPROVED","Message":"OK"}"#
    );
}

#[tokio::test]
async fn test_each_partner_gets_its_own_secret() {
    post(app(), "/transactions/authorizations")
        .raw_body("{}")
        .signed("partner-2", OTHER_SECRET_B64)
        .execute()
        .await
        .assert_ok()
        .assert_signed_by(OTHER_SECRET_B64)
        .await;
}

#[tokio::test]
async fn test_adjustment_empty_signed_response() {
    let response = post(app(), "/transactions/adjustments")
        .json_body(&json!({"adjustment": {"amount": -50}}))
        .signed(API_KEY, SECRET_B64)
        .execute()
        .await
        .assert_ok()
        .assert_signed_by(SECRET_B64)
        .await;

    assert!(response.body_bytes().await.is_empty());
}

#[tokio::test]
async fn test_endpoint_header_is_echoed_verbatim() {
    post(app(), "/transactions/adjustments")
        .header(X_ENDPOINT, "adjustments-v2")
        .raw_body("{}")
        .signed(API_KEY, SECRET_B64)
        .execute()
        .await
        .assert_ok()
        .assert_header("x-endpoint", "adjustments-v2")
        .assert_signed_by(SECRET_B64)
        .await;
}

#[tokio::test]
async fn test_signed_with_wrong_secret_rejected() {
    post(app(), "/transactions/authorizations")
        .raw_body("{}")
        .signed(API_KEY, OTHER_SECRET_B64)
        .execute()
        .await
        .assert_unauthorized()
        .assert_json_path("error", json!("Unauthorized: Invalid request signature"))
        .await;
}

#[tokio::test]
async fn test_unknown_key_and_missing_header_look_identical() {
    let unknown = post(app(), "/transactions/authorizations")
        .raw_body("{}")
        .signed("nobody", SECRET_B64)
        .execute()
        .await
        .assert_unauthorized()
        .json::<serde_json::Value>()
        .await;

    let missing = post(app(), "/transactions/authorizations")
        .raw_body("{}")
        .signed(API_KEY, SECRET_B64)
        .without_header(X_SIGNATURE)
        .execute()
        .await
        .assert_unauthorized()
        .json::<serde_json::Value>()
        .await;

    assert_eq!(unknown["error"], missing["error"]);
}

#[tokio::test]
async fn test_missing_api_key_rejected() {
    post(app(), "/transactions/adjustments")
        .raw_body("{}")
        .signed(API_KEY, SECRET_B64)
        .without_header(X_API_KEY)
        .execute()
        .await
        .assert_unauthorized();
}

#[tokio::test]
async fn test_oversized_body_rejected_before_verification() {
    let response = post(app(), "/transactions/authorizations")
        .raw_body(vec![b'x'; 4096])
        .signed(API_KEY, SECRET_B64)
        .execute()
        .await
        .response();

    assert_eq!(response.status(), axum::http::StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.headers().get(X_SIGNATURE).is_none());
}

#[tokio::test]
async fn test_health_reports_loaded_credentials() {
    get(app(), "/health")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("status", json!("healthy"))
        .await
        .assert_json_path("checks.1.message", json!("2 credential(s) loaded"))
        .await;
}

#[tokio::test]
async fn test_health_degraded_without_credentials() {
    let app = App::new().register_module(TransactionsModule).into_test_router();

    get(app, "/health")
        .execute()
        .await
        .assert_ok()
        .assert_json_path("status", json!("degraded"))
        .await;
}
