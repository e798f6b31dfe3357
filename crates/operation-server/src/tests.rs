//! Router-level tests: response mapping, challenges, lifecycle round trip.

use crate::{config::Config, create_router, forms::FormsClient, state::AppState};
use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderMap, Request, StatusCode,
    },
    Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use http_body_util::BodyExt;
use operation_core::{IdentityExtractor, KvOperationStore, OperationService};
use operation_storage::RocksDbStorage;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn encode_segment(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
}

fn token_with(header: Value, claims: Value) -> String {
    format!(
        "{}.{}.{}",
        encode_segment(&header),
        encode_segment(&claims),
        URL_SAFE_NO_PAD.encode(b"sig")
    )
}

fn bearer_of_kind(kind: &str, platform_id: Uuid) -> String {
    let token = token_with(
        json!({ "alg": "HS256", "typ": "JWT", "tid": kind }),
        json!({ "idPlatform": platform_id.to_string() }),
    );
    format!("Bearer {token}")
}

fn access_bearer(platform_id: Uuid) -> String {
    bearer_of_kind("ACCESS", platform_id)
}

fn test_router_with_forms(forms: Option<FormsClient>) -> Router {
    let storage = Arc::new(RocksDbStorage::open_test().unwrap());
    let state = Arc::new(AppState {
        config: Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            database_path: "unused".into(),
            forms_url: None,
        },
        storage: Arc::clone(&storage),
        operations: OperationService::new(IdentityExtractor::new(), KvOperationStore::new(storage)),
        forms,
    });
    create_router(state)
}

fn test_router() -> Router {
    test_router_with_forms(None)
}

fn start_request(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/operations");
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn check_request(auth: &str, operation_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("GET")
        .uri("/operations/check")
        .header(AUTHORIZATION, auth);
    if let Some(id) = operation_id {
        builder = builder.header("X-OPERATION-ID", id);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn error_code(body: &Value) -> &str {
    assert_eq!(body["success"], json!(false));
    body["errors"][0]["code"].as_str().unwrap()
}

#[tokio::test]
async fn health_endpoints() {
    let router = test_router();

    let (status, _, body) = send(
        router.clone(),
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, _, body) = send(
        router,
        Request::builder()
            .uri("/ready")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ready"));
    assert_eq!(body["database"], json!("connected"));
}

#[tokio::test]
async fn start_operation_issues_an_id() {
    let router = test_router();

    let (status, _, body) = send(router, start_request(Some(&access_bearer(Uuid::new_v4())))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let operation_id = body["data"]["operationId"].as_str().unwrap();
    assert!(Uuid::parse_str(operation_id).is_ok());
    // No form requested, no form field
    assert!(body["data"].get("form").is_none());
}

#[tokio::test]
async fn issued_id_verifies_for_the_same_platform() {
    let router = test_router();
    let platform_id = Uuid::new_v4();

    let (_, _, body) = send(
        router.clone(),
        start_request(Some(&access_bearer(platform_id))),
    )
    .await;
    let operation_id = body["data"]["operationId"].as_str().unwrap().to_string();

    let (status, _, body) = send(
        router,
        check_request(&access_bearer(platform_id), Some(&operation_id)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn issued_id_is_not_found_for_another_platform() {
    let router = test_router();

    let (_, _, body) = send(
        router.clone(),
        start_request(Some(&access_bearer(Uuid::new_v4()))),
    )
    .await;
    let operation_id = body["data"]["operationId"].as_str().unwrap().to_string();

    let (status, _, body) = send(
        router,
        check_request(&access_bearer(Uuid::new_v4()), Some(&operation_id)),
    )
    .await;

    // Ownership mismatch looks exactly like a missing operation
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "OPERATION_NOT_FOUND");
}

fn forms_client() -> FormsClient {
    // Never reached by the query-validation paths under test
    FormsClient::new(url::Url::parse("http://127.0.0.1:9").unwrap())
}

#[tokio::test]
async fn invalid_form_query_is_rejected_before_issuing() {
    let router = test_router_with_forms(Some(forms_client()));

    let request = Request::builder()
        .method("POST")
        .uri("/operations?form=")
        .header(AUTHORIZATION, access_bearer(Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "REQUEST_FORM_INVALID");
}

#[tokio::test]
async fn auth_is_checked_before_the_form_query() {
    let router = test_router_with_forms(Some(forms_client()));

    let request = Request::builder()
        .method("POST")
        .uri("/operations?form=")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_HEADER_MISSING");
}

#[tokio::test]
async fn missing_auth_header_is_challenged() {
    let (status, headers, body) = send(test_router(), start_request(None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_HEADER_MISSING");
    assert_eq!(
        headers.get(WWW_AUTHENTICATE).unwrap(),
        r#"Bearer realm="yoda""#
    );
}

#[tokio::test]
async fn basic_scheme_is_rejected() {
    let (status, headers, body) = send(test_router(), start_request(Some("Basic xyz"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_HEADER_INVALID_TYPE");
    assert_eq!(
        headers.get(WWW_AUTHENTICATE).unwrap(),
        r#"Bearer realm="yoda""#
    );
}

#[tokio::test]
async fn empty_bearer_token_is_rejected() {
    let (status, _, body) = send(test_router(), start_request(Some("Bearer "))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_TOKEN_EMPTY");
}

#[tokio::test]
async fn malformed_token_carries_invalid_token_challenge() {
    let (status, headers, body) =
        send(test_router(), start_request(Some("Bearer not-a-jwt"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_TOKEN_INVALID");
    let challenge = headers.get(WWW_AUTHENTICATE).unwrap().to_str().unwrap();
    assert!(challenge.starts_with(r#"Bearer realm="yoda""#));
    assert!(challenge.contains(r#"error_code="invalid_token""#));
}

#[tokio::test]
async fn refresh_token_is_rejected() {
    let (status, _, body) = send(
        test_router(),
        start_request(Some(&bearer_of_kind("REFRESH", Uuid::new_v4()))),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTH_TOKEN_INVALID_TYPE");
}

#[tokio::test]
async fn token_without_platform_claim_is_rejected() {
    let token = token_with(
        json!({ "alg": "HS256", "typ": "JWT", "tid": "ACCESS" }),
        json!({ "sub": "someone" }),
    );
    let (status, _, body) = send(
        test_router(),
        start_request(Some(&format!("Bearer {token}"))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "PLATFORM_ID_MISSING");
}

#[tokio::test]
async fn check_without_operation_header() {
    let (status, _, body) = send(
        test_router(),
        check_request(&access_bearer(Uuid::new_v4()), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "OPERATION_ID_MISSING");
}

#[tokio::test]
async fn check_with_invalid_operation_id() {
    let (status, _, body) = send(
        test_router(),
        check_request(&access_bearer(Uuid::new_v4()), Some("not-a-valid-id")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "OPERATION_ID_INVALID");
}

#[tokio::test]
async fn check_with_unknown_operation_id() {
    let (status, _, body) = send(
        test_router(),
        check_request(
            &access_bearer(Uuid::new_v4()),
            Some(&Uuid::new_v4().to_string()),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "OPERATION_NOT_FOUND");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let router = test_router();

    let request = Request::builder()
        .uri("/health")
        .header("X-Request-ID", "req-123")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(router.clone(), request).await;
    assert_eq!(headers.get("X-Request-ID").unwrap(), "req-123");

    // A missing inbound id gets generated
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(router, request).await;
    let generated = headers.get("X-Request-ID").unwrap().to_str().unwrap();
    assert!(Uuid::parse_str(generated).is_ok());
}
