//! Access-gate behavior over the real router. Every request here is rejected
//! (or served) before any database work, so no Postgres is needed.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use rentora_api::auth::{issue_token, Role};

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_banner_is_public() {
    let app = rentora_api::app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Rentora API");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = rentora_api::app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/applications")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"propertyId":1,"name":"a","email":"a@b.c","phoneNumber":"1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    let app = rentora_api::app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/leases")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_token_is_bad_request() {
    let app = rentora_api::app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/leases")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_role_is_forbidden() {
    // Deciding applications is a manager operation; a tenant token gets 403
    // before the application is even looked up.
    let token = issue_token("us-east-1:tenant-1", Role::Tenant).unwrap();

    let app = rentora_api::app();
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/applications/1/status")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"approved"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Access denied");
}

#[tokio::test]
async fn property_creation_is_manager_only() {
    // A tenant token on the listing creation route is refused up front,
    // before the multipart body is touched.
    let token = issue_token("us-east-1:tenant-2", Role::Tenant).unwrap();

    let app = rentora_api::app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/properties")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
                .body(Body::from("--x--\r\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
