use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::from_fn,
    routing::get,
};
use clubhouse_api::middleware::{auth_middleware, security_headers};
use tower::ServiceExt;

fn app() -> Router {
    Router::new()
        .route("/private", get(|| async { "secret" }))
        .route_layer(from_fn(auth_middleware))
        .route("/public", get(|| async { "hello" }))
        .layer(from_fn(security_headers))
}

#[tokio::test]
async fn test_public_route_gets_security_headers() {
    let response = app()
        .oneshot(Request::get("/public").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let response = app()
        .oneshot(Request::get("/private").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_non_bearer_authorization_is_ignored() {
    let request = Request::get("/private")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
