//! Session boundary tests over the full router: unauthenticated requests
//! are turned away, and a registered administrator's cookie admits them.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use tower::ServiceExt;

use dispatch_admin::authn::MemoryIdentity;
use dispatch_admin::config::{AdminConfig, FirebaseConfig, StoreBackend};
use dispatch_admin::state::AppState;
use dispatch_admin::store::MemoryStore;

fn test_config() -> AdminConfig {
    AdminConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3001,
        base_url: "http://127.0.0.1:3001".to_string(),
        firebase: FirebaseConfig {
            project_id: "dispatch-test".to_string(),
            api_key: SecretString::from("unused"),
        },
        store_backend: StoreBackend::Memory,
        store_timeout: Duration::from_secs(10),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

fn test_app() -> Router {
    let state = AppState::new(
        test_config(),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryIdentity::new()),
    );
    dispatch_admin::app(state)
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn form_post(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoints_are_open() {
    let app = test_app();
    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unauthenticated_pages_redirect_to_login() {
    let app = test_app();

    for path in ["/", "/orders", "/personnel"] {
        let response = app.clone().oneshot(get(path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login",
            "{path}"
        );
    }
}

#[tokio::test]
async fn unauthenticated_mutations_are_rejected() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(form_post("/personnel", "name=Asha&phone_number=9990001111&gender=Female"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn login_with_bad_credentials_redirects_with_error() {
    let app = test_app();

    let response = app
        .oneshot(form_post("/login", "email=a%40b.c&password=wrong-pass"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login?error=credentials"
    );
}

#[tokio::test]
async fn registration_cookie_admits_the_dashboard() {
    let app = test_app();

    let body = "name=Priya&email=priya%40example.com&password=hunter22\
                &password_confirm=hunter22&phone=9990001111&gender=Female\
                &age=29&address=12+MG+Road";
    let response = app
        .clone()
        .oneshot(form_post("/register", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("registration should establish a session")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
