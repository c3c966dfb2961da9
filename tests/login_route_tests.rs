use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use geolens::config::Config;
use geolens::router::{GeolensState, geolens_router};
use geolens::service::seed::{SEED_EMAIL, SEED_NAME, SEED_PASSWORD, seed_user};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    database_url: String,
    state: GeolensState,
    router: Router,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let database_url = format!("sqlite:{}", dir.path().join("users.sqlite").display());
    let storage = geolens::db::connect(&database_url)
        .await
        .expect("failed to open user store");
    seed_user(&storage, SEED_NAME, SEED_EMAIL, SEED_PASSWORD)
        .await
        .expect("failed to seed user");

    let cfg = Config {
        jwt_secret: "route-test-secret".to_string(),
        ..Config::default()
    };
    let state = GeolensState::new(storage, &cfg);
    let router = geolens_router(state.clone());
    TestApp {
        _dir: dir,
        database_url,
        state,
        router,
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("response body was not json")
    };
    (status, json)
}

fn post_login(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

#[tokio::test]
async fn seeded_user_can_log_in_and_token_decodes() {
    let app = test_app().await;
    let (status, body) = send(
        &app.router,
        post_login("/login", json!({"email": SEED_EMAIL, "password": SEED_PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], SEED_EMAIL);
    assert_eq!(body["user"]["name"], SEED_NAME);
    assert!(body["user"].get("password").is_none());

    let token = body["token"].as_str().expect("token missing");
    let claims = app.state.auth.verify(token).expect("token should verify");
    assert_eq!(claims.email, SEED_EMAIL);
    assert_eq!(claims.id, body["user"]["id"].as_i64().unwrap());
    assert_eq!(claims.exp - claims.iat, 8 * 3600);
}

#[tokio::test]
async fn api_prefix_serves_the_same_routes() {
    let app = test_app().await;
    let (status, body) = send(
        &app.router,
        post_login("/api/login", json!({"email": SEED_EMAIL, "password": SEED_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, body) = send(&app.router, get("/api/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = test_app().await;
    let (s1, b1) = send(
        &app.router,
        post_login("/login", json!({"email": SEED_EMAIL, "password": "wrong"})),
    )
    .await;
    let (s2, b2) = send(
        &app.router,
        post_login("/login", json!({"email": "nobody@example.com", "password": "wrong"})),
    )
    .await;

    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(b1, b2);
    assert_eq!(b1["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn missing_fields_are_bad_request() {
    let app = test_app().await;
    for body in [json!({"email": SEED_EMAIL}), json!({"password": "x"}), json!({})] {
        let (status, resp) = send(&app.router, post_login("/login", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"]["message"], "Email and password required");
    }

    let no_body = Request::builder()
        .method("POST")
        .uri("/login")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, no_body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ping_is_independent_of_auth() {
    let app = test_app().await;
    let (status, body) = send(&app.router, get("/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn me_requires_a_valid_bearer_token() {
    let app = test_app().await;
    let (_, login) = send(
        &app.router,
        post_login("/login", json!({"email": SEED_EMAIL, "password": SEED_PASSWORD})),
    )
    .await;
    let token = login["token"].as_str().unwrap();

    let authed = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, authed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], SEED_EMAIL);

    let (status, body) = send(&app.router, get("/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let forged = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn store_failure_is_an_opaque_internal_error() {
    let app = test_app().await;
    let pool = sqlx::SqlitePool::connect(&app.database_url)
        .await
        .expect("failed to open side connection");
    sqlx::query("DROP TABLE users")
        .execute(&pool)
        .await
        .expect("failed to drop users table");
    pool.close().await;

    let (status, body) = send(
        &app.router,
        post_login("/login", json!({"email": SEED_EMAIL, "password": SEED_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert!(!body["error"]["message"].as_str().unwrap().contains("users"));
}
