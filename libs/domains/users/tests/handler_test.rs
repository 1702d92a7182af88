//! HTTP surface of the users and auth routers

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use chrono::{Duration, Utc};
use domain_users::{
    InMemoryUserRepository, ManualClock, UserRepository, UserService, auth_handlers, handlers,
};
use email::MockSmtpProvider;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    repo: InMemoryUserRepository,
    outbox: MockSmtpProvider,
    clock: ManualClock,
}

fn app() -> TestApp {
    let repo = InMemoryUserRepository::new();
    let outbox = MockSmtpProvider::new();
    let clock = ManualClock::new(Utc::now());
    let service = UserService::new(repo.clone(), Arc::new(outbox.clone()))
        .with_clock(Arc::new(clock.clone()));

    let router = Router::new()
        .nest("/api/users", handlers::router(service.clone()))
        .nest("/api/auth", auth_handlers::router(service));

    TestApp {
        router,
        repo,
        outbox,
        clock,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response: Response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register(app: &TestApp, email: &str) -> (String, String) {
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/auth/register",
        Some(json!({ "email": email, "name": "A", "password": "p" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["_id"].as_str().unwrap().to_string();
    let code = app
        .repo
        .find_by_email(email)
        .await
        .unwrap()
        .unwrap()
        .code_id
        .unwrap();
    (id, code)
}

#[tokio::test]
async fn test_create_then_fetch_user() {
    let app = app();
    let (status, created) = send(
        &app.router,
        "POST",
        "/api/users",
        Some(json!({ "name": "Ann", "email": "ann@x.com", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["_id"].as_str().unwrap();

    let (status, user) = send(&app.router, "GET", &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "ann@x.com");
    assert_eq!(user["isActive"], true);
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn test_create_duplicate_email_conflicts() {
    let app = app();
    let body = json!({ "name": "Ann", "email": "ann@x.com", "password": "secret" });
    send(&app.router, "POST", "/api/users", Some(body.clone())).await;

    let (status, error) = send(&app.router, "POST", "/api/users", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "CONFLICT");
    assert_eq!(
        error["message"],
        "Email already exists: ann@x.com. Please use a different email"
    );
}

#[tokio::test]
async fn test_create_with_invalid_email_is_validation_error() {
    let app = app();
    let (status, error) = send(
        &app.router,
        "POST",
        "/api/users",
        Some(json!({ "name": "Ann", "email": "nope", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_users_pagination_shape() {
    let app = app();
    for i in 0..3 {
        register(&app, &format!("user{i}@x.com")).await;
    }

    let (status, page) = send(
        &app.router,
        "GET",
        "/api/users?current=2&pageSize=2&sort=-email",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["meta"]["total"], 3);
    assert_eq!(page["meta"]["current"], 2);
    assert_eq!(page["meta"]["pageSize"], 2);

    let result = page["result"].as_array().unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0]["email"], "user0@x.com");
    assert!(result[0].get("password").is_none());
}

#[tokio::test]
async fn test_list_users_without_query_uses_defaults() {
    let app = app();
    let (status, page) = send(&app.router, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalPages"], 0);
    assert_eq!(page["meta"]["pageSize"], 10);
    assert_eq!(page["result"], json!([]));
}

#[tokio::test]
async fn test_get_user_with_malformed_id() {
    let app = app();
    let (status, error) = send(&app.router, "GET", "/api/users/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "INVALID_OBJECT_ID");
}

#[tokio::test]
async fn test_get_missing_user() {
    let app = app();
    let (status, error) = send(
        &app.router,
        "GET",
        "/api/users/65a1b2c3d4e5f60718293a4b",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_patch_and_delete_return_acks() {
    let app = app();
    let (id, _) = register(&app, "ann@x.com").await;

    let (status, ack) = send(
        &app.router,
        "PATCH",
        "/api/users",
        Some(json!({ "_id": id, "name": "Annie" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "matchedCount": 1, "modifiedCount": 1 }));

    let (status, ack) = send(&app.router, "DELETE", &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "deletedCount": 1 }));

    let (status, ack) = send(&app.router, "DELETE", &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "deletedCount": 0 }));
}

#[tokio::test]
async fn test_delete_with_malformed_id() {
    let app = app();
    let (status, error) = send(&app.router, "DELETE", "/api/users/123", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "Invalid MongoDB identifier: 123");
}

#[tokio::test]
async fn test_register_sends_activation_mail() {
    let app = app();
    let (_, code) = register(&app, "a@x.com").await;

    assert!(app.outbox.was_sent_to("a@x.com").await);
    let mail = app.outbox.last_sent().await.unwrap();
    assert_eq!(mail.template.as_deref(), Some(email::ACCOUNT_ACTIVATION));
    assert_eq!(mail.template_data["activationCode"], code);
    assert_eq!(mail.template_data["expiresInMinutes"], 5);
}

#[tokio::test]
async fn test_register_twice_conflicts() {
    let app = app();
    register(&app, "a@x.com").await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/auth/register",
        Some(json!({ "email": "a@x.com", "name": "A", "password": "p" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.outbox.sent_count().await, 1);
}

#[tokio::test]
async fn test_activation_flow() {
    let app = app();
    let (id, code) = register(&app, "a@x.com").await;

    let (_, outcome) = send(
        &app.router,
        "POST",
        "/api/auth/login",
        Some(json!({ "username": "a@x.com", "password": "p" })),
    )
    .await;
    assert_eq!(outcome, json!({ "error": "InactiveAccountError" }));

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/auth/activate",
        Some(json!({ "_id": id, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "activated": true }));

    let (status, outcome) = send(
        &app.router,
        "POST",
        "/api/auth/login",
        Some(json!({ "username": "a@x.com", "password": "p" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["user"]["email"], "a@x.com");
    assert!(outcome["user"].get("password").is_none());
}

#[tokio::test]
async fn test_activation_after_expiry_is_gone() {
    let app = app();
    let (id, code) = register(&app, "a@x.com").await;

    app.clock.advance(Duration::minutes(6));
    let (status, error) = send(
        &app.router,
        "POST",
        "/api/auth/activate",
        Some(json!({ "_id": id, "code": code })),
    )
    .await;

    assert_eq!(status, StatusCode::GONE);
    assert_eq!(error["error"], "GONE");
    assert!(
        !app.repo
            .find_by_email("a@x.com")
            .await
            .unwrap()
            .unwrap()
            .is_active
    );
}

#[tokio::test]
async fn test_activation_with_unknown_code() {
    let app = app();
    let (id, _) = register(&app, "a@x.com").await;

    let (status, error) = send(
        &app.router,
        "POST",
        "/api/auth/activate",
        Some(json!({ "_id": id, "code": "not-the-code" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = app();
    send(
        &app.router,
        "POST",
        "/api/users",
        Some(json!({ "name": "Ann", "email": "ann@x.com", "password": "secret" })),
    )
    .await;

    let (status, outcome) = send(
        &app.router,
        "POST",
        "/api/auth/login",
        Some(json!({ "username": "ann@x.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome, json!({ "error": "InvalidEmailPasswordError" }));
}
