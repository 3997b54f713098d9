//! HTTP surface tests over the assembled router.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use clinica_auth::http::AppState;
use clinica_auth::middleware::AuthState;
use clinica_auth::password::hash_password;
use clinica_auth::rbac::RoleService;
use clinica_auth::service::AuthService;
use clinica_auth::storage::{Menu, Permission, User, UserStorage};
use clinica_auth::token::{JwtService, TokenConfig, TokenService};
use clinica_auth_memory::{
    InMemoryMenuStorage, InMemoryPermissionStorage, InMemoryRefreshTokenStorage,
    InMemoryRoleStorage, InMemoryUserStorage,
};

const SECRET: &str = "integration-secret-integration-secret-01";

struct TestApp {
    router: Router,
    permission_ids: Vec<Uuid>,
    menu_ids: Vec<Uuid>,
}

async fn test_app() -> TestApp {
    let users = Arc::new(InMemoryUserStorage::new());
    let refresh_tokens = Arc::new(InMemoryRefreshTokenStorage::new());
    let roles = Arc::new(InMemoryRoleStorage::new());
    let permissions = Arc::new(InMemoryPermissionStorage::new());
    let menus = Arc::new(InMemoryMenuStorage::new());

    let user = User::new(
        "drperez",
        "drperez@clinica.example.com",
        "0012345678",
        hash_password("Secret123").unwrap(),
    );
    users.create(&user).await.unwrap();

    let permission_ids = vec![
        permissions.add(Permission::new("patients.read")),
        permissions.add(Permission::new("patients.write")),
    ];
    let menu_ids = vec![
        menus.add(Menu::new("Patients")),
        menus.add(Menu::new("Appointments")),
    ];

    let jwt = Arc::new(JwtService::new(
        SECRET,
        "https://clinica.example.com",
        "https://clinica.example.com/api",
    ));
    let token_service = Arc::new(TokenService::new(jwt.clone(), TokenConfig::default()));
    let auth_service = Arc::new(AuthService::new(
        token_service,
        users.clone(),
        refresh_tokens,
    ));
    let role_service = Arc::new(RoleService::new(roles, permissions, menus));
    let auth_state = AuthState::new(jwt, users);

    TestApp {
        router: clinica_auth::http::router(AppState {
            auth_service,
            role_service,
            auth_state,
        }),
        permission_ids,
        menu_ids,
    }
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(router: &Router) -> (String, String) {
    let (status, body) = send(
        router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"userName": "drperez", "password": "Secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["accessToken"].as_str().unwrap().to_string(),
        body["refreshToken"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn login_returns_token_pair() {
    let app = test_app().await;
    let (token, refresh_token) = login(&app.router).await;

    assert_eq!(token.split('.').count(), 3);
    assert_eq!(refresh_token.len(), 43);
}

#[tokio::test]
async fn login_failure_is_generic_401() {
    let app = test_app().await;

    for (user_name, password) in [("drperez", "wrong"), ("ghost", "Secret123")] {
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"userName": user_name, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid username or password");
    }
}

#[tokio::test]
async fn refresh_token_endpoint_returns_fresh_pair() {
    let app = test_app().await;
    let (_, refresh_token) = login(&app.router).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/auth/refresh-token",
        None,
        Some(json!({"refreshToken": refresh_token})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refreshToken"], refresh_token.as_str());
    assert!(body["accessToken"].as_str().unwrap().split('.').count() == 3);
}

#[tokio::test]
async fn refresh_with_unknown_token_is_401() {
    let app = test_app().await;
    login(&app.router).await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/auth/refresh-token",
        None,
        Some(json!({"refreshToken": "bm90LWEtcmVhbC10b2tlbi12YWx1ZS1hdC1hbGw"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_requires_bearer() {
    let app = test_app().await;
    let body = json!({
        "userName": "drperez",
        "currentPassword": "Secret123",
        "newPassword": "Better456",
    });

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/auth/change-password",
        None,
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (token, _) = login(&app.router).await;
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/auth/change-password",
        Some(&token),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    // The old password stops working at the next login.
    let (status, _) = send(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"userName": "drperez", "password": "Secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_too_short_is_400() {
    let app = test_app().await;
    let (token, _) = login(&app.router).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/auth/change-password",
        Some(&token),
        Some(json!({"userName": "drperez", "currentPassword": "Secret123", "newPassword": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn change_password_wrong_current_is_400() {
    let app = test_app().await;
    let (token, _) = login(&app.router).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/auth/change-password",
        Some(&token),
        Some(json!({"userName": "drperez", "currentPassword": "WrongPass", "newPassword": "Better456"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn change_password_for_other_user_is_400() {
    let app = test_app().await;
    let (token, _) = login(&app.router).await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/auth/change-password",
        Some(&token),
        Some(json!({"userName": "ghost", "currentPassword": "Secret123", "newPassword": "Better456"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn role_create_and_full_replace_update() {
    let app = test_app().await;
    let (token, _) = login(&app.router).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/roles",
        Some(&token),
        Some(json!({
            "name": "Doctor",
            "description": "Treats patients",
            "permissionIds": app.permission_ids,
            "menuIds": app.menu_ids,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let role_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["permissionIds"].as_array().unwrap().len(), 2);

    // Empty permission list plus one menu strips all permissions.
    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/api/roles/{role_id}"),
        Some(&token),
        Some(json!({
            "name": "Doctor",
            "permissionIds": [],
            "menuIds": [app.menu_ids[1]],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permissionIds"].as_array().unwrap().len(), 0);
    assert_eq!(body["menuIds"].as_array().unwrap().len(), 1);

    // The read endpoint agrees.
    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/api/roles/{role_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permissionIds"].as_array().unwrap().len(), 0);
    assert_eq!(
        body["menuIds"][0].as_str().unwrap(),
        app.menu_ids[1].to_string()
    );
}

#[tokio::test]
async fn role_update_unknown_id_is_404() {
    let app = test_app().await;
    let (token, _) = login(&app.router).await;

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/api/roles/{}", Uuid::new_v4()),
        Some(&token),
        Some(json!({"name": "Doctor", "permissionIds": [], "menuIds": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn role_create_with_unknown_permission_is_400() {
    let app = test_app().await;
    let (token, _) = login(&app.router).await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/roles",
        Some(&token),
        Some(json!({
            "name": "Doctor",
            "permissionIds": [Uuid::new_v4()],
            "menuIds": [],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn role_routes_reject_garbage_token() {
    let app = test_app().await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/roles",
        Some("not.a.token"),
        Some(json!({"name": "Doctor"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
