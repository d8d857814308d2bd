use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use almox::config::Config;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Bootstrap credentials seeded by the initial migration
const ADMIN_LOGIN: &str = "admin";
const ADMIN_PASSWORD: &str = "admin";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = almox::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    almox::api::router(state).await
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn login(app: &Router, login: &str, password: &str) -> axum::response::Response {
    let payload = serde_json::json!({ "login": login, "password": password });

    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn admin_token(app: &Router) -> String {
    let response = login(app, ADMIN_LOGIN, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, token: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/equipamentos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "TOKEN_MISSING");

    let response = app
        .clone()
        .oneshot(get("/api/equipamentos", "not-a-real-token"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Token inválido");
}

#[tokio::test]
async fn login_sets_httponly_cookie_and_returns_identity() {
    let app = spawn_app().await;

    let response = login(&app, ADMIN_LOGIN, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("login must set the token cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));

    let json = body_json(response).await;
    assert_eq!(json["user"]["login"], "admin");
    assert!(json["token"].as_str().is_some());
}

#[tokio::test]
async fn login_does_not_disclose_which_credential_failed() {
    let app = spawn_app().await;

    let response = login(&app, ADMIN_LOGIN, "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(response).await;

    let response = login(&app, "no-such-user", "anything").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_user = body_json(response).await;

    // Identical message for both failure modes
    assert_eq!(wrong_password["error"], "Credenciais inválidas");
    assert_eq!(wrong_password["error"], unknown_user["error"]);
}

#[tokio::test]
async fn deactivated_account_gets_a_distinct_login_error() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let payload = serde_json::json!({
        "name": "Maria Souza",
        "login": "maria",
        "password": "segredo1",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/usuarios", &token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let user_id = created["id"].as_i64().unwrap();

    // Correct password while active
    let response = login(&app, "maria", "segredo1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/usuarios/{user_id}"))
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Correct password after deactivation: "deactivated", not "invalid"
    let response = login(&app, "maria", "segredo1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Usuário desativado");
    assert_eq!(json["code"], "USER_DEACTIVATED");
}

#[tokio::test]
async fn missing_credentials_get_a_generic_required_error() {
    let app = spawn_app().await;

    let response = login(&app, "", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CREDENTIALS_REQUIRED");
}

#[tokio::test]
async fn logout_blacklists_the_token_before_its_expiry() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    // Token works
    let response = app.clone().oneshot(get("/api/auth/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Still cryptographically valid, but revoked: rejected as invalid, not expired
    let response = app.clone().oneshot(get("/api/auth/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Token inválido");

    // Logging out again with the same token stays a no-op
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let payload = serde_json::json!({
        "name": "João Comum",
        "login": "joao",
        "password": "segredo1",
        "role": "USUARIO",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/usuarios", &token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = login(&app, "joao", "segredo1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let user_token = body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    // Plain users can read
    let response = app
        .clone()
        .oneshot(get("/api/usuarios", &user_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // But not manage accounts
    let payload = serde_json::json!({
        "name": "Intruso",
        "login": "intruso",
        "password": "segredo1",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/usuarios", &user_token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn duplicate_login_is_rejected() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let payload = serde_json::json!({
        "name": "Primeiro",
        "login": "repetido",
        "password": "segredo1",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/usuarios", &token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = serde_json::json!({
        "name": "Segundo",
        "login": "repetido",
        "password": "segredo2",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/usuarios", &token, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "LOGIN_TAKEN");
    assert_eq!(json["error"], "Login já cadastrado");
}

#[tokio::test]
async fn user_creation_validates_request_shape() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let payload = serde_json::json!({
        "name": "Ab",
        "password": "123",
        "role": "GERENTE",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/usuarios", &token, &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Erro de validação");
    assert_eq!(json["code"], "VALIDATION");

    let details = json["details"].as_array().unwrap();
    let fields: Vec<&str> = details
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"login"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"role"));
}

#[tokio::test]
async fn user_listing_paginates_with_page_flags() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    // Seeded admin plus 14 more = 15 users
    for i in 1..=14 {
        let payload = serde_json::json!({
            "name": format!("Usuário {i:02}"),
            "login": format!("usuario{i:02}"),
            "password": "segredo1",
        });
        let response = app
            .clone()
            .oneshot(send_json("POST", "/api/usuarios", &token, &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get("/api/usuarios?page=1&limit=10", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"].as_array().unwrap().len(), 10);
    assert_eq!(json["meta"]["total"], 15);
    assert_eq!(json["meta"]["totalPages"], 2);
    assert_eq!(json["meta"]["isFirstPage"], true);
    assert_eq!(json["meta"]["isLastPage"], false);

    let response = app
        .clone()
        .oneshot(get("/api/usuarios?page=2&limit=10", &token))
        .await
        .unwrap();
    let json = body_json(response).await;

    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["meta"]["isFirstPage"], false);
    assert_eq!(json["meta"]["isLastPage"], true);
}

#[tokio::test]
async fn missing_user_is_a_404() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let response = app
        .clone()
        .oneshot(get("/api/usuarios/9999", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The deactivate path uses the same convention
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/usuarios/9999")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "up");
}
