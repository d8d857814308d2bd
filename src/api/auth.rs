use axum::{
    Extension, Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::MessageResponse;
use super::{ApiError, AppState};
use crate::models::UserRole;
use crate::services::AuthIdentity;

/// Cookie carrying the session token, set on login and cleared on logout.
const TOKEN_COOKIE: &str = "token";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware. Token sources, in order:
/// 1. `token` cookie
/// 2. `Authorization: Bearer <token>` header (case-insensitive scheme)
///
/// The cookie always wins when both are present. On success the verified
/// identity is attached to the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token(request.headers()) else {
        return Err(ApiError::Unauthorized {
            code: "TOKEN_MISSING",
            message: "Token não fornecido".to_string(),
        });
    };

    let identity = state.auth_service().verify_token(&token).await?;

    tracing::Span::current().record("user_id", identity.id);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Server-side role gate for user management. Reads the role from the
/// database rather than the token, so demotions and deactivations apply
/// immediately.
pub async fn require_admin(state: &AppState, identity: &AuthIdentity) -> Result<(), ApiError> {
    let user = state
        .store()
        .get_user(identity.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load user for role check: {e}")))?
        .ok_or(ApiError::Unauthorized {
            code: "TOKEN_INVALID",
            message: "Token inválido".to_string(),
        })?;

    if user.active != 1 {
        return Err(ApiError::Unauthorized {
            code: "USER_DEACTIVATED",
            message: "Usuário desativado".to_string(),
        });
    }

    if UserRole::parse(&user.role) != Some(UserRole::Admin) {
        return Err(ApiError::Forbidden {
            message: "Acesso restrito a administradores".to_string(),
        });
    }

    Ok(())
}

/// Cookie first, bearer header as fallback.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = token_from_cookie(headers) {
        return Some(token);
    }

    token_from_bearer(headers)
}

fn token_from_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
}

fn token_from_bearer(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    if auth.len() > 7 && auth[..7].eq_ignore_ascii_case("bearer ") {
        let token = auth[7..].trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
/// Exchange credentials for a signed token; also sets the `HttpOnly` cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let login = payload.login.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let success = state.auth_service().login(&login, &password).await?;

    let max_age = {
        let config = state.config().read().await;
        config.auth.token_ttl_hours * 3600
    };

    let cookie = format!(
        "{TOKEN_COOKIE}={}; HttpOnly; Path=/; Max-Age={max_age}; SameSite=Lax",
        success.token
    );

    tracing::info!("User logged in: {}", success.user.login);

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(success),
    ))
}

/// POST /auth/logout
/// Revokes the presented token and clears the cookie. Callable without a
/// token — a no-op then.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_token(&headers) {
        state.auth_service().blacklist_token(&token).await?;
    }

    let cookie = format!("{TOKEN_COOKIE}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax");

    Ok((
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(MessageResponse {
            message: "Logout efetuado".to_string(),
        }),
    ))
}

/// GET /auth/me
/// Identity carried by the presented token.
pub async fn get_current_user(Extension(identity): Extension<AuthIdentity>) -> Json<AuthIdentity> {
    Json(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=from-cookie"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("bEaReR abc123"),
        );

        assert_eq!(extract_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_token_is_none() {
        let headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());
    }
}
