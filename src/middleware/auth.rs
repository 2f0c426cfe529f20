//! Middleware de autenticación JWT
//!
//! Los tokens los emite el servicio de autenticación; aquí se verifican y el
//! usuario autenticado se inyecta en las extensions de la request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use uuid::Uuid;

use crate::{
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{verify_token, UserRole},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

fn authenticate(token: &str, secret: &str) -> Result<AuthenticatedUser, AppError> {
    let claims = verify_token(token, secret)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?;

    Ok(AuthenticatedUser {
        user_id,
        role: claims.role,
    })
}

/// Exige un token válido
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        AppError::Unauthorized("Token de autorización requerido".to_string())
    })?;
    let user = authenticate(token, &state.config.jwt_secret)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Autenticación opcional: sin header la request sigue como anónima, pero un
/// token presente e inválido se rechaza
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(request.headers()) {
        let user = authenticate(token, &state.config.jwt_secret)?;
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

/// Se aplica después de `auth_middleware`
pub async fn admin_only_middleware(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Se requieren permisos de administrador".to_string(),
        ));
    }

    Ok(next.run(request).await)
}
