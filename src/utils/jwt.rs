//! Utilidades JWT
//!
//! Los tokens los emite el servicio de autenticación externo; aquí solo se
//! verifican. `generate_token` existe para herramientas internas y tests.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Rol del usuario en el token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Customer,
    Driver,
    Admin,
}

/// Claims del JWT token
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // user_id
    pub role: UserRole,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

/// Generar JWT token para un usuario
pub fn generate_token(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(ttl_seconds);

    let claims = JwtClaims {
        sub: user_id.to_string(),
        role,
        exp: expires_at.timestamp().max(0) as usize,
        iat: now.timestamp().max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Error generando token: {}", e)))
}

/// Verificar y decodificar JWT token (HS256)
pub fn verify_token(token: &str, secret: &str) -> Result<JwtClaims, AppError> {
    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))
}
