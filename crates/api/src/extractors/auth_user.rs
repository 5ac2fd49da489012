//! Authenticated principal extractor.
//!
//! Every protected handler receives an [`AuthUser`] and passes it down to
//! the service layer explicitly.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use domain::models::Role;
use shared::jwt::{JwtConfig, JwtError};
use std::str::FromStr;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Caller identity taken from a validated bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    /// Validates `token` and maps its `sub`/`role` claims.
    pub fn from_token(jwt: &JwtConfig, token: &str) -> Result<Self, ApiError> {
        let claims = jwt.validate(token).map_err(|e| match e {
            JwtError::TokenExpired => ApiError::Unauthorized("Jeton expiré".into()),
            other => {
                tracing::debug!(error = %other, "JWT validation failed");
                ApiError::Unauthorized("Jeton invalide".into())
            }
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Jeton invalide".into()))?;
        let role = Role::from_str(&claims.role)
            .map_err(|_| ApiError::Unauthorized("Rôle inconnu dans le jeton".into()))?;

        Ok(Self { user_id, role })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 403 unless the caller has `role`.
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "Action réservée au rôle {}",
                role
            )))
        }
    }
}

/// Returns the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("En-tête Authorization manquant".into()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Format d'en-tête Authorization invalide".into()))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already validated by the auth middleware.
        if let Some(auth) = parts.extensions.get::<AuthUser>() {
            return Ok(*auth);
        }

        let token = bearer_token(&parts.headers)?;
        AuthUser::from_token(&state.jwt, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn jwt() -> JwtConfig {
        JwtConfig::new("unit-test-secret", 0).unwrap()
    }

    #[test]
    fn test_from_token_maps_claims() {
        let jwt = jwt();
        let user_id = Uuid::new_v4();
        let token = jwt.issue(user_id, "prestataire", 60).unwrap();

        let auth = AuthUser::from_token(&jwt, &token).unwrap();
        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.role, Role::Prestataire);
        assert!(!auth.is_admin());
    }

    #[test]
    fn test_from_token_rejects_unknown_role() {
        let jwt = jwt();
        let token = jwt.issue(Uuid::new_v4(), "superuser", 60).unwrap();
        assert!(matches!(
            AuthUser::from_token(&jwt, &token),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_from_token_rejects_other_secret() {
        let other = JwtConfig::new("another-secret", 0).unwrap();
        let token = other.issue(Uuid::new_v4(), "client", 60).unwrap();
        assert!(AuthUser::from_token(&jwt(), &token).is_err());
    }

    #[test]
    fn test_require_role() {
        let auth = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Client,
        };
        assert!(auth.require_role(Role::Client).is_ok());
        assert!(matches!(
            auth.require_role(Role::Prestataire),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }
}
