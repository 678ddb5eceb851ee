use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use diesel::prelude::*;
use std::sync::Arc;

use iplus_shared::errors::{AppError, ErrorCode};
use iplus_shared::types::auth::{decode_token, extract_bearer_token, AuthUser};

use crate::models::AccessToken;
use crate::schema::access_tokens;
use crate::AppState;

/// Required principal: valid signature, unexpired, and the token's `jti`
/// still present in `access_tokens` (logout deletes those rows).
pub struct Principal(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = decode_token(&token, &state.config.jwt_secret)?;

        if claims.is_expired() {
            return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
        }

        let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
        let live: Option<AccessToken> = access_tokens::table
            .find(claims.jti)
            .first(&mut conn)
            .optional()?;

        if live.is_none() {
            return Err(AppError::new(ErrorCode::TokenRevoked, "token has been revoked"));
        }

        Ok(Self(AuthUser::from(claims)))
    }
}

/// Optional principal for endpoints whose viewer-dependent fields
/// (`liked_by_user`) degrade to defaults when anonymous.
pub struct OptionalPrincipal(pub Option<AuthUser>);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match Principal::from_request_parts(parts, state).await {
            Ok(Principal(user)) => Ok(Self(Some(user))),
            Err(_) => Ok(Self(None)),
        }
    }
}

/// Admin-only endpoints (skill administration, rating moderation).
pub struct AdminPrincipal(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Principal(user) = Principal::from_request_parts(parts, state).await?;
        if !matches!(user.role, iplus_shared::types::auth::UserRole::Admin) {
            return Err(AppError::new(ErrorCode::Forbidden, "admin access required"));
        }
        Ok(Self(user))
    }
}
