use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use crate::application::membership::MembershipError;
use crate::ports::{TokenClaims, TokenKind};

use super::{error::ApiError, handlers::AppState};

/// Extractor for the authenticated member from a bearer access token
pub struct AuthenticatedMember(pub TokenClaims);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedMember {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::MissingToken("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::MissingToken("Invalid authorization header format"))?;

        let claims = state
            .service_deps
            .token_issuer
            .verify(token, TokenKind::Access)
            .map_err(MembershipError::from)?;

        Ok(AuthenticatedMember(claims))
    }
}
