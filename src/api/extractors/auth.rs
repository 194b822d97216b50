use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use std::sync::Arc;

use crate::domain::models::auth::{Actor, Capability, Claims};
use crate::error::AppError;
use crate::state::AppState;

fn decode_bearer(parts: &Parts, state: &AppState) -> Option<Actor> {
    let header_value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header_value.strip_prefix("Bearer ")?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[state.config.auth_issuer.clone()]);

    let key = DecodingKey::from_secret(state.config.jwt_secret.as_bytes());
    let data = decode::<Claims>(token, &key, &validation).ok()?;
    Some(data.claims.into())
}

pub struct AuthUser(pub Actor);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        decode_bearer(parts, &app_state)
            .map(AuthUser)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Like [`AuthUser`] but tolerant: anonymous callers get `None` instead of a
/// rejection. Used by read endpoints that hide unpublished content from the
/// public while still serving it to admins.
pub struct MaybeAuthUser(pub Option<Actor>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        Ok(MaybeAuthUser(decode_bearer(parts, &app_state)))
    }
}

/// Hard-blocks the request unless the actor holds every listed capability.
/// Runs before any repository call so denied mutations never touch storage.
pub async fn require(
    state: &AppState,
    actor: &Actor,
    capabilities: &[Capability],
) -> Result<(), AppError> {
    let granted = state.permissions.granted(actor, capabilities).await?;
    for cap in capabilities {
        if !granted.contains(cap) {
            return Err(AppError::Forbidden(format!(
                "Missing capability: {}",
                cap.as_str()
            )));
        }
    }
    Ok(())
}
