//! Caller identity extracted from request headers.
//!
//! `x-user-id` carries the caller's UUID and `x-user-role` is either
//! `admin` or `user`. An absent role header means a regular user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;
use domain::CurrentUser;

use crate::error::ApiError;

/// Extractor for handlers that require an authenticated caller.
pub struct Identity(pub CurrentUser);

/// Extractor for handlers that accept anonymous callers.
pub struct MaybeIdentity(pub Option<CurrentUser>);

fn parse_identity(parts: &Parts) -> Result<Option<CurrentUser>, ApiError> {
    let Some(raw_id) = parts.headers.get("x-user-id") else {
        return Ok(None);
    };

    let raw_id = raw_id
        .to_str()
        .map_err(|_| ApiError::BadRequest("x-user-id is not valid UTF-8".to_string()))?;
    let uuid = uuid::Uuid::parse_str(raw_id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid x-user-id: {e}")))?;
    let user_id = UserId::from_uuid(uuid);

    let is_admin = parts
        .headers
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|role| role.eq_ignore_ascii_case("admin"));

    Ok(Some(if is_admin {
        CurrentUser::admin(user_id)
    } else {
        CurrentUser::customer(user_id)
    }))
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_identity(parts)?
            .map(Identity)
            .ok_or_else(|| ApiError::Unauthorized("x-user-id header required".to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(parse_identity(parts)?))
    }
}
