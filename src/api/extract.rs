// Token authentication extractors

use super::{ApiError, AppState};
use crate::auth::{parse_token_header, user_for_token};
use crate::entities::user::User;
use crate::error::FoodgramError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The authenticated caller; rejects with 401 otherwise
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The caller if a valid token was sent, `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

fn resolve(parts: &Parts, state: &AppState) -> Result<Option<User>, ApiError> {
    let key = match parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        Some(value) => parse_token_header(value).ok_or(FoodgramError::Unauthorized)?,
        None => return Ok(None),
    };

    let conn = state.conn()?;
    match user_for_token(&conn, key)? {
        Some(user) => Ok(Some(user)),
        // A token that was sent but is unknown is an error, not anonymity
        None => Err(FoodgramError::Unauthorized.into()),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).map(MaybeUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state)?
            .map(CurrentUser)
            .ok_or(ApiError(FoodgramError::Unauthorized))
    }
}
