//! Caller identity extraction.
//!
//! Session handling lives in front of this service; by the time a request arrives the
//! authenticated user's ID is carried in the `x-user-id` header.

use crate::errors::Error;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Header carrying the authenticated user's ID.
pub const CALLER_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(CALLER_HEADER).ok_or_else(|| Error::Unauthorized {
            message: "Missing caller identity".to_string(),
        })?;

        header
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(Caller)
            .ok_or_else(|| Error::Unauthorized {
                message: "Invalid caller identity".to_string(),
            })
    }
}
