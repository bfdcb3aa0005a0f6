//! Maps domain errors onto HTTP responses.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

impl Error {
    /// HTTP status and machine-readable code for this error.
    #[must_use]
    pub const fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::ListingNotFound { .. }
            | Self::UserNotFound { .. }
            | Self::TransactionNotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::InvalidInput { .. }
            | Self::InvalidAmount { .. }
            | Self::UnknownCategory { .. }
            | Self::ListingUnavailable { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict { .. } | Self::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::ListingNotFound { id: 1 }.status().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::UnknownCategory {
                name: "GADGETS".to_string()
            }
            .status()
            .0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidTransition {
                id: 3,
                from: "COMPLETED".to_string(),
                to: "CANCELLED".to_string(),
            }
            .status()
            .0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Database(DbErr::Custom("boom".to_string())).status().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let response = Error::Database(DbErr::Custom("secret table".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
