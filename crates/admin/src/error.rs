//! Unified error handling for the admin console.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::{AuthError, RegistryError};

/// Application-level error type for the console's HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// Registry (order/personnel) operation failed.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Authentication or authorization failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should be captured in Sentry.
    ///
    /// Client mistakes (validation, wrong password, missing documents) are
    /// expected traffic; store/provider failures and partial writes are not.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Session(_) | Self::Internal(_) => true,
            Self::Registry(e) => !matches!(
                e,
                RegistryError::Validation(_) | RegistryError::NotFound(_)
            ),
            Self::Auth(e) => matches!(
                e,
                AuthError::Identity(_)
                    | AuthError::Store(_)
                    | AuthError::Corrupt(_)
                    | AuthError::Partial { .. }
            ),
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Registry(e) => match e {
                RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
                RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
                RegistryError::Store(_) | RegistryError::Partial { .. } => StatusCode::BAD_GATEWAY,
            },
            Self::Auth(e) => match e {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials | AuthError::ProfileMissing => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::NotAdmin => StatusCode::FORBIDDEN,
                AuthError::DuplicateEmail => StatusCode::CONFLICT,
                AuthError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::Identity(_) | AuthError::Store(_) | AuthError::Partial { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = if status.is_server_error() || status == StatusCode::BAD_GATEWAY {
            match status {
                StatusCode::BAD_GATEWAY => "External service error".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context after a successful sign-in.
pub fn set_sentry_user(uid: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(uid.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");
    }

    #[test]
    fn test_auth_errors_map_to_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::NotAdmin)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::DuplicateEmail)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_registry_errors_map_to_status_codes() {
        assert_eq!(
            get_status(AppError::Registry(RegistryError::Validation(
                "bad".into()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Registry(RegistryError::NotFound(
                "order-42".into()
            ))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_gateway_errors_do_not_leak_details() {
        let err = AppError::Registry(RegistryError::NotFound("secret-key".into()));
        // Client errors keep their message,
        assert_eq!(get_status(err), StatusCode::NOT_FOUND);
        // server-side ones are masked.
        let masked = AppError::Internal("connection string with password".into());
        let response = masked.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
