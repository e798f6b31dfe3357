//! Response mapping: internal failure kinds to statuses, stable error
//! codes and `WWW-Authenticate` challenges.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use operation_core::OperationError;
use serde::Serialize;

use crate::forms::FormsError;

/// Challenge sent with every authentication failure
pub const BEARER_REALM: &str = r#"Bearer realm="yoda""#;

/// Uniform error body: `success` is always false, `errors` carries one
/// stable code plus a human-readable description
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub errors: Vec<ErrorDetails>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: &'static str,
    pub description: &'static str,
}

/// Application error type
#[derive(Debug)]
pub enum ApiError {
    Operation(OperationError),
    Forms(FormsError),
}

impl From<OperationError> for ApiError {
    fn from(err: OperationError) -> Self {
        ApiError::Operation(err)
    }
}

impl From<FormsError> for ApiError {
    fn from(err: FormsError) -> Self {
        ApiError::Forms(err)
    }
}

fn invalid_token_challenge(message: &str) -> String {
    format!(r#"{BEARER_REALM}, error_code="invalid_token", error_message="{message}""#)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, description, challenge) = match self {
            ApiError::Operation(err) => {
                let challenge = match &err {
                    OperationError::NoAuthHeader
                    | OperationError::WrongHeaderScheme
                    | OperationError::EmptyToken => Some(BEARER_REALM.to_string()),
                    OperationError::MalformedToken => {
                        Some(invalid_token_challenge("The access token is invalid."))
                    }
                    OperationError::WrongTokenKind => Some(invalid_token_challenge(
                        "Invalid type of the authentication token.",
                    )),
                    OperationError::MissingIdentityClaim => {
                        Some(invalid_token_challenge("Missing the platform id."))
                    }
                    OperationError::MalformedIdentityClaim => {
                        Some(invalid_token_challenge("Invalid the platform id."))
                    }
                    _ => None,
                };

                let (status, code, description) = match err {
                    OperationError::NoAuthHeader => (
                        StatusCode::UNAUTHORIZED,
                        "AUTH_HEADER_MISSING",
                        "The authentication header is missing.",
                    ),
                    OperationError::WrongHeaderScheme => (
                        StatusCode::UNAUTHORIZED,
                        "AUTH_HEADER_INVALID_TYPE",
                        "Invalid type of the authentication header. Expected type is 'Bearer'.",
                    ),
                    OperationError::EmptyToken => (
                        StatusCode::UNAUTHORIZED,
                        "AUTH_TOKEN_EMPTY",
                        "The authentication token is empty.",
                    ),
                    OperationError::MalformedToken => (
                        StatusCode::UNAUTHORIZED,
                        "AUTH_TOKEN_INVALID",
                        "Invalid the access token.",
                    ),
                    OperationError::WrongTokenKind => (
                        StatusCode::UNAUTHORIZED,
                        "AUTH_TOKEN_INVALID_TYPE",
                        "Invalid type of the authentication token.",
                    ),
                    OperationError::MissingIdentityClaim => (
                        StatusCode::BAD_REQUEST,
                        "PLATFORM_ID_MISSING",
                        "Missing the platform id.",
                    ),
                    OperationError::MalformedIdentityClaim => (
                        StatusCode::BAD_REQUEST,
                        "PLATFORM_ID_INVALID",
                        "Invalid the platform id.",
                    ),
                    OperationError::MissingOperationId => (
                        StatusCode::BAD_REQUEST,
                        "OPERATION_ID_MISSING",
                        "Missing the operation id.",
                    ),
                    OperationError::InvalidOperationId => (
                        StatusCode::BAD_REQUEST,
                        "OPERATION_ID_INVALID",
                        "Invalid the operation id.",
                    ),
                    OperationError::OperationNotFound => (
                        StatusCode::NOT_FOUND,
                        "OPERATION_NOT_FOUND",
                        "Unknown the operation.",
                    ),
                    OperationError::IssuanceConflict { .. }
                    | OperationError::StorageUnavailable(_) => {
                        // Internal context stays in the logs, never in the body
                        tracing::error!(error = %err, "operation request failed");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "INTERNAL_SERVER_ERROR",
                            "Internal server error.",
                        )
                    }
                };

                (status, code, description, challenge)
            }
            ApiError::Forms(FormsError::InvalidQuery(reason)) => {
                tracing::warn!(reason = %reason, "invalid forms query");
                (
                    StatusCode::BAD_REQUEST,
                    "REQUEST_FORM_INVALID",
                    "Invalid value of query parameter - 'form'.",
                    None,
                )
            }
            ApiError::Forms(FormsError::Upstream { status, body }) => {
                // The remote forms service's status and payload pass through
                tracing::warn!(status = %status, "forms service rejected the request");
                return (status, body).into_response();
            }
            ApiError::Forms(FormsError::Unreachable(err)) => {
                tracing::error!(error = %err, "forms service unreachable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Internal server error.",
                    None,
                )
            }
        };

        let body = ErrorBody {
            success: false,
            errors: vec![ErrorDetails { code, description }],
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(challenge) = challenge {
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response.headers_mut().insert(WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}
