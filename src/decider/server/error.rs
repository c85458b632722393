// SPDX-License-Identifier: MIT

//! Error responses returned by the HTTP API
//!
//! Every failure maps onto a fixed status, a stable machine-readable code
//! and a fixed human message; internal details only go to the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::decider::error::PolicyError;

pub const CODE_INVALID_REQUEST_BODY: &str = "invalid_request_body";
pub const CODE_INVALID_POLICY_DOT: &str = "invalid_policy_dot";
pub const CODE_POLICY_NO_START_NODE: &str = "policy_no_start_node";
pub const CODE_INVALID_CONDITION: &str = "invalid_condition";
pub const CODE_INTERNAL_ERROR: &str = "internal_error";
pub const CODE_NOT_FOUND: &str = "not_found";
pub const CODE_METHOD_NOT_ALLOWED: &str = "method_not_allowed";

/// JSON error body: `{"status": 400, "error": "<code>", "message": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub status: u16,
    #[serde(rename = "error")]
    pub code: &'static str,
    pub message: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: &'static str) -> Self {
        Self {
            status: status.as_u16(),
            code,
            message,
        }
    }

    pub fn invalid_request_body() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            CODE_INVALID_REQUEST_BODY,
            "Invalid request body.",
        )
    }

    pub fn invalid_policy_dot() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            CODE_INVALID_POLICY_DOT,
            "Invalid policy DOT format.",
        )
    }

    pub fn no_start_node() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            CODE_POLICY_NO_START_NODE,
            "Policy graph has no start node.",
        )
    }

    pub fn invalid_condition() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            CODE_INVALID_CONDITION,
            "Invalid condition in policy.",
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            CODE_INTERNAL_ERROR,
            "An internal error occurred.",
        )
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, CODE_NOT_FOUND, "Not found.")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            CODE_METHOD_NOT_ALLOWED,
            "Method not allowed.",
        )
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<&PolicyError> for ApiError {
    fn from(err: &PolicyError) -> Self {
        match err {
            PolicyError::InvalidSyntax(_) => Self::invalid_policy_dot(),
            PolicyError::NoStartNode => Self::no_start_node(),
            PolicyError::InvalidCondition(_) => Self::invalid_condition(),
            PolicyError::Internal(_) => Self::internal(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
