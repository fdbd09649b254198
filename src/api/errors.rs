// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One rejected form field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

/// Error body: `{"detail": ...}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: ErrorDetail,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Anything that went wrong once the request was accepted
    #[error("{0}")]
    Processing(String),

    /// A form field was missing or could not be coerced
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
        kind: &'static str,
    },

    /// The multipart body itself could not be read
    #[error("There was an error parsing the body: {0}")]
    InvalidBody(String),
}

impl ServiceError {
    /// Flatten an error chain into the caller-visible message
    pub fn processing(err: &anyhow::Error) -> Self {
        ServiceError::Processing(format!("{:#}", err))
    }

    pub fn missing_field(field: &'static str) -> Self {
        ServiceError::Validation {
            field,
            message: "Field required".to_string(),
            kind: "missing",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let detail = match self {
            ServiceError::Processing(message) => ErrorDetail::Message(message.clone()),
            ServiceError::Validation {
                field,
                message,
                kind,
            } => ErrorDetail::Fields(vec![FieldError {
                loc: vec!["body".to_string(), field.to_string()],
                msg: message.clone(),
                kind: kind.to_string(),
            }]),
            ServiceError::InvalidBody(_) => ErrorDetail::Message(self.to_string()),
        };

        ErrorResponse { detail }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
