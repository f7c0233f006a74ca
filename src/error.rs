//! Typed errors and HTTP mapping.

use crate::response::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
    #[error("unknown store backend: {0} (expected postgres or memory)")]
    UnknownBackend(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: i64 },
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// A secondary lookup failed while composing a view of `kind` `key`.
    #[error("enrichment of {kind} {key} via {field} failed")]
    Enrichment {
        kind: &'static str,
        key: i64,
        field: &'static str,
        #[source]
        source: Box<AppError>,
    },
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: &'static str, key: i64) -> Self {
        AppError::NotFound { kind, key }
    }

    /// Map a driver error, turning unique and foreign key violations into `ConstraintViolation`.
    pub fn from_db(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if let Some(code) = db.code() {
                if code == "23505" || code == "23503" {
                    return AppError::ConstraintViolation(db.message().to_string());
                }
            }
        }
        AppError::Db(e)
    }

    /// Innermost cause, looking through enrichment wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Enrichment { source, .. } => source.root(),
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::Enrichment { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            AppError::Serde(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = match &self {
            AppError::Enrichment { source, .. } => format!("Error: {}: {}", self, source),
            _ => format!("Error: {}", self),
        };
        let body: Envelope<()> = Envelope::error(msg);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn dangling() -> AppError {
        AppError::Enrichment {
            kind: "ask_question",
            key: 1,
            field: "sid",
            source: Box::new(AppError::not_found("student", 9)),
        }
    }

    #[test]
    fn enrichment_cause_appears_once_in_the_chain() {
        let err = dangling();
        assert_eq!(err.to_string(), "enrichment of ask_question 1 via sid failed");
        assert_eq!(err.source().map(|e| e.to_string()).as_deref(), Some("student 9 not found"));
        assert!(matches!(err.root(), AppError::NotFound { key: 9, .. }));
    }

    #[tokio::test]
    async fn enrichment_response_names_the_cause() {
        let response = dangling().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], -1);
        assert_eq!(
            body["msg"],
            "Error: enrichment of ask_question 1 via sid failed: student 9 not found"
        );
    }
}
