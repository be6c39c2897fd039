//! Custom error types for the catalog service
//!
//! [`ApiError`] is the complete set of outcomes a request can fail with.
//! Every store or validation failure is converted into exactly one variant
//! before it leaves the pipeline, and [`IntoResponse`] maps each variant to
//! its status code and body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use std::fmt;
use thiserror::Error;
use tracing::error;

use crate::{resource::ResourceKind, validation::ValidationErrors};

/// What the pipeline was doing when the store failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Client-facing message for a store failure during this operation
    pub fn failure_message(self, kind: ResourceKind) -> String {
        match self {
            Operation::List => format!("Error retrieving {} from database", kind.plural()),
            Operation::Retrieve => format!("Error retrieving {} from database", kind.name()),
            Operation::Create => format!("Error saving the {}", kind.name()),
            Operation::Update => format!("Error updating a {}", kind.name()),
            Operation::Delete => format!("Error deleting a {}", kind.name()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::List => "list",
            Operation::Retrieve => "retrieve",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

/// Custom error type for the catalog service
#[derive(Error, Debug)]
pub enum ApiError {
    /// One or more fields failed validation
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] ValidationErrors),

    /// The natural key is already held by another row
    #[error("Duplicate {0} key")]
    DuplicateKey(ResourceKind),

    /// A write targeted a row that does not exist
    #[error("{} with id {id} not found", .kind.label())]
    NotFound { kind: ResourceKind, id: i64 },

    /// A read by id found nothing
    #[error("{} not found", .0.label())]
    Missing(ResourceKind),

    /// Any other store failure
    #[error("Failed to {operation} {kind}: {source}")]
    Store {
        operation: Operation,
        kind: ResourceKind,
        #[source]
        source: DatabaseError,
    },
}

impl ApiError {
    /// Classify a store error raised during `operation`.
    ///
    /// A unique violation means a concurrent writer took the key between the
    /// uniqueness check and the write, so it is reported as a conflict.
    pub fn store(operation: Operation, kind: ResourceKind, source: DatabaseError) -> Self {
        if source.is_unique_violation() {
            ApiError::DuplicateKey(kind)
        } else {
            ApiError::Store {
                operation,
                kind,
                source,
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::DuplicateKey(_) => StatusCode::CONFLICT,
            ApiError::NotFound { .. } | ApiError::Missing(_) => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn duplicate_message(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::User => "This email is already used",
        ResourceKind::Movie => "This movie already exists",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::InvalidPayload(errors) => {
                (status, Json(json!({ "validationErrors": errors }))).into_response()
            }
            ApiError::DuplicateKey(kind) => {
                (status, Json(json!({ "message": duplicate_message(kind) }))).into_response()
            }
            ApiError::NotFound { kind, id } => {
                let message = format!("{} with id {id} not found.", kind.label());
                (status, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Missing(kind) => {
                (status, format!("{} not found", kind.label())).into_response()
            }
            ApiError::Store {
                operation,
                kind,
                source,
            } => {
                error!(%operation, %kind, error = %source, "Store failure");
                let body = Json(json!({ "error": operation.failure_message(kind) }));
                (status, body).into_response()
            }
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
