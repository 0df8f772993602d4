// Error types shared by the store, the validators and the HTTP layer

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// FIELD ERRORS
// ============================================================================

/// A single rejected field with a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Group field errors by field name, preserving the order messages were raised in
pub fn group_by_field(errors: &[FieldError]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for error in errors {
        grouped
            .entry(error.field.clone())
            .or_default()
            .push(error.message.clone());
    }
    grouped
}

// ============================================================================
// FOODGRAM ERROR
// ============================================================================

#[derive(Error, Debug)]
pub enum FoodgramError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn format_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl FoodgramError {
    pub fn not_found(entity: &'static str) -> Self {
        FoodgramError::NotFound { entity }
    }

    /// Shortcut for a validation failure on a single field
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        FoodgramError::Validation(vec![FieldError::new(field, message)])
    }
}

pub type Result<T> = std::result::Result<T, FoodgramError>;
