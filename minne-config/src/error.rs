//! Error types for configuration validation

use thiserror::Error;
use validator::ValidationErrors;

/// Unified configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more configuration values fell outside their permitted range.
    #[error("invalid configuration, offending fields: {}", offending_fields(.0))]
    Validation(#[source] ValidationErrors),
}

fn offending_fields(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();
    fields.join(", ")
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}
