pub mod application;
pub mod job;
pub mod user;

use thiserror::Error;

/// Raised when a text column or request parameter does not name a known variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {field} '{value}'")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}
