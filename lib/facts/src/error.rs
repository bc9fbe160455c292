//! Error types for the fact store.
//!
//! An unknown fact id is not an error: lookups return `None` and the HTTP
//! layer turns that into a 404.

use std::fmt;
use ticketbot_core::FactId;

/// Errors from recording a new fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactStoreError {
    /// A fact with this id already exists.
    DuplicateId { id: FactId },
    /// The fact content is empty or whitespace.
    EmptyContent,
}

impl fmt::Display for FactStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "fact '{id}' already exists"),
            Self::EmptyContent => write!(f, "fact content must not be empty"),
        }
    }
}

impl std::error::Error for FactStoreError {}
