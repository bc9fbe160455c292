//! Core types and utilities for the ticketbot backend.
//!
//! This crate provides the identifier types and error-handling foundation
//! shared by the fact store, the hosted ChatKit clients and the HTTP server.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EndUserId, FactId, ParseIdError, WorkflowId};
