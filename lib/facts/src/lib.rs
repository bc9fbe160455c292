//! Fact store for the ticketbot backend.
//!
//! This crate provides:
//!
//! - **Fact**: a piece of information extracted from conversation, with a
//!   `pending -> saved | discarded` lifecycle
//! - **Fact Store**: the [`FactStore`] trait and its in-memory implementation

pub mod error;
pub mod fact;
pub mod store;

pub use error::FactStoreError;
pub use fact::{Fact, FactStatus, NewFact, Provenance};
pub use store::{FactStore, InMemoryFactStore};
