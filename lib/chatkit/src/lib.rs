//! Hosted ChatKit integration for the ticketbot backend.
//!
//! This crate provides the two seams to the hosted service:
//!
//! - **Conversation**: [`ChatServer`] turns a raw ChatKit request into either a
//!   streaming or a buffered [`ChatResult`]; [`HostedChatServer`] forwards it
//!   to an upstream ChatKit endpoint
//! - **Sessions**: [`SessionIssuer`] exchanges a workflow id for a short-lived
//!   [`ClientSecret`]; [`OpenAiSessionIssuer`] calls the hosted sessions API

pub mod error;
pub mod hosted;
pub mod server;
pub mod session;

pub use error::{ChatError, SessionIssueError};
pub use hosted::{HostedChatConfig, HostedChatServer};
pub use server::{ChatResult, ChatServer, ChunkStream, RequestContext};
pub use session::{ClientSecret, OpenAiSessionIssuer, SessionIssuer, SessionIssuerConfig};
