//! Fact records and their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use ticketbot_core::FactId;

/// Opaque provenance metadata attached by the assistant.
///
/// Serialized flat alongside the fact's own fields.
pub type Provenance = Map<String, JsonValue>;

/// Field names owned by [`Fact`]; provenance may not shadow them.
const RESERVED_FIELDS: [&str; 5] = ["id", "content", "status", "created_at", "updated_at"];

/// The review status of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactStatus {
    /// Extracted but not yet reviewed.
    Pending,
    /// Kept by the user.
    Saved,
    /// Rejected by the user.
    Discarded,
}

impl FactStatus {
    /// Returns true once the fact has been reviewed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Saved | Self::Discarded)
    }

    /// Returns the wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Saved => "saved",
            Self::Discarded => "discarded",
        }
    }
}

impl std::fmt::Display for FactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fact extracted from a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Unique identifier.
    pub id: FactId,
    /// The fact text.
    pub content: String,
    /// Review status.
    pub status: FactStatus,
    /// When this fact was recorded.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
    /// Assistant-supplied metadata, passed through untouched.
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl Fact {
    /// Creates a pending fact.
    #[must_use]
    pub fn pending(id: FactId, content: impl Into<String>, provenance: Provenance) -> Self {
        let now = Utc::now();
        Self {
            id,
            content: content.into(),
            status: FactStatus::Pending,
            created_at: now,
            updated_at: now,
            provenance: strip_reserved(provenance),
        }
    }

    /// Moves a pending fact to `target`.
    ///
    /// Reviewed facts keep their status. Returns true if the status changed.
    pub fn transition(&mut self, target: FactStatus) -> bool {
        if self.status.is_terminal() || self.status == target {
            return false;
        }
        self.status = target;
        self.updated_at = Utc::now();
        true
    }
}

/// A fact to be recorded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFact {
    /// Id assigned by the assistant; generated when absent.
    #[serde(default)]
    pub id: Option<FactId>,
    /// The fact text.
    pub content: String,
    /// Everything else in the request body.
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl NewFact {
    /// Creates a draft with only content.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            provenance: Provenance::new(),
        }
    }

    /// Sets an explicit id.
    #[must_use]
    pub fn with_id(mut self, id: FactId) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds a provenance entry.
    #[must_use]
    pub fn with_provenance(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.provenance.insert(key.into(), value);
        self
    }
}

fn strip_reserved(mut provenance: Provenance) -> Provenance {
    for field in RESERVED_FIELDS {
        provenance.remove(field);
    }
    provenance
}
