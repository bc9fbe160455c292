//! Fact storage.
//!
//! Facts live for the lifetime of the process. The store is created once at
//! startup and shared with request handlers; callers only ever receive
//! clones of the stored records.

use crate::error::FactStoreError;
use crate::fact::{Fact, FactStatus, NewFact};
use async_trait::async_trait;
use std::collections::HashMap;
use ticketbot_core::FactId;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Trait for fact storage.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Records a new pending fact.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is blank or the id is already taken.
    async fn record(&self, draft: NewFact) -> ticketbot_core::Result<Fact, FactStoreError>;

    /// Returns every saved fact, in the order the facts were recorded.
    async fn list_saved(&self) -> Vec<Fact>;

    /// Marks a fact as saved.
    ///
    /// Returns `None` if no fact has this id.
    async fn mark_saved(&self, id: &FactId) -> Option<Fact>;

    /// Marks a fact as discarded.
    ///
    /// Returns `None` if no fact has this id.
    async fn discard(&self, id: &FactId) -> Option<Fact>;
}

#[derive(Debug, Default)]
struct Facts {
    by_id: HashMap<FactId, Fact>,
    order: Vec<FactId>,
}

/// Process-local fact store.
#[derive(Debug, Default)]
pub struct InMemoryFactStore {
    inner: RwLock<Facts>,
}

impl InMemoryFactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored facts, in any status.
    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    /// Returns true if nothing has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn set_status(&self, id: &FactId, target: FactStatus) -> Option<Fact> {
        let mut facts = self.inner.write().await;
        let Some(fact) = facts.by_id.get_mut(id) else {
            debug!(fact_id = %id, "fact not found");
            return None;
        };

        if fact.transition(target) {
            debug!(fact_id = %id, status = %target, "fact status changed");
        } else {
            debug!(
                fact_id = %id,
                requested = %target,
                current = %fact.status,
                "fact status unchanged"
            );
        }

        Some(fact.clone())
    }
}

#[async_trait]
impl FactStore for InMemoryFactStore {
    #[instrument(skip_all)]
    async fn record(&self, draft: NewFact) -> ticketbot_core::Result<Fact, FactStoreError> {
        let content = draft.content.trim();
        if content.is_empty() {
            return Err(FactStoreError::EmptyContent.into());
        }

        let id = draft
            .id
            .filter(|id| !id.as_str().trim().is_empty())
            .unwrap_or_else(FactId::generate);

        let mut facts = self.inner.write().await;
        if facts.by_id.contains_key(&id) {
            return Err(FactStoreError::DuplicateId { id }.into());
        }

        let fact = Fact::pending(id.clone(), content, draft.provenance);
        facts.by_id.insert(id.clone(), fact.clone());
        facts.order.push(id);

        debug!(fact_id = %fact.id, "recorded fact");
        Ok(fact)
    }

    async fn list_saved(&self) -> Vec<Fact> {
        let facts = self.inner.read().await;
        facts
            .order
            .iter()
            .filter_map(|id| facts.by_id.get(id))
            .filter(|fact| fact.status == FactStatus::Saved)
            .cloned()
            .collect()
    }

    #[instrument(skip_all, fields(fact_id = %id))]
    async fn mark_saved(&self, id: &FactId) -> Option<Fact> {
        self.set_status(id, FactStatus::Saved).await
    }

    #[instrument(skip_all, fields(fact_id = %id))]
    async fn discard(&self, id: &FactId) -> Option<Fact> {
        self.set_status(id, FactStatus::Discarded).await
    }
}
