// ============================================================================
// CRUD Domain Service
// ============================================================================
//
// Stateless orchestrator between the RPC layer and the message store.
// Callers hand in an already-authenticated owner id; this layer applies the
// ownership rule and otherwise delegates to the store unchanged.
//
// ============================================================================

use std::sync::Arc;

use chrono::Utc;

use crate::store::{Message, MessageStore, StoreError, StoreResult};

/// Format used when the server stamps a creation time
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Whether id-addressed operations check that the requester owns the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipPolicy {
    /// Messages owned by someone else look exactly like missing ones
    Enforce,
    /// Any authenticated caller may address any id
    Trust,
}

impl From<bool> for OwnershipPolicy {
    fn from(enforce: bool) -> Self {
        if enforce {
            OwnershipPolicy::Enforce
        } else {
            OwnershipPolicy::Trust
        }
    }
}

pub struct MessageService {
    store: Arc<dyn MessageStore>,
    ownership: OwnershipPolicy,
}

impl MessageService {
    pub fn new(store: Arc<dyn MessageStore>, ownership: OwnershipPolicy) -> Self {
        if ownership == OwnershipPolicy::Trust {
            tracing::warn!(
                "Ownership checks disabled: any authenticated caller can read, update or delete any message id"
            );
        }
        Self { store, ownership }
    }

    pub fn ownership(&self) -> OwnershipPolicy {
        self.ownership
    }

    /// Store a new message for `owner_id`. An empty `datetime` is stamped with
    /// the current UTC time.
    pub async fn send_message(
        &self,
        owner_id: i64,
        content: &str,
        message_type: i32,
        datetime: &str,
    ) -> StoreResult<i64> {
        let stamped;
        let datetime = if datetime.is_empty() {
            stamped = Utc::now().format(DATETIME_FORMAT).to_string();
            stamped.as_str()
        } else {
            datetime
        };

        let id = self
            .store
            .create(owner_id, content, message_type, datetime)
            .await?;

        tracing::debug!(owner_id = %owner_id, message_id = %id, "Message stored");
        Ok(id)
    }

    pub async fn get_message(&self, requester: i64, id: i64) -> StoreResult<Message> {
        let message = self.store.get(id).await?;
        self.check_owner(requester, &message)?;
        Ok(message)
    }

    pub async fn update_message(
        &self,
        requester: i64,
        id: i64,
        new_content: &str,
    ) -> StoreResult<bool> {
        self.ensure_owner(requester, id).await?;
        self.store.update(id, new_content).await
    }

    pub async fn delete_message(&self, requester: i64, id: i64) -> StoreResult<bool> {
        self.ensure_owner(requester, id).await?;
        self.store.delete(id).await
    }

    /// All messages of `owner_id`. [`StoreError::NoResults`] is passed through;
    /// the protocol layer turns it into an empty response.
    pub async fn list_messages(&self, owner_id: i64) -> StoreResult<Vec<Message>> {
        self.store.list_by_owner(owner_id).await
    }

    // Owner ids are immutable, so a check followed by the mutation cannot be
    // invalidated by a concurrent update.
    async fn ensure_owner(&self, requester: i64, id: i64) -> StoreResult<()> {
        if self.ownership == OwnershipPolicy::Trust {
            return Ok(());
        }
        let message = self.store.get(id).await?;
        self.check_owner(requester, &message)
    }

    fn check_owner(&self, requester: i64, message: &Message) -> StoreResult<()> {
        if self.ownership == OwnershipPolicy::Enforce && message.owner_id != requester {
            tracing::warn!(
                requester = %requester,
                message_id = %message.id,
                "Ownership check failed"
            );
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
