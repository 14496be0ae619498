use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Message, MessageStore, StoreError, StoreResult};

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    messages: BTreeMap<i64, Message>,
}

/// In-process store used when no database is configured, and by tests.
///
/// Ids start at 1 and are never reused, matching a `BIGSERIAL` column.
#[derive(Default)]
pub struct MemoryMessageStore {
    state: RwLock<MemoryState>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages
    pub async fn len(&self) -> usize {
        self.state.read().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn create(
        &self,
        owner_id: i64,
        content: &str,
        message_type: i32,
        datetime: &str,
    ) -> StoreResult<i64> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;
        state.messages.insert(
            id,
            Message {
                id,
                owner_id,
                content: content.to_string(),
                message_type,
                datetime: datetime.to_string(),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> StoreResult<Message> {
        self.state
            .read()
            .await
            .messages
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: i64, new_content: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let message = state.messages.get_mut(&id).ok_or(StoreError::NotFound)?;
        message.content = new_content.to_string();
        Ok(true)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.state
            .write()
            .await
            .messages
            .remove(&id)
            .map(|_| true)
            .ok_or(StoreError::NotFound)
    }

    async fn list_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Message>> {
        let messages: Vec<Message> = self
            .state
            .read()
            .await
            .messages
            .values()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect();

        if messages.is_empty() {
            return Err(StoreError::NoResults);
        }
        Ok(messages)
    }
}
