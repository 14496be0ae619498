//! Message store gateway.
//!
//! The narrow interface the domain service uses to reach persistent storage,
//! plus the error vocabulary every backend must honour.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryMessageStore;
pub use postgres::{create_pool, DbPool, PgMessageStore};

/// A stored message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: i64,
    pub owner_id: i64,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: i32,
    pub datetime: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced message id does not exist
    #[error("message not found")]
    NotFound,

    /// A collection query legitimately matched nothing
    #[error("no messages found")]
    NoResults,

    /// The backend is unreachable or failed for a reason other than absence
    #[error("storage fault: {0}")]
    Fault(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend abstraction for the message collection.
///
/// Existence failures are always reported as [`StoreError::NotFound`];
/// `update` and `delete` never return `Ok(false)` for a missing id.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create(
        &self,
        owner_id: i64,
        content: &str,
        message_type: i32,
        datetime: &str,
    ) -> StoreResult<i64>;

    async fn get(&self, id: i64) -> StoreResult<Message>;

    async fn update(&self, id: i64, new_content: &str) -> StoreResult<bool>;

    async fn delete(&self, id: i64) -> StoreResult<bool>;

    /// All messages of `owner_id` ordered by id; [`StoreError::NoResults`] when empty
    async fn list_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Message>>;
}
