use async_trait::async_trait;
use msgstore_config::DbConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use super::{Message, MessageStore, StoreError, StoreResult};

/// Database connection pool type
pub type DbPool = Pool<Postgres>;

/// Create a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, db_config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            db_config.acquire_timeout_secs,
        ))
        .idle_timeout(Some(std::time::Duration::from_secs(
            db_config.idle_timeout_secs,
        )))
        .test_before_acquire(true)
        .connect(database_url)
        .await
}

/// Message row as stored in the `messages` table
#[derive(Debug, Clone, sqlx::FromRow)]
struct MessageRecord {
    id: i64,
    owner_id: i64,
    content: String,
    #[sqlx(rename = "type")]
    message_type: i32,
    datetime: String,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Message {
            id: record.id,
            owner_id: record.owner_id,
            content: record.content,
            message_type: record.message_type,
            datetime: record.datetime,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Fault(other.to_string()),
        }
    }
}

/// PostgreSQL-backed message store
#[derive(Clone)]
pub struct PgMessageStore {
    pool: DbPool,
}

impl PgMessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn create(
        &self,
        owner_id: i64,
        content: &str,
        message_type: i32,
        datetime: &str,
    ) -> StoreResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO messages (owner_id, content, type, datetime)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(content)
        .bind(message_type)
        .bind(datetime)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, owner_id = %owner_id, "Failed to insert message");
            StoreError::Fault(e.to_string())
        })?;

        Ok(id)
    }

    async fn get(&self, id: i64) -> StoreResult<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, owner_id, content, type, datetime
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Message::from).ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: i64, new_content: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET content = $1
            WHERE id = $2
            "#,
        )
        .bind(new_content)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(true)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(true)
    }

    async fn list_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Message>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, owner_id, content, type, datetime
            FROM messages
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        if records.is_empty() {
            return Err(StoreError::NoResults);
        }
        Ok(records.into_iter().map(Message::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a running Postgres database:
    // TEST_DATABASE_URL=postgres://... cargo test -- --ignored
    async fn test_store() -> PgMessageStore {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        let pool = create_pool(&url, &DbConfig::default())
            .await
            .expect("Failed to connect to Postgres");
        let store = PgMessageStore::new(pool);
        store.migrate().await.expect("Failed to migrate the database");
        store
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(StoreError::from(sqlx::Error::RowNotFound), StoreError::NotFound);
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Fault(_)
        ));
    }

    #[tokio::test]
    #[ignore]
    async fn test_crud_against_postgres() {
        let store = test_store().await;
        let owner = 900_000 + (chrono::Utc::now().timestamp_subsec_micros() as i64);

        let id = store.create(owner, "hi", 1, "2024-01-01 10:00").await.unwrap();
        let message = store.get(id).await.unwrap();
        assert_eq!(message.owner_id, owner);
        assert_eq!(message.content, "hi");

        assert_eq!(store.update(id, "edited").await, Ok(true));
        assert_eq!(store.get(id).await.unwrap().content, "edited");
        assert_eq!(store.list_by_owner(owner).await.unwrap().len(), 1);

        assert_eq!(store.delete(id).await, Ok(true));
        assert_eq!(store.delete(id).await, Err(StoreError::NotFound));
        assert_eq!(store.update(id, "x").await, Err(StoreError::NotFound));
        assert_eq!(store.list_by_owner(owner).await, Err(StoreError::NoResults));
    }
}
