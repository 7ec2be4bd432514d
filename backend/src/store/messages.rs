use async_trait::async_trait;
use pieces_shared::{Message, MessageContent};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::RwLock;

use crate::error::ApiResult;

/// Six bound parameters per row keeps each batch well under the Postgres limit
const INSERT_BATCH_SIZE: usize = 1000;

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Message contents, newest last
    async fn list_contents(&self) -> ApiResult<Vec<MessageContent>>;

    /// Insert all messages atomically, returning the number of rows written
    async fn insert_messages(&self, messages: &[Message]) -> ApiResult<u64>;
}

pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn list_contents(&self) -> ApiResult<Vec<MessageContent>> {
        let contents = sqlx::query_as::<_, MessageContent>(
            "SELECT id, title, file_name, created_at FROM saints_messages_content ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(contents)
    }

    async fn insert_messages(&self, messages: &[Message]) -> ApiResult<u64> {
        if messages.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for batch in messages.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO saints_messages (user_id, content_id, created_at, delivered_at, readed_at, campaign_id) ",
            );
            builder.push_values(batch, |mut row, message| {
                row.push_bind(message.user_id)
                    .push_bind(message.content_id)
                    .push_bind(message.created_at)
                    .push_bind(message.delivered_at)
                    .push_bind(message.read_at)
                    .push_bind(message.campaign_id.clone());
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

#[derive(Default)]
pub struct MemoryMessageStore {
    contents: RwLock<Vec<MessageContent>>,
    messages: RwLock<Vec<Message>>,
}

impl MemoryMessageStore {
    pub fn with_contents(contents: Vec<MessageContent>) -> Self {
        Self {
            contents: RwLock::new(contents),
            messages: RwLock::default(),
        }
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn list_contents(&self) -> ApiResult<Vec<MessageContent>> {
        let mut contents = self.contents.read().await.clone();
        contents.sort_by_key(|c| c.id);
        Ok(contents)
    }

    async fn insert_messages(&self, messages: &[Message]) -> ApiResult<u64> {
        self.messages.write().await.extend_from_slice(messages);
        Ok(messages.len() as u64)
    }
}
