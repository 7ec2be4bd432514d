use async_trait::async_trait;
use pieces_shared::User;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::error::ApiResult;
use crate::filters::{query, Conjunction};
use crate::pagination::PageWindow;

/// Record store for `saints_users`: conjoined predicates in, one page of users
/// ordered by id ascending out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn fetch_users(&self, conjunction: &Conjunction, window: &PageWindow) -> ApiResult<Vec<User>>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn fetch_users(&self, conjunction: &Conjunction, window: &PageWindow) -> ApiResult<Vec<User>> {
        let mut builder = query::select_users(conjunction, window);
        tracing::debug!(sql = builder.sql(), "fetching users");

        let users = builder.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn fetch_users(&self, conjunction: &Conjunction, window: &PageWindow) -> ApiResult<Vec<User>> {
        let users = self.users.read().await;

        let mut matched: Vec<User> = users.iter().filter(|u| conjunction.matches(u)).cloned().collect();
        matched.sort_by_key(|u| u.id);

        Ok(matched
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .collect())
    }
}
