use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::{with_timeout, Replay, StoreError};
use crate::users::repo_types::{Credentials, InsertResult, UserProfile};

/// Storage collaborator for the user handlers.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All rows matching `id`; empty when there is none.
    async fn find_profiles(&self, id: i64) -> Result<Vec<UserProfile>, StoreError>;
    async fn find_credentials(&self, id: i64) -> Result<Option<Credentials>, StoreError>;
    async fn insert(&self, email: &str, password_hash: &str) -> Result<InsertResult, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
    query_timeout: Duration,
}

impl PgUserStore {
    pub fn new(db: PgPool, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_profiles(&self, id: i64) -> Result<Vec<UserProfile>, StoreError> {
        with_timeout(self.query_timeout, Replay::Safe, || {
            sqlx::query_as::<_, UserProfile>(
                r#"
                SELECT id, email, created_at
                FROM "user"
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_all(&self.db)
        })
        .await
    }

    async fn find_credentials(&self, id: i64) -> Result<Option<Credentials>, StoreError> {
        with_timeout(self.query_timeout, Replay::Safe, || {
            sqlx::query_as::<_, Credentials>(
                r#"
                SELECT id, email, password
                FROM "user"
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.db)
        })
        .await
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<InsertResult, StoreError> {
        let insert_id = with_timeout(self.query_timeout, Replay::NotSent, || {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO "user" (email, password)
                VALUES ($1, $2)
                RETURNING id
                "#,
            )
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.db)
        })
        .await?;

        Ok(InsertResult {
            insert_id,
            affected_rows: 1,
        })
    }
}
