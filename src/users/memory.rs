//! In-process `UserStore` used by the handler tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::db::StoreError;
use crate::users::repo::UserStore;
use crate::users::repo_types::{Credentials, InsertResult, UserProfile};

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Clone, Copy)]
enum Behavior {
    #[default]
    Normal,
    TimingOut,
    Slow(Duration),
}

#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<StoredUser>>,
    behavior: Behavior,
}

impl MemoryUserStore {
    /// A store whose every call fails as a timed-out database would.
    pub fn timing_out() -> Self {
        Self {
            behavior: Behavior::TimingOut,
            ..Self::default()
        }
    }

    /// A store that answers every call only after `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self {
            behavior: Behavior::Slow(delay),
            ..Self::default()
        }
    }

    /// Writes a row as-is, bypassing registration.
    pub fn seed(self, email: &str, password: &str) -> Self {
        {
            let mut rows = self.rows.lock().expect("store lock");
            let id = rows.len() as i64 + 1;
            rows.push(StoredUser {
                id,
                email: email.to_string(),
                password: password.to_string(),
                created_at: OffsetDateTime::now_utc(),
            });
        }
        self
    }

    pub fn rows(&self) -> Vec<StoredUser> {
        self.rows.lock().expect("store lock").clone()
    }

    async fn check(&self) -> Result<(), StoreError> {
        match self.behavior {
            Behavior::Normal => Ok(()),
            Behavior::TimingOut => Err(StoreError::Timeout),
            Behavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_profiles(&self, id: i64) -> Result<Vec<UserProfile>, StoreError> {
        self.check().await?;
        let rows = self.rows.lock().expect("store lock");
        Ok(rows
            .iter()
            .filter(|u| u.id == id)
            .map(|u| UserProfile {
                id: u.id,
                email: u.email.clone(),
                created_at: u.created_at,
            })
            .collect())
    }

    async fn find_credentials(&self, id: i64) -> Result<Option<Credentials>, StoreError> {
        self.check().await?;
        let rows = self.rows.lock().expect("store lock");
        Ok(rows.iter().find(|u| u.id == id).map(|u| Credentials {
            id: u.id,
            email: u.email.clone(),
            password_hash: u.password.clone(),
        }))
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<InsertResult, StoreError> {
        self.check().await?;
        // check-and-insert under one lock, like the unique index does
        let mut rows = self.rows.lock().expect("store lock");
        if rows.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let id = rows.len() as i64 + 1;
        rows.push(StoredUser {
            id,
            email: email.to_string(),
            password: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(InsertResult {
            insert_id: id,
            affected_rows: 1,
        })
    }
}
