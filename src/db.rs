use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::warn;

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    /// No connection could be acquired, so the statement was never sent.
    #[error("no database connection available")]
    Unavailable,
    #[error("database statement timed out")]
    Timeout,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Unavailable | StoreError::Timeout)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => StoreError::Unavailable,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            other => StoreError::Database(other),
        }
    }
}

/// Whether a statement may be sent a second time after it timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replay {
    /// Reads: retry on any timeout.
    Safe,
    /// Writes: retry only if the first attempt never reached the server.
    NotSent,
}

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(cfg.query_timeout)
        .connect(&cfg.url)
        .await
        .context("connect to database")
}

/// Runs `op` under `limit`, retrying once on timeout as allowed by `replay`.
pub async fn with_timeout<T, F, Fut>(limit: Duration, replay: Replay, mut op: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match attempt(limit, op()).await {
        Err(e) if may_retry(&e, replay) => {
            warn!(error = %e, "database timeout, retrying once");
            attempt(limit, op()).await
        }
        other => other,
    }
}

fn may_retry(e: &StoreError, replay: Replay) -> bool {
    match replay {
        Replay::Safe => e.is_timeout(),
        Replay::NotSent => matches!(e, StoreError::Unavailable),
    }
}

async fn attempt<T, Fut>(limit: Duration, fut: Fut) -> Result<T, StoreError>
where
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout),
    }
}
