//! Disposable PostgreSQL databases for tests.
//!
//! `EphemeralDatabase::create` makes a uniquely named database on the server behind
//! `TEST_DATABASE_URL`, creates the `student` table in it and connects a small pool.
//! `teardown` closes the pool and drops the database. `EphemeralDatabase::run` wraps a
//! test body so teardown happens on every exit path, including a panic inside the body.

use crate::error::AppError;
use crate::state::AppState;
use crate::store::{connect_options, drop_database, ensure_database_exists_with, ensure_student_table, PgStudentRepository};
use futures::FutureExt;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Env var naming the server that hosts ephemeral databases. Any database in the URL is ignored.
pub const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";

pub struct EphemeralDatabase {
    opts: PgConnectOptions,
    name: String,
    pool: PgPool,
}

impl EphemeralDatabase {
    /// `None` when `TEST_DATABASE_URL` is unset, so callers can skip.
    pub async fn from_env() -> Result<Option<Self>, AppError> {
        match dotenvy::var(TEST_DATABASE_URL) {
            Ok(url) if !url.trim().is_empty() => Ok(Some(Self::create(&url).await?)),
            _ => Ok(None),
        }
    }

    pub async fn create(server_url: &str) -> Result<Self, AppError> {
        let name = format!("student_test_{}", uuid::Uuid::new_v4().simple());
        let opts = connect_options(server_url)?.database(&name);
        ensure_database_exists_with(&opts).await?;
        let pool = match PgPoolOptions::new().max_connections(2).connect_with(opts.clone()).await {
            Ok(pool) => pool,
            Err(e) => {
                discard(&opts, &name).await;
                return Err(e.into());
            }
        };
        if let Err(e) = ensure_student_table(&pool).await {
            pool.close().await;
            discard(&opts, &name).await;
            return Err(e);
        }
        tracing::debug!(database = %name, "ephemeral database ready");
        Ok(EphemeralDatabase { opts, name, pool })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn repository(&self) -> PgStudentRepository {
        PgStudentRepository::new(self.pool.clone())
    }

    pub fn state(&self) -> AppState {
        AppState::new(Arc::new(self.repository()))
    }

    pub async fn teardown(self) -> Result<(), AppError> {
        self.pool.close().await;
        drop_database(&self.opts).await
    }

    /// Run `body` against a fresh database and always tear it down afterwards.
    /// A panic in `body` is re-raised after the database has been dropped.
    /// Returns `Ok(false)` without running `body` when `TEST_DATABASE_URL` is unset.
    pub async fn run<F, Fut>(body: F) -> Result<bool, AppError>
    where
        F: FnOnce(AppState, PgStudentRepository) -> Fut,
        Fut: Future<Output = ()>,
    {
        let Some(db) = Self::from_env().await? else {
            tracing::warn!("{} not set; skipping database test", TEST_DATABASE_URL);
            return Ok(false);
        };
        let outcome = AssertUnwindSafe(body(db.state(), db.repository()))
            .catch_unwind()
            .await;
        let name = db.name.clone();
        if let Err(e) = db.teardown().await {
            tracing::warn!(database = %name, error = %e, "ephemeral database teardown failed");
        }
        if let Err(panic) = outcome {
            std::panic::resume_unwind(panic);
        }
        Ok(true)
    }
}

async fn discard(opts: &PgConnectOptions, name: &str) {
    if let Err(e) = drop_database(opts).await {
        tracing::warn!(database = %name, error = %e, "ephemeral database cleanup failed");
    }
}
