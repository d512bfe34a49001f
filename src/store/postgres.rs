//! PostgreSQL repository, `student` table DDL, and database bootstrap helpers.

use super::StudentRepository;
use crate::error::{AppError, ConfigError};
use crate::model::Student;
use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

pub const STUDENT_TABLE: &str = "student";

const MAINTENANCE_DATABASE: &str = "postgres";

const COLUMNS: &str = "student_id, first_name, last_name, email, degree, university";

/// Create the `student` table if it does not exist. Not a migration: the shape is fixed.
pub async fn ensure_student_table(pool: &PgPool) -> Result<(), AppError> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            student_id BIGINT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            degree TEXT NOT NULL,
            university TEXT NOT NULL
        )
        "#,
        STUDENT_TABLE
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

#[derive(Clone)]
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    pub fn new(pool: PgPool) -> Self {
        PgStudentRepository { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn save(&self, student: &Student) -> Result<Student, AppError> {
        let sql = format!(
            "INSERT INTO {STUDENT_TABLE} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (student_id) DO UPDATE SET \
             first_name = EXCLUDED.first_name, last_name = EXCLUDED.last_name, email = EXCLUDED.email, \
             degree = EXCLUDED.degree, university = EXCLUDED.university \
             RETURNING {COLUMNS}"
        );
        tracing::debug!(sql = %sql, student_id = student.student_id, "query");
        let row = bind_student(sqlx::query_as::<_, Student>(&sql), student)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, student: &Student) -> Result<Student, AppError> {
        let sql = format!(
            "INSERT INTO {STUDENT_TABLE} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        );
        tracing::debug!(sql = %sql, student_id = student.student_id, "query");
        bind_student(sqlx::query_as::<_, Student>(&sql), student)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    AppError::Conflict(format!("student {} already exists", student.student_id))
                }
                other => AppError::Db(other),
            })
    }

    async fn find_by_id(&self, student_id: i64) -> Result<Option<Student>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM {STUDENT_TABLE} WHERE student_id = $1");
        tracing::debug!(sql = %sql, student_id, "query");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_by_id(&self, student_id: i64) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {STUDENT_TABLE} WHERE student_id = $1");
        tracing::debug!(sql = %sql, student_id, "query");
        let res = sqlx::query(&sql).bind(student_id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {STUDENT_TABLE}");
        tracing::debug!(sql = %sql, "query");
        let res = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(res.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn bind_student<'q>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, Student, sqlx::postgres::PgArguments>,
    student: &'q Student,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Student, sqlx::postgres::PgArguments> {
    query
        .bind(student.student_id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(&student.degree)
        .bind(&student.university)
}

/// Parse a connection URL. Host, credentials and options are kept; the database may be absent.
pub fn connect_options(database_url: &str) -> Result<PgConnectOptions, AppError> {
    PgConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(ConfigError::Database(format!("invalid database url: {}", e))))
}

/// Same server and credentials, pointed at the `postgres` maintenance database.
pub(crate) fn admin_options(target: &PgConnectOptions) -> PgConnectOptions {
    target.clone().database(MAINTENANCE_DATABASE)
}

/// Database the options connect to, if one is named and it is not the maintenance database.
pub(crate) fn target_database(opts: &PgConnectOptions) -> Option<String> {
    opts.get_database()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != MAINTENANCE_DATABASE)
        .map(str::to_string)
}

/// Create the database named in `database_url` if missing. Connects to the `postgres` maintenance DB on the same server.
/// A URL without a database path is left alone.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    ensure_database_exists_with(&connect_options(database_url)?).await
}

pub async fn ensure_database_exists_with(opts: &PgConnectOptions) -> Result<(), AppError> {
    let Some(db_name) = target_database(opts) else {
        return Ok(());
    };
    let mut conn = admin_options(opts).connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Drop the database `opts` points at, terminating any sessions still attached to it.
pub async fn drop_database(opts: &PgConnectOptions) -> Result<(), AppError> {
    let db_name = target_database(opts).ok_or_else(|| {
        AppError::Config(ConfigError::Database(
            "refusing to drop the maintenance database".into(),
        ))
    })?;
    let mut conn = admin_options(opts).connect().await?;
    sqlx::query("SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = $1 AND pid <> pg_backend_pid()")
        .bind(&db_name)
        .execute(&mut conn)
        .await?;
    tracing::info!(database = %db_name, "dropping database");
    sqlx::query(&format!("DROP DATABASE IF EXISTS {}", quote_ident(&db_name)))
        .execute(&mut conn)
        .await?;
    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
