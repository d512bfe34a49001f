//! Persistence gateway for students: the repository trait and its implementations.

mod memory;
mod postgres;
pub use memory::MemoryStudentRepository;
pub use postgres::{
    connect_options, drop_database, ensure_database_exists, ensure_database_exists_with, ensure_student_table,
    PgStudentRepository, STUDENT_TABLE,
};

use crate::error::AppError;
use crate::model::Student;
use async_trait::async_trait;

/// Durable storage of `Student` records keyed by `student_id`.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Insert, or replace the record with the same id. Returns the stored record.
    async fn save(&self, student: &Student) -> Result<Student, AppError>;

    /// Insert only; an existing id is `AppError::Conflict`.
    async fn insert(&self, student: &Student) -> Result<Student, AppError>;

    async fn find_by_id(&self, student_id: i64) -> Result<Option<Student>, AppError>;

    /// Returns whether a row was removed. A missing id is not an error.
    async fn delete_by_id(&self, student_id: i64) -> Result<bool, AppError>;

    /// Returns the number of rows removed.
    async fn delete_all(&self) -> Result<u64, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
