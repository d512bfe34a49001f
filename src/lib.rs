//! Student service: REST CRUD for a single `Student` entity backed by PostgreSQL.

pub mod config;
pub mod error;
pub mod model;
pub mod state;
pub mod store;
pub mod service;
pub mod handlers;
pub mod routes;
#[cfg(feature = "testing")]
pub mod testing;

pub use config::ServiceConfig;
pub use error::{AppError, ConfigError};
pub use model::Student;
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_student_table, MemoryStudentRepository, PgStudentRepository, StudentRepository};
pub use routes::{app, common_routes_with_ready, student_routes};
pub use service::StudentService;
