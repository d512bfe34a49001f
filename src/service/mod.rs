//! StudentService: pass-through from handlers to the repository.

mod student;
pub use student::StudentService;
