//! HTTP handlers for student CRUD and service health.

pub mod common;
pub mod student;
pub use common::*;
pub use student::*;
