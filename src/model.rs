//! The `Student` record.

use serde::{Deserialize, Serialize};

/// One student. `student_id` is caller-assigned and is the primary key.
///
/// JSON uses camelCase keys (`studentId`, `firstName`, ...); the `student` table uses
/// the snake_case field names as columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub degree: String,
    pub university: String,
}

impl Student {
    pub fn new(
        student_id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        degree: impl Into<String>,
        university: impl Into<String>,
    ) -> Self {
        Student {
            student_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            degree: degree.into(),
            university: university.into(),
        }
    }

    /// Same fields under another identity.
    pub fn with_id(self, student_id: i64) -> Self {
        Student { student_id, ..self }
    }
}
