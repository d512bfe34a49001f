//! In-process repository. Same contract as the PostgreSQL one; used where no database is available.

use super::StudentRepository;
use crate::error::AppError;
use crate::model::Student;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Default)]
pub struct MemoryStudentRepository {
    rows: Arc<RwLock<BTreeMap<i64, Student>>>,
}

impl MemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<i64, Student>> {
        self.rows.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<i64, Student>> {
        self.rows.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StudentRepository for MemoryStudentRepository {
    async fn save(&self, student: &Student) -> Result<Student, AppError> {
        self.write().insert(student.student_id, student.clone());
        Ok(student.clone())
    }

    async fn insert(&self, student: &Student) -> Result<Student, AppError> {
        let mut rows = self.write();
        if rows.contains_key(&student.student_id) {
            return Err(AppError::Conflict(format!(
                "student {} already exists",
                student.student_id
            )));
        }
        rows.insert(student.student_id, student.clone());
        Ok(student.clone())
    }

    async fn find_by_id(&self, student_id: i64) -> Result<Option<Student>, AppError> {
        Ok(self.read().get(&student_id).cloned())
    }

    async fn delete_by_id(&self, student_id: i64) -> Result<bool, AppError> {
        Ok(self.write().remove(&student_id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let mut rows = self.write();
        let n = rows.len() as u64;
        rows.clear();
        Ok(n)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, last: &str) -> Student {
        Student::new(id, "Satish", last, "s.kumar@leedsbeckett.ac.uk", "PhD", "Leeds Beckett University")
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let repo = MemoryStudentRepository::new();
        let s = student(111, "Kumar");
        repo.save(&s).await.unwrap();
        assert_eq!(repo.find_by_id(111).await.unwrap(), Some(s));
        assert_eq!(repo.find_by_id(112).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_replaces_same_id() {
        let repo = MemoryStudentRepository::new();
        repo.save(&student(111, "Kumar")).await.unwrap();
        repo.save(&student(111, "Malik")).await.unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find_by_id(111).await.unwrap().unwrap().last_name, "Malik");
    }

    #[tokio::test]
    async fn insert_rejects_existing_id() {
        let repo = MemoryStudentRepository::new();
        repo.insert(&student(111, "Kumar")).await.unwrap();
        let err = repo.insert(&student(111, "Malik")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.find_by_id(111).await.unwrap().unwrap().last_name, "Kumar");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = MemoryStudentRepository::new();
        repo.save(&student(111, "Kumar")).await.unwrap();
        assert!(repo.delete_by_id(111).await.unwrap());
        assert!(!repo.delete_by_id(111).await.unwrap());
        repo.insert(&student(111, "Kumar")).await.unwrap();
        assert_eq!(repo.delete_all().await.unwrap(), 1);
        assert!(repo.is_empty());
    }
}
