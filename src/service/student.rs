//! Student operations over a `StudentRepository`.

use crate::error::AppError;
use crate::model::Student;
use crate::store::StudentRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct StudentService {
    repo: Arc<dyn StudentRepository>,
}

impl StudentService {
    pub fn new(repo: Arc<dyn StudentRepository>) -> Self {
        StudentService { repo }
    }

    /// Insert or replace.
    pub async fn save_student(&self, student: Student) -> Result<Student, AppError> {
        tracing::debug!(student_id = student.student_id, "save student");
        self.repo.save(&student).await
    }

    /// Insert a new student; an existing id is a conflict.
    pub async fn create_student(&self, student: Student) -> Result<Student, AppError> {
        let row = self.repo.insert(&student).await?;
        tracing::info!(student_id = row.student_id, "student created");
        Ok(row)
    }

    pub async fn get_student_by_id(&self, student_id: i64) -> Result<Student, AppError> {
        tracing::debug!(student_id, "get student");
        self.repo
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| not_found(student_id))
    }

    /// Replace every field of an existing student. The identity always comes from `student_id`,
    /// whatever the body carries.
    pub async fn update_student_by_id(&self, student_id: i64, student: Student) -> Result<Student, AppError> {
        let existing = self.get_student_by_id(student_id).await?;
        if student.student_id != existing.student_id {
            tracing::debug!(
                student_id,
                body_id = student.student_id,
                "ignoring id in update body"
            );
        }
        let row = self.repo.save(&student.with_id(existing.student_id)).await?;
        tracing::info!(student_id, "student updated");
        Ok(row)
    }

    pub async fn delete_student_by_id(&self, student_id: i64) -> Result<(), AppError> {
        if !self.repo.delete_by_id(student_id).await? {
            return Err(not_found(student_id));
        }
        tracing::info!(student_id, "student deleted");
        Ok(())
    }

    pub async fn delete_all_students(&self) -> Result<u64, AppError> {
        let n = self.repo.delete_all().await?;
        tracing::debug!(removed = n, "students cleared");
        Ok(n)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        tracing::trace!("ping repository");
        self.repo.ping().await
    }
}

fn not_found(student_id: i64) -> AppError {
    AppError::NotFound(format!("student {}", student_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStudentRepository;

    fn service() -> StudentService {
        StudentService::new(Arc::new(MemoryStudentRepository::new()))
    }

    fn satish() -> Student {
        Student::new(
            111,
            "Satish",
            "Kumar",
            "s.kumar@leedsbeckett.ac.uk",
            "PhD",
            "Leeds Beckett University",
        )
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn get_logs_student_id() {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(out.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let svc = service();
        svc.save_student(satish()).await.unwrap();
        svc.get_student_by_id(111).await.unwrap();

        let logged = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("get student"), "{}", logged);
        assert!(logged.contains("student_id=111"), "{}", logged);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let err = service().get_student_by_id(111).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_keeps_path_id() {
        let svc = service();
        svc.save_student(satish()).await.unwrap();
        let body = Student::new(999, "Satish", "Malik", "satish@bham.ac.uk", "PhD", "University of Birmingham");
        let row = svc.update_student_by_id(111, body).await.unwrap();
        assert_eq!(row.student_id, 111);
        assert_eq!(row.last_name, "Malik");
        assert!(matches!(svc.get_student_by_id(999).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let err = service().update_student_by_id(111, satish()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_twice_then_recreate() {
        let svc = service();
        svc.save_student(satish()).await.unwrap();
        svc.delete_student_by_id(111).await.unwrap();
        assert!(matches!(svc.delete_student_by_id(111).await, Err(AppError::NotFound(_))));
        let row = svc.create_student(satish()).await.unwrap();
        assert_eq!(row, satish());
    }

    #[tokio::test]
    async fn create_duplicate_conflicts() {
        let svc = service();
        svc.create_student(satish()).await.unwrap();
        let err = svc.create_student(satish()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
