//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod classes;
mod components;
mod courses;
mod grades;
mod institutions;
mod password_resets;
mod students;
mod subjects;
mod users;

#[cfg(test)]
mod tests;

use crate::config::AppConfig;
use crate::errors::{NotaDezError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::with_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(storage)
    }

    /// 使用已建立的连接，并运行迁移
    pub async fn with_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| NotaDezError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| NotaDezError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "268435456")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| NotaDezError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| NotaDezError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(NotaDezError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    PaginatedResponse,
    auth::PasswordResetToken,
    classes::{
        entities::Class,
        requests::{ClassListParams, CreateClassRequest, UpdateClassRequest},
    },
    components::{
        entities::GradeComponent,
        requests::{CreateComponentRequest, UpdateComponentRequest},
    },
    courses::{
        entities::Course,
        requests::{CourseListParams, CreateCourseRequest, UpdateCourseRequest},
    },
    grades::{
        entities::{FinalGrade, GradeAudit, GradeRecord, GradeWriteOutcome},
        requests::{AdjustFinalGradeRequest, DeleteGradeRequest, GradeAuditListParams, SaveGradeRequest},
    },
    institutions::{
        entities::Institution,
        requests::{
            CreateInstitutionRequest, InstitutionListParams, OnboardingRequest,
            UpdateInstitutionRequest,
        },
        responses::OnboardingResponse,
    },
    students::{
        entities::Student,
        requests::{CreateStudentRequest, ImportStudentRow, StudentListParams, UpdateStudentRequest},
        responses::StudentImportResponse,
    },
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, SubjectListParams, UpdateSubjectRequest},
    },
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::{OwnedResource, Storage};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    // 密码重置模块
    async fn create_password_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: i64,
    ) -> Result<i64> {
        self.create_password_reset_token_impl(user_id, token_hash, expires_at)
            .await
    }

    async fn get_password_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>> {
        self.get_password_reset_token_impl(token_hash).await
    }

    async fn mark_password_reset_token_used(&self, token_id: i64) -> Result<bool> {
        self.mark_password_reset_token_used_impl(token_id).await
    }

    async fn delete_password_reset_token(&self, token_id: i64) -> Result<bool> {
        self.delete_password_reset_token_impl(token_id).await
    }

    async fn reset_password_with_token(
        &self,
        token_id: i64,
        user_id: i64,
        password_hash: &str,
    ) -> Result<()> {
        self.reset_password_with_token_impl(token_id, user_id, password_hash)
            .await
    }

    async fn resolve_owner(&self, resource: OwnedResource, id: i64) -> Result<Option<i64>> {
        self.resolve_owner_impl(resource, id).await
    }

    // 机构模块
    async fn create_institution(
        &self,
        user_id: i64,
        req: CreateInstitutionRequest,
    ) -> Result<Institution> {
        self.create_institution_impl(user_id, req).await
    }

    async fn get_institution_by_id(&self, id: i64) -> Result<Option<Institution>> {
        self.get_institution_by_id_impl(id).await
    }

    async fn list_institutions_with_pagination(
        &self,
        user_id: i64,
        params: InstitutionListParams,
    ) -> Result<PaginatedResponse<Institution>> {
        self.list_institutions_with_pagination_impl(user_id, params)
            .await
    }

    async fn update_institution(
        &self,
        id: i64,
        update: UpdateInstitutionRequest,
    ) -> Result<Option<Institution>> {
        self.update_institution_impl(id, update).await
    }

    async fn delete_institution(&self, id: i64) -> Result<bool> {
        self.delete_institution_impl(id).await
    }

    async fn onboard(&self, user_id: i64, req: OnboardingRequest) -> Result<OnboardingResponse> {
        self.onboard_impl(user_id, req).await
    }

    // 课程模块
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(req).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses_with_pagination(
        &self,
        user_id: i64,
        params: CourseListParams,
    ) -> Result<PaginatedResponse<Course>> {
        self.list_courses_with_pagination_impl(user_id, params).await
    }

    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    // 学科模块
    async fn create_subject(&self, req: CreateSubjectRequest) -> Result<Subject> {
        self.create_subject_impl(req).await
    }

    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>> {
        self.get_subject_by_id_impl(id).await
    }

    async fn list_subjects_with_pagination(
        &self,
        user_id: i64,
        params: SubjectListParams,
    ) -> Result<PaginatedResponse<Subject>> {
        self.list_subjects_with_pagination_impl(user_id, params)
            .await
    }

    async fn update_subject(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        self.update_subject_impl(id, update).await
    }

    async fn update_subject_formula(
        &self,
        id: i64,
        formula: Option<String>,
    ) -> Result<Option<Subject>> {
        self.update_subject_formula_impl(id, formula).await
    }

    async fn delete_subject(&self, id: i64) -> Result<bool> {
        self.delete_subject_impl(id).await
    }

    // 班级模块
    async fn create_class(&self, req: CreateClassRequest) -> Result<Class> {
        self.create_class_impl(req).await
    }

    async fn get_class_by_id(&self, id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(id).await
    }

    async fn list_classes_with_pagination(
        &self,
        user_id: i64,
        params: ClassListParams,
    ) -> Result<PaginatedResponse<Class>> {
        self.list_classes_with_pagination_impl(user_id, params).await
    }

    async fn update_class(&self, id: i64, update: UpdateClassRequest) -> Result<Option<Class>> {
        self.update_class_impl(id, update).await
    }

    async fn delete_class(&self, id: i64) -> Result<bool> {
        self.delete_class_impl(id).await
    }

    async fn link_class_subject(&self, class_id: i64, subject_id: i64) -> Result<()> {
        self.link_class_subject_impl(class_id, subject_id).await
    }

    async fn unlink_class_subject(&self, class_id: i64, subject_id: i64) -> Result<bool> {
        self.unlink_class_subject_impl(class_id, subject_id).await
    }

    async fn list_class_subjects(&self, class_id: i64) -> Result<Vec<Subject>> {
        self.list_class_subjects_impl(class_id).await
    }

    async fn is_subject_linked(&self, class_id: i64, subject_id: i64) -> Result<bool> {
        self.is_subject_linked_impl(class_id, subject_id).await
    }

    async fn enroll_student(&self, class_id: i64, student_id: i64) -> Result<()> {
        self.enroll_student_impl(class_id, student_id).await
    }

    async fn unenroll_student(&self, class_id: i64, student_id: i64) -> Result<bool> {
        self.unenroll_student_impl(class_id, student_id).await
    }

    async fn list_class_students(&self, class_id: i64) -> Result<Vec<Student>> {
        self.list_class_students_impl(class_id).await
    }

    async fn is_student_enrolled(&self, class_id: i64, student_id: i64) -> Result<bool> {
        self.is_student_enrolled_impl(class_id, student_id).await
    }

    // 学生模块
    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(req).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_registration(&self, registration: &str) -> Result<Option<Student>> {
        self.get_student_by_registration_impl(registration).await
    }

    async fn list_students_with_pagination(
        &self,
        params: StudentListParams,
    ) -> Result<PaginatedResponse<Student>> {
        self.list_students_with_pagination_impl(params).await
    }

    async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
    ) -> Result<Option<Student>> {
        self.update_student_impl(id, update).await
    }

    async fn delete_student(&self, id: i64) -> Result<bool> {
        self.delete_student_impl(id).await
    }

    async fn import_students(
        &self,
        rows: Vec<ImportStudentRow>,
        class_id: Option<i64>,
    ) -> Result<StudentImportResponse> {
        self.import_students_impl(rows, class_id).await
    }

    // 成绩组成项模块
    async fn create_component(&self, req: CreateComponentRequest) -> Result<GradeComponent> {
        self.create_component_impl(req).await
    }

    async fn get_component_by_id(&self, id: i64) -> Result<Option<GradeComponent>> {
        self.get_component_by_id_impl(id).await
    }

    async fn list_components(&self, subject_id: i64) -> Result<Vec<GradeComponent>> {
        self.list_components_impl(subject_id).await
    }

    async fn update_component(
        &self,
        id: i64,
        update: UpdateComponentRequest,
    ) -> Result<Option<GradeComponent>> {
        self.update_component_impl(id, update).await
    }

    async fn delete_component(&self, id: i64) -> Result<bool> {
        self.delete_component_impl(id).await
    }

    // 成绩模块
    async fn save_grade(
        &self,
        req: SaveGradeRequest,
        changed_by: i64,
    ) -> Result<GradeWriteOutcome> {
        self.save_grade_impl(req, changed_by).await
    }

    async fn delete_grade(
        &self,
        req: DeleteGradeRequest,
        changed_by: i64,
    ) -> Result<Option<f64>> {
        self.delete_grade_impl(req, changed_by).await
    }

    async fn list_grade_records(&self, class_id: i64, subject_id: i64) -> Result<Vec<GradeRecord>> {
        self.list_grade_records_impl(class_id, subject_id).await
    }

    async fn list_final_grades(&self, class_id: i64, subject_id: i64) -> Result<Vec<FinalGrade>> {
        self.list_final_grades_impl(class_id, subject_id).await
    }

    async fn adjust_final_grade(
        &self,
        req: AdjustFinalGradeRequest,
        changed_by: i64,
    ) -> Result<FinalGrade> {
        self.adjust_final_grade_impl(req, changed_by).await
    }

    async fn list_grade_audits_with_pagination(
        &self,
        params: GradeAuditListParams,
    ) -> Result<PaginatedResponse<GradeAudit>> {
        self.list_grade_audits_with_pagination_impl(params).await
    }
}
