use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

/// 归属于用户的资源（通过 机构 -> 课程 -> 学科/班级 -> 组成项 链路）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedResource {
    Institution,
    Course,
    Subject,
    Class,
    Component,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;

    /// 密码重置
    async fn create_password_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: i64,
    ) -> Result<i64>;
    async fn get_password_reset_token(&self, token_hash: &str)
    -> Result<Option<PasswordResetToken>>;
    async fn mark_password_reset_token_used(&self, token_id: i64) -> Result<bool>;
    async fn delete_password_reset_token(&self, token_id: i64) -> Result<bool>;
    // 更新密码并作废令牌（同一事务）
    async fn reset_password_with_token(
        &self,
        token_id: i64,
        user_id: i64,
        password_hash: &str,
    ) -> Result<()>;

    /// 资源归属：返回资源所属用户 ID，资源不存在时为 None
    async fn resolve_owner(&self, resource: OwnedResource, id: i64) -> Result<Option<i64>>;

    /// 机构管理方法
    async fn create_institution(
        &self,
        user_id: i64,
        req: CreateInstitutionRequest,
    ) -> Result<Institution>;
    async fn get_institution_by_id(&self, id: i64) -> Result<Option<Institution>>;
    async fn list_institutions_with_pagination(
        &self,
        user_id: i64,
        params: InstitutionListParams,
    ) -> Result<PaginatedResponse<Institution>>;
    async fn update_institution(
        &self,
        id: i64,
        update: UpdateInstitutionRequest,
    ) -> Result<Option<Institution>>;
    async fn delete_institution(&self, id: i64) -> Result<bool>;
    // 首次使用引导：机构（按名称复用）+ 课程
    async fn onboard(&self, user_id: i64, req: OnboardingRequest) -> Result<OnboardingResponse>;

    /// 课程管理方法
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        user_id: i64,
        params: CourseListParams,
    ) -> Result<PaginatedResponse<Course>>;
    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;

    /// 学科管理方法
    async fn create_subject(&self, req: CreateSubjectRequest) -> Result<Subject>;
    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>>;
    async fn list_subjects_with_pagination(
        &self,
        user_id: i64,
        params: SubjectListParams,
    ) -> Result<PaginatedResponse<Subject>>;
    async fn update_subject(&self, id: i64, update: UpdateSubjectRequest)
    -> Result<Option<Subject>>;
    // 设置或清除公式
    async fn update_subject_formula(
        &self,
        id: i64,
        formula: Option<String>,
    ) -> Result<Option<Subject>>;
    async fn delete_subject(&self, id: i64) -> Result<bool>;

    /// 班级管理方法
    async fn create_class(&self, req: CreateClassRequest) -> Result<Class>;
    async fn get_class_by_id(&self, id: i64) -> Result<Option<Class>>;
    async fn list_classes_with_pagination(
        &self,
        user_id: i64,
        params: ClassListParams,
    ) -> Result<PaginatedResponse<Class>>;
    async fn update_class(&self, id: i64, update: UpdateClassRequest) -> Result<Option<Class>>;
    async fn delete_class(&self, id: i64) -> Result<bool>;

    /// 班级-学科关联
    async fn link_class_subject(&self, class_id: i64, subject_id: i64) -> Result<()>;
    async fn unlink_class_subject(&self, class_id: i64, subject_id: i64) -> Result<bool>;
    async fn list_class_subjects(&self, class_id: i64) -> Result<Vec<Subject>>;
    async fn is_subject_linked(&self, class_id: i64, subject_id: i64) -> Result<bool>;

    /// 选课（班级-学生）
    async fn enroll_student(&self, class_id: i64, student_id: i64) -> Result<()>;
    async fn unenroll_student(&self, class_id: i64, student_id: i64) -> Result<bool>;
    // 按姓名排序
    async fn list_class_students(&self, class_id: i64) -> Result<Vec<Student>>;
    async fn is_student_enrolled(&self, class_id: i64, student_id: i64) -> Result<bool>;

    /// 学生管理方法
    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_by_registration(&self, registration: &str) -> Result<Option<Student>>;
    async fn list_students_with_pagination(
        &self,
        params: StudentListParams,
    ) -> Result<PaginatedResponse<Student>>;
    async fn update_student(&self, id: i64, update: UpdateStudentRequest)
    -> Result<Option<Student>>;
    async fn delete_student(&self, id: i64) -> Result<bool>;
    // 批量导入（按学号 upsert，可选加入班级），同一事务
    async fn import_students(
        &self,
        rows: Vec<ImportStudentRow>,
        class_id: Option<i64>,
    ) -> Result<StudentImportResponse>;

    /// 成绩组成项
    async fn create_component(&self, req: CreateComponentRequest) -> Result<GradeComponent>;
    async fn get_component_by_id(&self, id: i64) -> Result<Option<GradeComponent>>;
    // 按缩写排序
    async fn list_components(&self, subject_id: i64) -> Result<Vec<GradeComponent>>;
    async fn update_component(
        &self,
        id: i64,
        update: UpdateComponentRequest,
    ) -> Result<Option<GradeComponent>>;
    async fn delete_component(&self, id: i64) -> Result<bool>;

    /// 成绩
    // 录入成绩 + 审计 + 重新计算最终成绩，同一事务
    async fn save_grade(&self, req: SaveGradeRequest, changed_by: i64)
    -> Result<GradeWriteOutcome>;
    // 删除成绩，返回删除前的值；不存在时为 None
    async fn delete_grade(&self, req: DeleteGradeRequest, changed_by: i64)
    -> Result<Option<f64>>;
    async fn list_grade_records(&self, class_id: i64, subject_id: i64) -> Result<Vec<GradeRecord>>;
    async fn list_final_grades(&self, class_id: i64, subject_id: i64) -> Result<Vec<FinalGrade>>;
    async fn adjust_final_grade(
        &self,
        req: AdjustFinalGradeRequest,
        changed_by: i64,
    ) -> Result<FinalGrade>;
    async fn list_grade_audits_with_pagination(
        &self,
        params: GradeAuditListParams,
    ) -> Result<PaginatedResponse<GradeAudit>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
