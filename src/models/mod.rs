//! 业务数据模型
//!
//! 每个领域拆分为 entities / requests / responses，并通过 ts-rs 导出前端类型。

pub mod auth;
pub mod classes;
pub mod common;
pub mod components;
pub mod courses;
pub mod grades;
pub mod institutions;
pub mod students;
pub mod subjects;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 进程启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 健康检查响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: i64,
}

impl AppStartTime {
    pub fn uptime_seconds(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.start_datetime)
            .num_seconds()
    }
}

/// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用 1xxx
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,

    // 认证 2xxx
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserEmailInvalid = 2002,
    UserEmailAlreadyExists = 2003,
    UserPasswordInvalid = 2004,
    UserNotFound = 2005,
    ResetTokenInvalid = 2010,
    ResetTokenExpired = 2011,
    EmailSendFailed = 2012,

    // 机构与课程 3xxx
    InstitutionNotFound = 3000,
    InstitutionAlreadyExists = 3001,
    CourseNotFound = 3010,
    CourseAlreadyExists = 3011,

    // 学科与成绩组成 4xxx
    SubjectNotFound = 4000,
    SubjectNotInCourse = 4001,
    FormulaInvalid = 4010,
    FormulaIncomplete = 4011,
    ComponentNotFound = 4020,
    ComponentAlreadyExists = 4021,
    ComponentInUse = 4022,
    ComponentAbbreviationInvalid = 4023,

    // 班级与学生 5xxx
    ClassNotFound = 5000,
    ClassAlreadyExists = 5001,
    ClassSubjectNotLinked = 5002,
    StudentNotFound = 5010,
    StudentAlreadyExists = 5011,
    StudentAlreadyEnrolled = 5012,
    StudentNotEnrolled = 5013,

    // 导入导出与成绩 6xxx
    ImportFileDataInvalid = 6000,
    ImportFileParseFailed = 6001,
    FileUploadFailed = 6002,
    GradeValueInvalid = 6010,
    GradeNotFound = 6011,
    GradesIncomplete = 6012,
}
