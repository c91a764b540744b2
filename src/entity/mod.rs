//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod class_subjects;
pub mod classes;
pub mod courses;
pub mod enrollments;
pub mod final_grades;
pub mod grade_audits;
pub mod grade_components;
pub mod grade_records;
pub mod institutions;
pub mod password_reset_tokens;
pub mod students;
pub mod subjects;
pub mod users;

use chrono::{DateTime, Utc};

/// Unix 秒时间戳转换为 UTC 时间
pub(crate) fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
