use serde::Serialize;
use ts_rs::TS;

use super::entities::Class;

// 创建班级结果；部分学科关联失败时附带警告
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassCreatedResponse {
    pub class: Class,
    pub linked_subject_ids: Vec<i64>,
    pub warnings: Vec<String>,
}
