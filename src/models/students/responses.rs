use serde::Serialize;
use ts_rs::TS;

// 导入时的单行错误
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct ImportRowError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

// 导入结果
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentImportResponse {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub enrolled: usize,
    pub failed: usize,
    pub errors: Vec<ImportRowError>,
}
