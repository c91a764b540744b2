use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 成绩组成项（如 P1、T1），缩写在学科内唯一
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/component.ts")]
pub struct GradeComponent {
    pub id: i64,
    pub subject_id: i64,
    pub name: String,
    pub abbreviation: String,
    pub description: Option<String>,
    pub weight: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
