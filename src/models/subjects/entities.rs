use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学科实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subject.ts")]
pub struct Subject {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub abbreviation: Option<String>,
    pub code: Option<String>,
    pub period: Option<String>,
    /// 最终成绩公式，引用成绩组成项的缩写
    pub final_grade_formula: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Subject {
    /// 导出文件名中使用的学科标识
    pub fn file_label(&self) -> String {
        self.abbreviation
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}
