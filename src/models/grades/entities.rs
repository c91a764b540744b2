use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 单项成绩：某学生在某班级中某成绩组成项的得分
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeRecord {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub component_id: i64,
    pub value: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 成绩变更审计
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeAudit {
    pub id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub student_id: i64,
    /// 为空表示最终成绩调整
    pub component_id: Option<i64>,
    pub changed_by: Option<i64>,
    pub old_value: Option<f64>,
    pub new_value: Option<f64>,
    pub message: String,
    pub changed_at: chrono::DateTime<chrono::Utc>,
}

// 最终成绩（计算值与人工调整值）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct FinalGrade {
    pub class_id: i64,
    pub subject_id: i64,
    pub student_id: i64,
    pub computed_value: Option<f64>,
    pub adjusted_value: Option<f64>,
    pub use_adjusted: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl FinalGrade {
    /// 实际生效的最终成绩
    pub fn effective_value(&self) -> Option<f64> {
        if self.use_adjusted {
            self.adjusted_value.or(self.computed_value)
        } else {
            self.computed_value
        }
    }
}

/// 写入成绩后的结果
#[derive(Debug, Clone)]
pub struct GradeWriteOutcome {
    pub record: GradeRecord,
    pub previous_value: Option<f64>,
    /// 重新计算后的最终成绩
    pub final_grade: Option<f64>,
}
