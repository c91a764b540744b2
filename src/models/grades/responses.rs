use serde::Serialize;
use std::collections::BTreeMap;
use ts_rs::TS;

use super::entities::GradeRecord;
use crate::models::components::entities::GradeComponent;

// 成绩表中的一行（一个学生）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeBoardRow {
    pub student_id: i64,
    pub registration: String,
    pub name: String,
    /// 缩写 -> 成绩，未录入为 null
    pub grades: BTreeMap<String, Option<f64>>,
    pub final_grade: Option<f64>,
    pub adjusted_grade: Option<f64>,
    pub use_adjusted: bool,
}

impl GradeBoardRow {
    pub fn is_complete(&self) -> bool {
        self.grades.values().all(Option::is_some)
    }

    pub fn effective_grade(&self) -> Option<f64> {
        if self.use_adjusted {
            self.adjusted_grade.or(self.final_grade)
        } else {
            self.final_grade
        }
    }
}

// 班级 × 学科成绩表
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeBoardResponse {
    pub class_id: i64,
    pub subject_id: i64,
    pub formula: Option<String>,
    pub components: Vec<GradeComponent>,
    pub students: Vec<GradeBoardRow>,
    /// 所有学生的所有成绩都已录入
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct SaveGradeResponse {
    pub record: GradeRecord,
    pub previous_value: Option<f64>,
    pub final_grade: Option<f64>,
}
