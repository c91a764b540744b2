use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::{PaginationQuery, pagination::deserialize_optional_i64};

// 录入或修改一项成绩
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct SaveGradeRequest {
    pub class_id: i64,
    pub subject_id: i64,
    pub student_id: i64,
    pub component_id: i64,
    #[serde(alias = "nota")]
    pub value: f64,
}

// 删除一项成绩；subject_id 省略时取组成项所属学科
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct DeleteGradeRequest {
    pub class_id: i64,
    #[serde(default)]
    pub subject_id: Option<i64>,
    pub student_id: i64,
    pub component_id: i64,
}

// 成绩表 / 导出参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeBoardParams {
    pub class_id: i64,
    pub subject_id: i64,
}

// 人工调整最终成绩
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct AdjustFinalGradeRequest {
    pub class_id: i64,
    pub subject_id: i64,
    pub student_id: i64,
    pub adjusted_value: Option<f64>,
    #[serde(default)]
    pub use_adjusted: bool,
}

// 审计日志查询
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeAuditListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub subject_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub student_id: Option<i64>,
}
