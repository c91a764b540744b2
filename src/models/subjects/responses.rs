use serde::Serialize;
use ts_rs::TS;

// 公式校验结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subject.ts")]
pub struct FormulaValidationResponse {
    pub valid: bool,
    /// 公式中缺少的成绩组成项缩写
    pub missing: Vec<String>,
    /// 公式中引用了但不存在的标识符
    pub unknown: Vec<String>,
    pub message: Option<String>,
}
