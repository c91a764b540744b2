use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

// 学生列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    /// 按姓名或学号模糊搜索
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct CreateStudentRequest {
    #[serde(alias = "matricula")]
    pub registration: String,
    #[serde(alias = "nome")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct UpdateStudentRequest {
    #[serde(alias = "matricula")]
    pub registration: Option<String>,
    #[serde(alias = "nome")]
    pub name: Option<String>,
}

// 批量导入中的一行
#[derive(Debug, Clone, PartialEq, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct ImportStudentRow {
    #[serde(alias = "identificador")]
    pub registration: String,
    #[serde(alias = "nome")]
    pub name: String,
}

// JSON 批量导入
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct ImportStudentsRequest {
    #[serde(default, alias = "turma_id")]
    pub class_id: Option<i64>,
    #[serde(alias = "alunos")]
    pub students: Vec<ImportStudentRow>,
}
