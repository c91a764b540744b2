use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

// 机构列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/institution.ts")]
pub struct InstitutionListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/institution.ts")]
pub struct CreateInstitutionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/institution.ts")]
pub struct UpdateInstitutionRequest {
    pub name: Option<String>,
}

// 首次使用：一次性创建机构与课程
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/institution.ts")]
pub struct OnboardingRequest {
    pub institution_name: String,
    pub course_name: String,
}
