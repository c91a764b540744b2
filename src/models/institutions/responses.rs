use serde::Serialize;
use ts_rs::TS;

use super::entities::Institution;
use crate::models::courses::entities::Course;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/institution.ts")]
pub struct OnboardingResponse {
    pub institution: Institution,
    pub course: Course,
    /// false 表示沿用了同名的已有机构
    pub institution_created: bool,
}
