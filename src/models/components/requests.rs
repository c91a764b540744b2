use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/component.ts")]
pub struct ComponentListParams {
    pub subject_id: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/component.ts")]
pub struct CreateComponentRequest {
    pub subject_id: i64,
    pub name: String,
    #[serde(alias = "sigla")]
    pub abbreviation: String,
    pub description: Option<String>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/component.ts")]
pub struct UpdateComponentRequest {
    pub name: Option<String>,
    #[serde(alias = "sigla")]
    pub abbreviation: Option<String>,
    pub description: Option<String>,
    pub weight: Option<f64>,
}
