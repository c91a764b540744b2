use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 机构实体，归属于创建它的用户
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/institution.ts")]
pub struct Institution {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
