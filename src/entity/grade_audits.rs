//! 成绩审计日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_audits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub student_id: i64,
    pub component_id: Option<i64>,
    pub changed_by: Option<i64>,
    pub old_value: Option<f64>,
    pub new_value: Option<f64>,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub changed_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_audit(self) -> crate::models::grades::entities::GradeAudit {
        use super::timestamp_to_datetime;
        use crate::models::grades::entities::GradeAudit;

        GradeAudit {
            id: self.id,
            class_id: self.class_id,
            subject_id: self.subject_id,
            student_id: self.student_id,
            component_id: self.component_id,
            changed_by: self.changed_by,
            old_value: self.old_value,
            new_value: self.new_value,
            message: self.message,
            changed_at: timestamp_to_datetime(self.changed_at),
        }
    }
}
