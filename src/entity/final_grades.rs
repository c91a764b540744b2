//! 最终成绩实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "final_grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub student_id: i64,
    pub computed_value: Option<f64>,
    pub adjusted_value: Option<f64>,
    pub use_adjusted: bool,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_final_grade(self) -> crate::models::grades::entities::FinalGrade {
        use super::timestamp_to_datetime;
        use crate::models::grades::entities::FinalGrade;

        FinalGrade {
            class_id: self.class_id,
            subject_id: self.subject_id,
            student_id: self.student_id,
            computed_value: self.computed_value,
            adjusted_value: self.adjusted_value,
            use_adjusted: self.use_adjusted,
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
