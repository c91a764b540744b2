//! 学科实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub abbreviation: Option<String>,
    pub code: Option<String>,
    pub period: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub final_grade_formula: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::grade_components::Entity")]
    GradeComponents,
    #[sea_orm(has_many = "super::class_subjects::Entity")]
    ClassSubjects,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::grade_components::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeComponents.def()
    }
}

impl Related<super::class_subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSubjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_subject(self) -> crate::models::subjects::entities::Subject {
        use super::timestamp_to_datetime;
        use crate::models::subjects::entities::Subject;

        Subject {
            id: self.id,
            course_id: self.course_id,
            name: self.name,
            abbreviation: self.abbreviation,
            code: self.code,
            period: self.period,
            final_grade_formula: self.final_grade_formula,
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
