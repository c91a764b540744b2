//! 成绩组成项实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_components")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub subject_id: i64,
    pub name: String,
    pub abbreviation: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub weight: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
    #[sea_orm(has_many = "super::grade_records::Entity")]
    GradeRecords,
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::grade_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_component(self) -> crate::models::components::entities::GradeComponent {
        use super::timestamp_to_datetime;
        use crate::models::components::entities::GradeComponent;

        GradeComponent {
            id: self.id,
            subject_id: self.subject_id,
            name: self.name,
            abbreviation: self.abbreviation,
            description: self.description,
            weight: self.weight,
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
