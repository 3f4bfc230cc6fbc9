use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "lessons")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub starts_at: TimeDateTimeWithTimeZone,
    pub capacity: i32,
    pub instructor: Option<String>,
    pub is_active: bool,
    pub created_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lesson_attendance::Entity")]
    LessonAttendance,
}

impl Related<super::lesson_attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LessonAttendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
