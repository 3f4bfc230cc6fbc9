use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub total_lessons: i32,
    pub attended_count: i32,
    pub absent_count: i32,
    pub extra_count: i32,
    pub remaining_lessons: i32,
    pub membership_type: String,
    pub is_active: bool,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
    #[sea_orm(has_many = "super::lesson_attendance::Entity")]
    LessonAttendance,
    #[sea_orm(has_many = "super::member_packages::Entity")]
    MemberPackages,
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl Related<super::lesson_attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LessonAttendance.def()
    }
}

impl Related<super::member_packages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MemberPackages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
