use serde::Deserialize;
use validator::Validate;

/// Request to schedule a lesson
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub starts_at: time::OffsetDateTime,

    #[validate(range(min = 1, max = 100))]
    pub capacity: i32,

    #[validate(length(max = 100))]
    pub instructor: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLessonRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    pub starts_at: Option<time::OffsetDateTime>,

    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,

    #[validate(length(max = 100))]
    pub instructor: Option<String>,

    pub is_active: Option<bool>,
}
