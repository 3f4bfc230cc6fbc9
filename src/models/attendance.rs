use serde::Deserialize;
use validator::Validate;

use super::common::LessonKind;

/// Request to record a lesson attendance event
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendanceRequest {
    pub member_id: i32,

    pub lesson_id: i32,

    pub lesson_date: time::Date,

    pub attended: bool,

    pub kind: LessonKind,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Request to edit a recorded attendance event; omitted fields keep their
/// stored values
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendanceRequest {
    pub attended: Option<bool>,

    pub kind: Option<LessonKind>,

    pub lesson_date: Option<time::Date>,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}
