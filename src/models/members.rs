use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to register a new member
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(length(max = 30))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,
}

/// Request to update a member's profile fields; counters are owned by the
/// ledger and cannot be set here
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,

    #[validate(length(max = 30))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub is_active: Option<bool>,
}

/// Query string for member listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersQuery {
    pub active: Option<bool>,
}

/// Member with their packages and recent lesson history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetailResponse {
    pub member: entity::members::Model,
    pub packages: Vec<entity::member_packages::Model>,
    pub recent_attendance: Vec<entity::lesson_attendance::Model>,
}
