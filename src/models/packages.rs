use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to purchase or queue a lesson package
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePackageRequest {
    #[validate(length(min = 1, max = 100))]
    pub package_name: String,

    /// Explicit credit count; when omitted it is parsed from the package
    /// name ("Grup8" carries 8 lessons)
    #[validate(range(min = 1))]
    pub lesson_count: Option<i32>,
}

impl PurchasePackageRequest {
    pub fn resolve_lesson_count(&self) -> Option<i32> {
        self.lesson_count
            .or_else(|| lesson_count_from_name(&self.package_name))
    }
}

/// Parse the credit count from a package name's trailing digits
pub fn lesson_count_from_name(name: &str) -> Option<i32> {
    let digits: String = name
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    match digits.parse::<i32>() {
        Ok(count) if count > 0 => Some(count),
        _ => None,
    }
}

/// Response for the administrative waiting-package activation call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResponse {
    pub activated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<entity::member_packages::Model>,
}
