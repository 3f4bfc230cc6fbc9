use serde::Serialize;

/// Result of the duplicate-package cleanup job
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub removed: u64,
}

/// Result of a retroactive package backfill
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillResponse {
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<entity::member_packages::Model>,
}
