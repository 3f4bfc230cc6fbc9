// Integration tests: run against a real database via DATABASE_URL

mod activation_test;
mod attendance_test;
mod race_condition_test;
mod reconciliation_test;
mod support;
