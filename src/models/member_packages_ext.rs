/// Extension methods for member_packages entity
use entity::member_packages;

/// Extension trait for MemberPackage model
pub trait MemberPackageExt {
    /// Credits consumed so far (lesson_count - remaining_lessons)
    fn consumed(&self) -> i32;

    /// Check if there are remaining credits
    fn has_remaining(&self) -> bool;

    /// A package with no balance left
    fn is_drained(&self) -> bool;
}

impl MemberPackageExt for member_packages::Model {
    fn consumed(&self) -> i32 {
        self.lesson_count - self.remaining_lessons
    }

    fn has_remaining(&self) -> bool {
        self.remaining_lessons > 0
    }

    fn is_drained(&self) -> bool {
        self.remaining_lessons == 0
    }
}
