pub use super::attendance::Entity as Attendance;
pub use super::lesson_attendance::Entity as LessonAttendance;
pub use super::lessons::Entity as Lessons;
pub use super::member_packages::Entity as MemberPackages;
pub use super::members::Entity as Members;
