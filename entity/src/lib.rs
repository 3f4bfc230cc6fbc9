pub mod prelude;

pub mod attendance;
pub mod lesson_attendance;
pub mod lessons;
pub mod member_packages;
pub mod members;
