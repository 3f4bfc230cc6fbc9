// Request/Response models
pub mod attendance;
pub mod common;
pub mod lessons;
pub mod maintenance;
pub mod member_packages_ext; // Extension methods for entity::member_packages
pub mod members;
pub mod packages;
