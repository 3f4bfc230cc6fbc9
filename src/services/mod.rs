// Service modules
pub mod attendance_recorder;
pub mod credit_ledger;
pub mod lesson_service;
pub mod member_service;
pub mod package_activator;
pub mod reconciliation_service;

pub use attendance_recorder::AttendanceRecorder;
pub use credit_ledger::CreditLedger;
pub use lesson_service::LessonService;
pub use member_service::MemberService;
pub use package_activator::PackageActivator;
pub use reconciliation_service::ReconciliationService;
