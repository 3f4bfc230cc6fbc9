use crate::{
    config::Config,
    services::{
        AttendanceRecorder, CreditLedger, LessonService, MemberService, PackageActivator,
        ReconciliationService,
    },
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub members: Arc<MemberService>,
    pub lessons: Arc<LessonService>,
    pub ledger: Arc<CreditLedger>,
    pub activator: Arc<PackageActivator>,
    pub recorder: Arc<AttendanceRecorder>,
    pub reconciliation: Arc<ReconciliationService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        // Connect to database
        let db = sea_orm::Database::connect(&config.database.url).await?;

        // Initialize services
        let members = Arc::new(MemberService::new(db.clone()));
        let lessons = Arc::new(LessonService::new(db.clone()));
        let ledger = Arc::new(CreditLedger::new(db.clone()));
        let activator = Arc::new(PackageActivator::new(db.clone()));
        let recorder = Arc::new(AttendanceRecorder::new(db.clone()));
        let reconciliation = Arc::new(ReconciliationService::new(db.clone()));

        Ok(Self {
            db,
            members,
            lessons,
            ledger,
            activator,
            recorder,
            reconciliation,
            config: Arc::new(config),
        })
    }
}
