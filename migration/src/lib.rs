pub use sea_orm_migration::prelude::*;

mod m20250110_000001_create_members;
mod m20250110_000002_create_lessons;
mod m20250110_000003_create_member_packages;
mod m20250110_000004_create_attendance_tables;
mod m20250215_000001_add_absent_count;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250110_000001_create_members::Migration),
            Box::new(m20250110_000002_create_lessons::Migration),
            Box::new(m20250110_000003_create_member_packages::Migration),
            Box::new(m20250110_000004_create_attendance_tables::Migration),
            Box::new(m20250215_000001_add_absent_count::Migration),
        ]
    }
}
