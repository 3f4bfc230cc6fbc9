use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create lesson_attendance table
        manager
            .create_table(
                Table::create()
                    .table(LessonAttendance::Table)
                    .if_not_exists()
                    .col(pk_auto(LessonAttendance::Id))
                    .col(integer(LessonAttendance::MemberId).not_null())
                    .col(integer(LessonAttendance::LessonId).not_null())
                    .col(date(LessonAttendance::LessonDate).not_null())
                    .col(boolean(LessonAttendance::Attended).not_null())
                    .col(string(LessonAttendance::Kind).not_null())
                    .col(integer_null(LessonAttendance::PackageId))
                    .col(string_null(LessonAttendance::PackageName))
                    .col(string_null(LessonAttendance::Notes))
                    .col(
                        timestamp_with_time_zone(LessonAttendance::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lesson_attendance_member_id")
                            .from(LessonAttendance::Table, LessonAttendance::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lesson_attendance_lesson_id")
                            .from(LessonAttendance::Table, LessonAttendance::LessonId)
                            .to(Lessons::Table, Lessons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create unique index on member_id + lesson_id + lesson_date
        manager
            .create_index(
                Index::create()
                    .name("idx_lesson_attendance_member_lesson_date")
                    .table(LessonAttendance::Table)
                    .col(LessonAttendance::MemberId)
                    .col(LessonAttendance::LessonId)
                    .col(LessonAttendance::LessonDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lesson_attendance_member_id")
                    .table(LessonAttendance::Table)
                    .col(LessonAttendance::MemberId)
                    .to_owned(),
            )
            .await?;

        // Create attendance table (generic check-in log)
        manager
            .create_table(
                Table::create()
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(pk_auto(Attendance::Id))
                    .col(integer(Attendance::MemberId).not_null())
                    .col(
                        timestamp_with_time_zone(Attendance::CheckInTime)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone_null(Attendance::CheckOutTime))
                    .col(string_null(Attendance::Notes))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_member_id")
                            .from(Attendance::Table, Attendance::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_member_id")
                    .table(Attendance::Table)
                    .col(Attendance::MemberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attendance::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LessonAttendance::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LessonAttendance {
    Table,
    Id,
    MemberId,
    LessonId,
    LessonDate,
    Attended,
    Kind,
    PackageId,
    PackageName,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Attendance {
    Table,
    Id,
    MemberId,
    CheckInTime,
    CheckOutTime,
    Notes,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Lessons {
    Table,
    Id,
}
