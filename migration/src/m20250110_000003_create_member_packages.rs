use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MemberPackages::Table)
                    .if_not_exists()
                    .col(pk_auto(MemberPackages::Id))
                    .col(integer(MemberPackages::MemberId).not_null())
                    .col(string(MemberPackages::PackageName).not_null())
                    .col(integer(MemberPackages::LessonCount).not_null())
                    .col(integer(MemberPackages::RemainingLessons).not_null())
                    .col(boolean(MemberPackages::IsActive).default(false).not_null())
                    .col(
                        timestamp_with_time_zone(MemberPackages::PurchasedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_packages_member_id")
                            .from(MemberPackages::Table, MemberPackages::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on member_id
        manager
            .create_index(
                Index::create()
                    .name("idx_member_packages_member_id")
                    .table(MemberPackages::Table)
                    .col(MemberPackages::MemberId)
                    .to_owned(),
            )
            .await?;

        // FIFO scans filter by member and order by id; the balance scan
        // also filters on remaining_lessons
        manager
            .create_index(
                Index::create()
                    .name("idx_member_packages_member_remaining")
                    .table(MemberPackages::Table)
                    .col(MemberPackages::MemberId)
                    .col(MemberPackages::RemainingLessons)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MemberPackages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MemberPackages {
    Table,
    Id,
    MemberId,
    PackageName,
    LessonCount,
    RemainingLessons,
    IsActive,
    PurchasedAt,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
}
