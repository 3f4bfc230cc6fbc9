use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lessons::Table)
                    .if_not_exists()
                    .col(pk_auto(Lessons::Id))
                    .col(string(Lessons::Name).not_null())
                    .col(timestamp_with_time_zone(Lessons::StartsAt).not_null())
                    .col(integer(Lessons::Capacity).default(0).not_null())
                    .col(string_null(Lessons::Instructor))
                    .col(boolean(Lessons::IsActive).default(true).not_null())
                    .col(
                        timestamp_with_time_zone(Lessons::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create unique index on name + starts_at (duplicate lesson guard)
        manager
            .create_index(
                Index::create()
                    .name("idx_lessons_name_starts_at")
                    .table(Lessons::Table)
                    .col(Lessons::Name)
                    .col(Lessons::StartsAt)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lessons_starts_at")
                    .table(Lessons::Table)
                    .col(Lessons::StartsAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lessons::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Lessons {
    Table,
    Id,
    Name,
    StartsAt,
    Capacity,
    Instructor,
    IsActive,
    CreatedAt,
}
