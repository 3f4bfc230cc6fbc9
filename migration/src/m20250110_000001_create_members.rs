use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create members table (FIRST - other tables reference this)
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(pk_auto(Members::Id))
                    .col(string(Members::FirstName).not_null())
                    .col(string(Members::LastName).not_null())
                    .col(string_null(Members::Phone))
                    .col(string_null(Members::Email))
                    .col(integer(Members::TotalLessons).default(0).not_null())
                    .col(integer(Members::AttendedCount).default(0).not_null())
                    .col(integer(Members::ExtraCount).default(0).not_null())
                    .col(integer(Members::RemainingLessons).default(0).not_null())
                    .col(
                        string(Members::MembershipType)
                            .default("Paketsiz")
                            .not_null(),
                    )
                    .col(boolean(Members::IsActive).default(true).not_null())
                    .col(
                        timestamp_with_time_zone(Members::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Members::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create trigger function for updated_at
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;
                "#,
            )
            .await?;

        // Create trigger on members table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER update_members_updated_at
                BEFORE UPDATE ON members
                FOR EACH ROW
                EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        // Create indexes on members table
        manager
            .create_index(
                Index::create()
                    .name("idx_members_is_active")
                    .table(Members::Table)
                    .col(Members::IsActive)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_members_last_name")
                    .table(Members::Table)
                    .col(Members::LastName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;

        // Drop trigger function
        manager
            .get_connection()
            .execute_unprepared("DROP FUNCTION IF EXISTS update_updated_at_column() CASCADE;")
            .await?;

        Ok(())
    }
}

// Table definitions
#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    FirstName,
    LastName,
    Phone,
    Email,
    TotalLessons,
    AttendedCount,
    ExtraCount,
    RemainingLessons,
    MembershipType,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
