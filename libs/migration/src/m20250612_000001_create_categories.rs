use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string(Categories::Name))
                    .col(
                        timestamp_with_time_zone(Categories::CreatedDate)
                            .default(Expr::current_timestamp()),
                    )
                    .col(integer(Categories::Version).default(1))
                    .to_owned(),
            )
            .await?;

        // Names are unique ignoring case and surrounding whitespace
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_categories_name_lower ON categories (LOWER(BTRIM(name)))",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    CreatedDate,
    Version,
}
