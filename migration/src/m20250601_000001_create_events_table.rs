use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per transaction signature
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Signature)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::EventType).text().not_null())
                    .col(ColumnDef::new(Events::User).text().not_null())
                    // u64 bit pattern, see EventRepository
                    .col(ColumnDef::new(Events::Amount).big_integer().null())
                    .col(ColumnDef::new(Events::BlockTime).big_integer().null())
                    .col(
                        ColumnDef::new(Events::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Stats queries count by type
        manager
            .create_index(
                Index::create()
                    .name("idx_events_event_type")
                    .table(Events::Table)
                    .col(Events::EventType)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Recent events are listed newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_events_timestamp")
                    .table(Events::Table)
                    .col(Events::Timestamp)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

/// Events table definition
#[derive(Iden)]
enum Events {
    Table,
    Signature,
    EventType,
    User,
    Amount,
    BlockTime,
    Timestamp,
}
