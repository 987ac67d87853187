use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Events::Name).string().not_null())
                    .col(ColumnDef::new(Events::Date).date().not_null())
                    .col(ColumnDef::new(Events::Time).time().null())
                    .col(ColumnDef::new(Events::Location).string().not_null())
                    .col(ColumnDef::new(Events::EventType).string().null())
                    .col(ColumnDef::new(Events::Description).text().null())
                    .col(ColumnDef::new(Events::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Events::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_owner")
                    .table(Events::Table)
                    .col(Events::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Guests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Guests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Guests::EventId).uuid().not_null())
                    .col(ColumnDef::new(Guests::Name).string().not_null())
                    .col(ColumnDef::new(Guests::Email).string().not_null())
                    .col(ColumnDef::new(Guests::RsvpStatus).string().not_null().default("pending"))
                    .col(ColumnDef::new(Guests::InvitedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Guests::RespondedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Guests::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_guests_event")
                    .table(Guests::Table)
                    .col(Guests::EventId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_guests_email")
                    .table(Guests::Table)
                    .col(Guests::Email)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventBudgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventBudgets::EventId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(EventBudgets::TotalBudget).double().not_null())
                    .col(ColumnDef::new(EventBudgets::Expenses).json().not_null())
                    .col(ColumnDef::new(EventBudgets::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventBudgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Guests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    OwnerId,
    Name,
    Date,
    Time,
    Location,
    EventType,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
    EventId,
    Name,
    Email,
    RsvpStatus,
    InvitedAt,
    RespondedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EventBudgets {
    Table,
    EventId,
    TotalBudget,
    Expenses,
    UpdatedAt,
}
