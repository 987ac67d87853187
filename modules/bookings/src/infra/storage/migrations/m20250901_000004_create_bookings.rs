use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::UserId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::VendorId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::EventId).uuid().null())
                    .col(ColumnDef::new(Bookings::ServiceDate).date().not_null())
                    .col(ColumnDef::new(Bookings::ServiceType).string().not_null())
                    .col(ColumnDef::new(Bookings::SelectedPackage).json().not_null())
                    .col(ColumnDef::new(Bookings::BaseAmount).double().not_null())
                    .col(ColumnDef::new(Bookings::TaxAmount).double().not_null())
                    .col(ColumnDef::new(Bookings::DiscountAmount).double().not_null().default(0.0))
                    .col(ColumnDef::new(Bookings::TotalAmount).double().not_null())
                    .col(ColumnDef::new(Bookings::Currency).string_len(3).not_null().default("INR"))
                    .col(ColumnDef::new(Bookings::PaymentStatus).string().not_null().default("pending"))
                    .col(ColumnDef::new(Bookings::PaymentMethod).string().null())
                    .col(ColumnDef::new(Bookings::AdvancePayment).json().null())
                    .col(ColumnDef::new(Bookings::FinalPayment).json().null())
                    .col(ColumnDef::new(Bookings::PaymentHistory).json().not_null())
                    .col(ColumnDef::new(Bookings::VendorProgress).string().not_null().default("not_started"))
                    .col(ColumnDef::new(Bookings::ProgressUpdates).json().not_null())
                    .col(ColumnDef::new(Bookings::BookingStatus).string().not_null().default("pending"))
                    .col(ColumnDef::new(Bookings::NumberOfGuests).integer().null())
                    .col(ColumnDef::new(Bookings::Venue).string().null())
                    .col(ColumnDef::new(Bookings::SpecialRequests).text().null())
                    .col(ColumnDef::new(Bookings::CancellationReason).text().null())
                    .col(ColumnDef::new(Bookings::CancelledAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Bookings::CancelledBy).uuid().null())
                    .col(ColumnDef::new(Bookings::RefundAmount).double().null())
                    .col(ColumnDef::new(Bookings::WorkProgress).small_integer().not_null().default(0))
                    .col(ColumnDef::new(Bookings::ConfirmedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Bookings::CompletedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Bookings::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Bookings::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_user")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_vendor")
                    .table(Bookings::Table)
                    .col(Bookings::VendorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VendorPayments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VendorPayments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(VendorPayments::BookingId).uuid().not_null())
                    .col(ColumnDef::new(VendorPayments::UserId).uuid().not_null())
                    .col(ColumnDef::new(VendorPayments::VendorId).uuid().not_null())
                    .col(ColumnDef::new(VendorPayments::Amount).double().not_null())
                    .col(ColumnDef::new(VendorPayments::PaymentType).string().not_null())
                    .col(ColumnDef::new(VendorPayments::Method).string().not_null().default("online"))
                    .col(ColumnDef::new(VendorPayments::Status).string().not_null().default("completed"))
                    .col(ColumnDef::new(VendorPayments::TransactionId).string().null())
                    .col(ColumnDef::new(VendorPayments::Notes).text().null())
                    .col(ColumnDef::new(VendorPayments::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(VendorPayments::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_vendor_payments_booking")
                    .table(VendorPayments::Table)
                    .col(VendorPayments::BookingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VendorPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    UserId,
    VendorId,
    EventId,
    ServiceDate,
    ServiceType,
    SelectedPackage,
    BaseAmount,
    TaxAmount,
    DiscountAmount,
    TotalAmount,
    Currency,
    PaymentStatus,
    PaymentMethod,
    AdvancePayment,
    FinalPayment,
    PaymentHistory,
    VendorProgress,
    ProgressUpdates,
    BookingStatus,
    NumberOfGuests,
    Venue,
    SpecialRequests,
    CancellationReason,
    CancelledAt,
    CancelledBy,
    RefundAmount,
    WorkProgress,
    ConfirmedAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VendorPayments {
    Table,
    Id,
    BookingId,
    UserId,
    VendorId,
    Amount,
    PaymentType,
    Method,
    Status,
    TransactionId,
    Notes,
    CreatedAt,
    UpdatedAt,
}
