use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VendorProfiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VendorProfiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(VendorProfiles::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(VendorProfiles::BusinessName).string().null())
                    .col(ColumnDef::new(VendorProfiles::ServiceType).string().not_null())
                    .col(ColumnDef::new(VendorProfiles::Description).text().null())
                    .col(ColumnDef::new(VendorProfiles::Address).string().not_null())
                    .col(ColumnDef::new(VendorProfiles::City).string().not_null())
                    .col(ColumnDef::new(VendorProfiles::State).string().not_null())
                    .col(ColumnDef::new(VendorProfiles::Lat).double().null())
                    .col(ColumnDef::new(VendorProfiles::Lon).double().null())
                    .col(ColumnDef::new(VendorProfiles::PricingTiers).json().not_null())
                    .col(ColumnDef::new(VendorProfiles::Availability).json().not_null())
                    .col(ColumnDef::new(VendorProfiles::Portfolio).json().not_null())
                    .col(ColumnDef::new(VendorProfiles::Reviews).json().not_null())
                    .col(ColumnDef::new(VendorProfiles::AverageRating).double().not_null().default(0.0))
                    .col(ColumnDef::new(VendorProfiles::TotalReviews).integer().not_null().default(0))
                    .col(ColumnDef::new(VendorProfiles::ContactPhone).string().null())
                    .col(ColumnDef::new(VendorProfiles::YearsOfExperience).integer().not_null().default(0))
                    .col(ColumnDef::new(VendorProfiles::ResponseTime).string().null())
                    .col(ColumnDef::new(VendorProfiles::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(VendorProfiles::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(VendorProfiles::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_vendor_profiles_active")
                    .table(VendorProfiles::Table)
                    .col(VendorProfiles::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VendorProfiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VendorProfiles {
    Table,
    Id,
    UserId,
    BusinessName,
    ServiceType,
    Description,
    Address,
    City,
    State,
    Lat,
    Lon,
    PricingTiers,
    Availability,
    Portfolio,
    Reviews,
    AverageRating,
    TotalReviews,
    ContactPhone,
    YearsOfExperience,
    ResponseTime,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
