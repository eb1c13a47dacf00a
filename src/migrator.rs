use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_accounts_tables::Migration),
            Box::new(m20240101_000002_create_catalog_tables::Migration),
            Box::new(m20240101_000003_create_shipping_and_cart_tables::Migration),
            Box::new(m20240101_000004_create_discount_tables::Migration),
            Box::new(m20240101_000005_create_order_tables::Migration),
        ]
    }
}

mod m20240101_000001_create_accounts_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_accounts_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().null())
                        .col(
                            ColumnDef::new(Users::AuthProvider)
                                .string_len(20)
                                .not_null()
                                .default("local"),
                        )
                        .col(ColumnDef::new(Users::DisplayName).string().null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::UserId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_customers_user_id")
                                .from(Customers::Table, Customers::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::UserId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Employees::EmployeeName).string().not_null())
                        .col(
                            ColumnDef::new(Employees::IsAdmin)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Employees::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_employees_user_id")
                                .from(Employees::Table, Employees::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        AuthProvider,
        DisplayName,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        UserId,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        UserId,
        EmployeeName,
        IsAdmin,
        CreatedAt,
    }
}

mod m20240101_000002_create_catalog_tables {

    use super::m20240101_000001_create_accounts_tables::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Materials::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Materials::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Materials::DensityGCm3)
                                .decimal_len(10, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::PriceTwdG)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Materials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PrintingModels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PrintingModels::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PrintingModels::OwnerId).uuid().not_null())
                        .col(
                            ColumnDef::new(PrintingModels::ModelName)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PrintingModels::Description).text().null())
                        .col(ColumnDef::new(PrintingModels::Category).string().null())
                        .col(
                            ColumnDef::new(PrintingModels::VisibilityStatus)
                                .string_len(20)
                                .not_null()
                                .default("PRIVATE"),
                        )
                        .col(
                            ColumnDef::new(PrintingModels::StlFilePath)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PrintingModels::GcodeFilePath).string().null())
                        .col(ColumnDef::new(PrintingModels::SlicingInfo).json().null())
                        .col(
                            ColumnDef::new(PrintingModels::ViewCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PrintingModels::DownloadCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PrintingModels::IsFeatured)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PrintingModels::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PrintingModels::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_printing_models_owner_id")
                                .from(PrintingModels::Table, PrintingModels::OwnerId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_printing_models_visibility")
                        .table(PrintingModels::Table)
                        .col(PrintingModels::VisibilityStatus)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_printing_models_owner_id")
                        .table(PrintingModels::Table)
                        .col(PrintingModels::OwnerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ModelReviewLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ModelReviewLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ModelReviewLogs::ModelId).uuid().not_null())
                        .col(ColumnDef::new(ModelReviewLogs::ReviewerId).uuid().null())
                        .col(
                            ColumnDef::new(ModelReviewLogs::PreviousStatus)
                                .string_len(20)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ModelReviewLogs::NewStatus)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ModelReviewLogs::Reason).text().null())
                        .col(
                            ColumnDef::new(ModelReviewLogs::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_model_review_logs_model_id")
                                .from(ModelReviewLogs::Table, ModelReviewLogs::ModelId)
                                .to(PrintingModels::Table, PrintingModels::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_model_review_logs_reviewer_id")
                                .from(ModelReviewLogs::Table, ModelReviewLogs::ReviewerId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_model_review_logs_model_id")
                        .table(ModelReviewLogs::Table)
                        .col(ModelReviewLogs::ModelId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ModelReviewLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PrintingModels::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Materials {
        Table,
        Id,
        Name,
        #[sea_orm(iden = "density_g_cm3")]
        DensityGCm3,
        #[sea_orm(iden = "price_twd_g")]
        PriceTwdG,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum PrintingModels {
        Table,
        Id,
        OwnerId,
        ModelName,
        Description,
        Category,
        VisibilityStatus,
        StlFilePath,
        GcodeFilePath,
        SlicingInfo,
        ViewCount,
        DownloadCount,
        IsFeatured,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ModelReviewLogs {
        Table,
        Id,
        ModelId,
        ReviewerId,
        PreviousStatus,
        NewStatus,
        Reason,
        Timestamp,
    }
}

mod m20240101_000003_create_shipping_and_cart_tables {

    use super::m20240101_000001_create_accounts_tables::Customers;
    use super::m20240101_000002_create_catalog_tables::{Materials, PrintingModels};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_shipping_and_cart_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ShippingOptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ShippingOptions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::Name)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::ShippingType)
                                .string_len(30)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::BaseFee)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ShippingOptions::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SavedAddresses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SavedAddresses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SavedAddresses::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(SavedAddresses::Name)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SavedAddresses::AddressType)
                                .string_len(30)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SavedAddresses::AddressDetails)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SavedAddresses::IsDefault)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(SavedAddresses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SavedAddresses::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_saved_addresses_customer_id")
                                .from(SavedAddresses::Table, SavedAddresses::CustomerId)
                                .to(Customers::Table, Customers::UserId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_saved_addresses_customer_id")
                        .table(SavedAddresses::Table)
                        .col(SavedAddresses::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(CartItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(CartItems::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::ModelId).uuid().not_null())
                        .col(ColumnDef::new(CartItems::MaterialId).uuid().not_null())
                        .col(
                            ColumnDef::new(CartItems::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(CartItems::Notes).text().null())
                        .col(
                            ColumnDef::new(CartItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CartItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_customer_id")
                                .from(CartItems::Table, CartItems::CustomerId)
                                .to(Customers::Table, Customers::UserId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_model_id")
                                .from(CartItems::Table, CartItems::ModelId)
                                .to(PrintingModels::Table, PrintingModels::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_material_id")
                                .from(CartItems::Table, CartItems::MaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            // One line per (customer, model, material); adds merge quantities.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_cart_items_customer_model_material")
                        .table(CartItems::Table)
                        .col(CartItems::CustomerId)
                        .col(CartItems::ModelId)
                        .col(CartItems::MaterialId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SavedAddresses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ShippingOptions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ShippingOptions {
        Table,
        Id,
        Name,
        ShippingType,
        BaseFee,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SavedAddresses {
        Table,
        Id,
        CustomerId,
        Name,
        AddressType,
        AddressDetails,
        IsDefault,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CartItems {
        Table,
        Id,
        CustomerId,
        ModelId,
        MaterialId,
        Quantity,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_discount_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_discount_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Discounts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Discounts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Discounts::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Discounts::Description).text().null())
                        .col(
                            ColumnDef::new(Discounts::StartDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Discounts::DueDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Discounts::MinPrice)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Discounts::MaxDiscount)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(Discounts::WorksOn).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Discounts::IsFixed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Discounts::DisValue)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Discounts::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Discounts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Discounts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(GlobalDiscounts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GlobalDiscounts::DiscountId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GlobalDiscounts::Priority)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_global_discounts_discount_id")
                                .from(GlobalDiscounts::Table, GlobalDiscounts::DiscountId)
                                .to(Discounts::Table, Discounts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Coupons::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Coupons::DiscountId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Coupons::CouponCode)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Coupons::MaxUsesTotal).integer().null())
                        .col(
                            ColumnDef::new(Coupons::MaxUsesPerCustomer)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_coupons_discount_id")
                                .from(Coupons::Table, Coupons::DiscountId)
                                .to(Discounts::Table, Discounts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Coupons::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(GlobalDiscounts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Discounts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Discounts {
        Table,
        Id,
        Name,
        Description,
        StartDate,
        DueDate,
        MinPrice,
        MaxDiscount,
        WorksOn,
        IsFixed,
        DisValue,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum GlobalDiscounts {
        Table,
        DiscountId,
        Priority,
    }

    #[derive(DeriveIden)]
    pub(super) enum Coupons {
        Table,
        DiscountId,
        CouponCode,
        MaxUsesTotal,
        MaxUsesPerCustomer,
    }
}

mod m20240101_000005_create_order_tables {

    use super::m20240101_000001_create_accounts_tables::{Customers, Users};
    use super::m20240101_000002_create_catalog_tables::{Materials, PrintingModels};
    use super::m20240101_000004_create_discount_tables::{Coupons, GlobalDiscounts};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::AssigneeId).uuid().null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string_len(20)
                                .not_null()
                                .default("PENDING"),
                        )
                        .col(ColumnDef::new(Orders::ShipSnapshot).json().not_null())
                        .col(
                            ColumnDef::new(Orders::TotalPrice)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Notes).text().null())
                        .col(ColumnDef::new(Orders::TrackingNumber).string().null())
                        .col(
                            ColumnDef::new(Orders::CreationDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer_id")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::UserId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_assignee_id")
                                .from(Orders::Table, Orders::AssigneeId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ModelId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::MaterialId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ItemNumber).integer().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::PriceSnapshot)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::SlicingInfoSnapshot).json().null())
                        .col(ColumnDef::new(OrderItems::Notes).text().null())
                        .col(
                            ColumnDef::new(OrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_model_id")
                                .from(OrderItems::Table, OrderItems::ModelId)
                                .to(PrintingModels::Table, PrintingModels::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_material_id")
                                .from(OrderItems::Table, OrderItems::MaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_order_items_order_item_number")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .col(OrderItems::ItemNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderLogs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderLogs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrderLogs::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderLogs::UpdatedBy).uuid().not_null())
                        .col(ColumnDef::new(OrderLogs::PreviousStatus).string_len(20).null())
                        .col(ColumnDef::new(OrderLogs::NewStatus).string_len(20).not_null())
                        .col(ColumnDef::new(OrderLogs::Notes).text().null())
                        .col(
                            ColumnDef::new(OrderLogs::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_logs_order_id")
                                .from(OrderLogs::Table, OrderLogs::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_logs_order_id")
                        .table(OrderLogs::Table)
                        .col(OrderLogs::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(IsAffected::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(IsAffected::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(IsAffected::OrderId).uuid().not_null())
                        .col(ColumnDef::new(IsAffected::GlobalDiscountId).uuid().not_null())
                        .col(
                            ColumnDef::new(IsAffected::DiscountSnapshotInfo)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(IsAffected::DiscountAmount)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(IsAffected::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_is_affected_order_id")
                                .from(IsAffected::Table, IsAffected::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_is_affected_global_discount_id")
                                .from(IsAffected::Table, IsAffected::GlobalDiscountId)
                                .to(GlobalDiscounts::Table, GlobalDiscounts::DiscountId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_is_affected_order_discount")
                        .table(IsAffected::Table)
                        .col(IsAffected::OrderId)
                        .col(IsAffected::GlobalDiscountId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CouponRedemptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CouponRedemptions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CouponRedemptions::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(CouponRedemptions::CouponId).uuid().not_null())
                        .col(
                            ColumnDef::new(CouponRedemptions::OrderId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(CouponRedemptions::DiscountSnapshotInfo)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CouponRedemptions::DiscountAmount)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CouponRedemptions::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_coupon_redemptions_customer_id")
                                .from(CouponRedemptions::Table, CouponRedemptions::CustomerId)
                                .to(Customers::Table, Customers::UserId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_coupon_redemptions_coupon_id")
                                .from(CouponRedemptions::Table, CouponRedemptions::CouponId)
                                .to(Coupons::Table, Coupons::DiscountId)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_coupon_redemptions_order_id")
                                .from(CouponRedemptions::Table, CouponRedemptions::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_coupon_redemptions_coupon_customer")
                        .table(CouponRedemptions::Table)
                        .col(CouponRedemptions::CouponId)
                        .col(CouponRedemptions::CustomerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CouponRedemptions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(IsAffected::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        CustomerId,
        AssigneeId,
        Status,
        ShipSnapshot,
        TotalPrice,
        Notes,
        TrackingNumber,
        CreationDate,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ModelId,
        MaterialId,
        ItemNumber,
        Quantity,
        PriceSnapshot,
        SlicingInfoSnapshot,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderLogs {
        Table,
        Id,
        OrderId,
        UpdatedBy,
        PreviousStatus,
        NewStatus,
        Notes,
        Timestamp,
    }

    #[derive(DeriveIden)]
    enum IsAffected {
        Table,
        Id,
        OrderId,
        GlobalDiscountId,
        DiscountSnapshotInfo,
        DiscountAmount,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum CouponRedemptions {
        Table,
        Id,
        CustomerId,
        CouponId,
        OrderId,
        DiscountSnapshotInfo,
        DiscountAmount,
        Timestamp,
    }
}
