use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_products_table::Migration),
            Box::new(m20240101_000002_create_customers_table::Migration),
            Box::new(m20240101_000003_create_customer_orders_table::Migration),
            Box::new(m20240101_000004_create_order_lines_table::Migration),
            Box::new(m20240101_000005_create_work_centers_table::Migration),
            Box::new(m20240101_000006_create_production_orders_table::Migration),
            Box::new(m20240101_000007_create_operations_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Sku).string().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).string().null())
                        .col(
                            ColumnDef::new(Products::UnitPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::OnHand)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MinimumStockLevel)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::LeadTimeDays)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_products_sku")
                        .table(Products::Table)
                        .col(Products::Sku)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Sku,
        Name,
        Description,
        UnitPrice,
        OnHand,
        MinimumStockLevel,
        LeadTimeDays,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_customers_email")
                        .table(Customers::Table)
                        .col(Customers::Email)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        Name,
        Email,
        Phone,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_customer_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_customer_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CustomerOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomerOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerOrders::OrderNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomerOrders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(CustomerOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(CustomerOrders::OrderDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerOrders::RequiredDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerOrders::TotalAmount)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(CustomerOrders::Notes).string().null())
                        .col(
                            ColumnDef::new(CustomerOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomerOrders::UpdatedAt).timestamp().null())
                        .col(
                            ColumnDef::new(CustomerOrders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            // Order numbers are allocated read-then-increment; the unique index
            // is what makes the retry-on-conflict allocation safe.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_customer_orders_order_number")
                        .table(CustomerOrders::Table)
                        .col(CustomerOrders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customer_orders_customer_id")
                        .table(CustomerOrders::Table)
                        .col(CustomerOrders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customer_orders_status")
                        .table(CustomerOrders::Table)
                        .col(CustomerOrders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customer_orders_created_at")
                        .table(CustomerOrders::Table)
                        .col(CustomerOrders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CustomerOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CustomerOrders {
        Table,
        Id,
        OrderNumber,
        CustomerId,
        Status,
        OrderDate,
        RequiredDate,
        TotalAmount,
        Notes,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20240101_000004_create_order_lines_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_order_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLines::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderLines::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderLines::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderLines::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(OrderLines::Status).string().not_null())
                        .col(ColumnDef::new(OrderLines::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(OrderLines::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_lines_order_id")
                        .table(OrderLines::Table)
                        .col(OrderLines::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_lines_product_id")
                        .table(OrderLines::Table)
                        .col(OrderLines::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderLines::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderLines {
        Table,
        Id,
        OrderId,
        ProductId,
        Quantity,
        UnitPrice,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_work_centers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_work_centers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(WorkCenters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WorkCenters::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkCenters::Name).string().not_null())
                        .col(ColumnDef::new(WorkCenters::Description).string().null())
                        .col(ColumnDef::new(WorkCenters::Status).string().not_null())
                        .col(
                            ColumnDef::new(WorkCenters::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WorkCenters::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_work_centers_status")
                        .table(WorkCenters::Table)
                        .col(WorkCenters::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkCenters::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum WorkCenters {
        Table,
        Id,
        Name,
        Description,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_production_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_production_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductionOrders::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::StartDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::DueDate).date().not_null())
                        .col(
                            ColumnDef::new(ProductionOrders::Priority)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(ProductionOrders::CustomerOrderId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::Notes).string().null())
                        .col(
                            ColumnDef::new(ProductionOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::UpdatedAt)
                                .timestamp()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_orders_product_id")
                        .table(ProductionOrders::Table)
                        .col(ProductionOrders::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_orders_customer_order_id")
                        .table(ProductionOrders::Table)
                        .col(ProductionOrders::CustomerOrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_orders_status")
                        .table(ProductionOrders::Table)
                        .col(ProductionOrders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProductionOrders {
        Table,
        Id,
        ProductId,
        Quantity,
        StartDate,
        DueDate,
        Priority,
        Status,
        CustomerOrderId,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000007_create_operations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_operations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Operations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Operations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Operations::ProductionOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Operations::WorkCenterId).uuid().not_null())
                        .col(ColumnDef::new(Operations::StartTime).timestamp().not_null())
                        .col(ColumnDef::new(Operations::EndTime).timestamp().not_null())
                        .col(
                            ColumnDef::new(Operations::Cost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Operations::Status).string().not_null())
                        .col(ColumnDef::new(Operations::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Operations::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_operations_production_order_id")
                        .table(Operations::Table)
                        .col(Operations::ProductionOrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Operations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Operations {
        Table,
        Id,
        ProductionOrderId,
        WorkCenterId,
        StartTime,
        EndTime,
        Cost,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}
