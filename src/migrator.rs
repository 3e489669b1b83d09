use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_businesses_table::Migration),
            Box::new(m20240101_000002_create_employees_table::Migration),
            Box::new(m20240101_000003_create_suppliers_table::Migration),
            Box::new(m20240101_000004_create_products_table::Migration),
            Box::new(m20240101_000005_create_orders_tables::Migration),
            Box::new(m20240101_000006_create_customers_table::Migration),
            Box::new(m20240101_000007_create_sales_table::Migration),
            Box::new(m20240101_000008_create_balances_table::Migration),
        ]
    }
}

/// Plain single-column index.
fn column_index<T, C>(name: &str, table: T, column: C) -> IndexCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    Index::create()
        .if_not_exists()
        .name(name)
        .table(table)
        .col(column)
        .to_owned()
}

mod m20240101_000001_create_businesses_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_businesses_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Businesses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Businesses::BusinessId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Businesses::Username)
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Businesses::PasswordHash).string().not_null())
                        .col(
                            ColumnDef::new(Businesses::BusinessName)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Businesses::Address).string().null())
                        .col(
                            ColumnDef::new(Businesses::CreationDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Businesses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Businesses {
        Table,
        BusinessId,
        Username,
        PasswordHash,
        BusinessName,
        Address,
        CreationDate,
    }
}

mod m20240101_000002_create_employees_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_employees_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::EmployeeId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Employees::BusinessId).integer().not_null())
                        .col(ColumnDef::new(Employees::FirstName).string().not_null())
                        .col(ColumnDef::new(Employees::LastName).string().not_null())
                        .col(ColumnDef::new(Employees::Email).string().null())
                        .col(ColumnDef::new(Employees::Phone).string().null())
                        .col(ColumnDef::new(Employees::Address).string().null())
                        .col(
                            ColumnDef::new(Employees::Salary)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Employees::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_employees_business_id",
                    Employees::Table,
                    Employees::BusinessId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        EmployeeId,
        BusinessId,
        FirstName,
        LastName,
        Email,
        Phone,
        Address,
        Salary,
        CreatedAt,
    }
}

mod m20240101_000003_create_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::SupplierId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Suppliers::BusinessId).integer().not_null())
                        .col(ColumnDef::new(Suppliers::SupplierName).string().not_null())
                        .col(ColumnDef::new(Suppliers::Email).string().null())
                        .col(ColumnDef::new(Suppliers::Phone).string().null())
                        .col(ColumnDef::new(Suppliers::Address).string().null())
                        .col(ColumnDef::new(Suppliers::SupplierCategory).string().null())
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_suppliers_business_id",
                    Suppliers::Table,
                    Suppliers::BusinessId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        SupplierId,
        BusinessId,
        SupplierName,
        Email,
        Phone,
        Address,
        SupplierCategory,
        CreatedAt,
    }
}

mod m20240101_000004_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_products_table"
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
                            ColumnDef::new(Products::ProductId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::BusinessId).integer().not_null())
                        .col(ColumnDef::new(Products::SupplierId).integer().null())
                        .col(ColumnDef::new(Products::CategoryName).string().null())
                        .col(ColumnDef::new(Products::ProductName).string().not_null())
                        .col(ColumnDef::new(Products::ProductDescription).text().null())
                        .col(
                            ColumnDef::new(Products::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::ReorderLevel)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::ReorderQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_products_business_id",
                    Products::Table,
                    Products::BusinessId,
                ))
                .await?;

            // Order placement looks products up by (business, name).
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_business_name")
                        .table(Products::Table)
                        .col(Products::BusinessId)
                        .col(Products::ProductName)
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
        ProductId,
        BusinessId,
        SupplierId,
        CategoryName,
        ProductName,
        ProductDescription,
        Quantity,
        ReorderLevel,
        ReorderQuantity,
        Price,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_orders_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_orders_tables"
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
                        .col(
                            ColumnDef::new(Orders::OrderId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::BusinessId).integer().not_null())
                        .col(ColumnDef::new(Orders::OrderDate).date().not_null())
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_orders_business_id",
                    Orders::Table,
                    Orders::BusinessId,
                ))
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderDetails::OrderDetailId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderDetails::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderDetails::ProductId).integer().not_null())
                        .col(ColumnDef::new(OrderDetails::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderDetails::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_order_details_order_id",
                    OrderDetails::Table,
                    OrderDetails::OrderId,
                ))
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_order_details_product_id",
                    OrderDetails::Table,
                    OrderDetails::ProductId,
                ))
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderSuppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderSuppliers::OrderSupplierId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderSuppliers::OrderId).integer().not_null())
                        .col(
                            ColumnDef::new(OrderSuppliers::SupplierId)
                                .integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_suppliers_order_id")
                        .table(OrderSuppliers::Table)
                        .col(OrderSuppliers::OrderId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_order_suppliers_supplier_id",
                    OrderSuppliers::Table,
                    OrderSuppliers::SupplierId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderSuppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderDetails::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        OrderId,
        BusinessId,
        OrderDate,
        TotalAmount,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderDetails {
        Table,
        OrderDetailId,
        OrderId,
        ProductId,
        Quantity,
        UnitPrice,
    }

    #[derive(DeriveIden)]
    enum OrderSuppliers {
        Table,
        OrderSupplierId,
        OrderId,
        SupplierId,
    }
}

mod m20240101_000006_create_customers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_customers_table"
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
                            ColumnDef::new(Customers::CustomerId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::BusinessId).integer().not_null())
                        .col(ColumnDef::new(Customers::FirstName).string().not_null())
                        .col(ColumnDef::new(Customers::LastName).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_customers_business_id",
                    Customers::Table,
                    Customers::BusinessId,
                ))
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
        CustomerId,
        BusinessId,
        FirstName,
        LastName,
        Email,
        Phone,
        Address,
        CreatedAt,
    }
}

mod m20240101_000007_create_sales_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_sales_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Sales::SaleId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Sales::BusinessId).integer().not_null())
                        .col(ColumnDef::new(Sales::ProductId).integer().not_null())
                        .col(ColumnDef::new(Sales::CustomerId).integer().null())
                        .col(ColumnDef::new(Sales::Quantity).integer().not_null())
                        .col(ColumnDef::new(Sales::UnitPrice).decimal_len(12, 2).not_null())
                        .col(
                            ColumnDef::new(Sales::TotalAmount)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Sales::PaymentDetails).string().not_null())
                        .col(
                            ColumnDef::new(Sales::SaleDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_sales_business_id",
                    Sales::Table,
                    Sales::BusinessId,
                ))
                .await?;

            manager
                .create_index(super::column_index(
                    "idx_sales_product_id",
                    Sales::Table,
                    Sales::ProductId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Sales {
        Table,
        SaleId,
        BusinessId,
        ProductId,
        CustomerId,
        Quantity,
        UnitPrice,
        TotalAmount,
        PaymentDetails,
        SaleDate,
    }
}

mod m20240101_000008_create_balances_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_balances_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Balances::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Balances::BalanceId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Balances::BusinessId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Balances::Balance)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Balances::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Balances::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Balances {
        Table,
        BalanceId,
        BusinessId,
        Balance,
        UpdatedAt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm_migration::sea_orm::{
        sea_query::{Alias, SqliteQueryBuilder},
        ConnectOptions, Database,
    };

    #[test]
    fn column_index_targets_table_and_column() {
        let sql = column_index(
            "idx_products_business_id",
            Alias::new("products"),
            Alias::new("business_id"),
        )
        .to_string(SqliteQueryBuilder);

        assert!(sql.contains("IF NOT EXISTS"), "{sql}");
        assert!(sql.contains("\"idx_products_business_id\""), "{sql}");
        assert!(sql.contains("\"products\""), "{sql}");
        assert!(sql.contains("\"business_id\""), "{sql}");
    }

    #[tokio::test]
    async fn migrations_apply_and_roll_back() {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1);
        let db = Database::connect(opts).await.unwrap();

        Migrator::up(&db, None).await.unwrap();
        assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
        assert_eq!(Migrator::get_applied_migrations(&db).await.unwrap().len(), 8);

        Migrator::down(&db, None).await.unwrap();
        assert!(Migrator::get_applied_migrations(&db).await.unwrap().is_empty());
    }
}
