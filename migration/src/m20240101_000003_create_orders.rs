use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Orders::OrderDate).timestamp().not_null())
                    .col(ColumnDef::new(Orders::Username).string().not_null())
                    .col(ColumnDef::new(Orders::FirstName).string().not_null())
                    .col(ColumnDef::new(Orders::LastName).string().not_null())
                    .col(ColumnDef::new(Orders::Address).string().not_null())
                    .col(ColumnDef::new(Orders::City).string().not_null())
                    .col(ColumnDef::new(Orders::State).string().not_null())
                    .col(ColumnDef::new(Orders::PostalCode).string().not_null())
                    .col(ColumnDef::new(Orders::Country).string().not_null())
                    .col(ColumnDef::new(Orders::Phone).string().not_null())
                    .col(ColumnDef::new(Orders::Email).string().not_null())
                    .col(ColumnDef::new(Orders::Total).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderDetails::OrderId).integer().not_null())
                    .col(ColumnDef::new(OrderDetails::AlbumId).integer().not_null())
                    .col(ColumnDef::new(OrderDetails::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(OrderDetails::UnitPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_details_order_id")
                            .from(OrderDetails::Table, OrderDetails::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_details_album_id")
                            .from(OrderDetails::Table, OrderDetails::AlbumId)
                            .to(Albums::Table, Albums::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_order_details_album_id")
                    .table(OrderDetails::Table)
                    .col(OrderDetails::AlbumId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_order_details_order_id")
                    .table(OrderDetails::Table)
                    .col(OrderDetails::OrderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(OrderDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderDate,
    Username,
    FirstName,
    LastName,
    Address,
    City,
    State,
    PostalCode,
    Country,
    Phone,
    Email,
    Total,
}

#[derive(DeriveIden)]
enum OrderDetails {
    Table,
    Id,
    OrderId,
    AlbumId,
    Quantity,
    UnitPrice,
}

#[derive(DeriveIden)]
enum Albums {
    Table,
    Id,
}
