use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Carts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Carts::RecordId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Carts::CartId).string().not_null())
                    .col(ColumnDef::new(Carts::AlbumId).integer().not_null())
                    .col(ColumnDef::new(Carts::Count).integer().not_null())
                    .col(ColumnDef::new(Carts::DateCreated).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_carts_album_id")
                            .from(Carts::Table, Carts::AlbumId)
                            .to(Albums::Table, Albums::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One line item per (cart, album)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_carts_cart_id_album_id")
                    .table(Carts::Table)
                    .col(Carts::CartId)
                    .col(Carts::AlbumId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Carts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Carts {
    Table,
    RecordId,
    CartId,
    AlbumId,
    Count,
    DateCreated,
}

#[derive(DeriveIden)]
enum Albums {
    Table,
    Id,
}
