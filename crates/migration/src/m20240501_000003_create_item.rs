//! Create `item` table with FK to its owner and, optionally, the request it answers.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Item::Table)
                    .if_not_exists()
                    .col(big_integer(Item::Id).auto_increment().primary_key())
                    .col(string_len(Item::Name, 255))
                    .col(string_len(Item::Description, 1000))
                    .col(boolean(Item::Available))
                    .col(big_integer(Item::OwnerId))
                    .col(big_integer_null(Item::RequestId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_owner")
                            .from(Item::Table, Item::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_request")
                            .from(Item::Table, Item::RequestId)
                            .to(ItemRequest::Table, ItemRequest::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Item::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Item { Table, Id, Name, Description, Available, OwnerId, RequestId }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum ItemRequest { Table, Id }
