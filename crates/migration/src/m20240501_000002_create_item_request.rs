use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItemRequest::Table)
                    .if_not_exists()
                    .col(big_integer(ItemRequest::Id).auto_increment().primary_key())
                    .col(string_len(ItemRequest::Description, 1000))
                    .col(big_integer(ItemRequest::RequesterId))
                    .col(date_time(ItemRequest::Created))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_request_requester")
                            .from(ItemRequest::Table, ItemRequest::RequesterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ItemRequest::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ItemRequest { Table, Id, Description, RequesterId, Created }

#[derive(DeriveIden)]
enum User { Table, Id }
