use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Item: owner listing
        manager
            .create_index(
                Index::create()
                    .name("idx_item_owner")
                    .table(Item::Table)
                    .col(Item::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Item: items answering a request
        manager
            .create_index(
                Index::create()
                    .name("idx_item_request")
                    .table(Item::Table)
                    .col(Item::RequestId)
                    .to_owned(),
            )
            .await?;

        // Booking: booker listing ordered by start
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_booker_start")
                    .table(Booking::Table)
                    .col(Booking::BookerId)
                    .col(Booking::StartDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_item")
                    .table(Booking::Table)
                    .col(Booking::ItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_item")
                    .table(Comment::Table)
                    .col(Comment::ItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_item_request_requester")
                    .table(ItemRequest::Table)
                    .col(ItemRequest::RequesterId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_item_owner").table(Item::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_item_request").table(Item::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_booker_start").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_item").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_comment_item").table(Comment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_item_request_requester").table(ItemRequest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Item { Table, OwnerId, RequestId }

#[derive(DeriveIden)]
enum Booking { Table, BookerId, StartDate, ItemId }

#[derive(DeriveIden)]
enum Comment { Table, ItemId }

#[derive(DeriveIden)]
enum ItemRequest { Table, RequesterId }
