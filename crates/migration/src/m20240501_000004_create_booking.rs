//! Create `booking` table. `start_date`/`end_date` avoid the reserved `end`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(big_integer(Booking::Id).auto_increment().primary_key())
                    .col(date_time(Booking::StartDate))
                    .col(date_time(Booking::EndDate))
                    .col(big_integer(Booking::ItemId))
                    .col(big_integer(Booking::BookerId))
                    .col(string_len(Booking::Status, 16))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_item")
                            .from(Booking::Table, Booking::ItemId)
                            .to(Item::Table, Item::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_booker")
                            .from(Booking::Table, Booking::BookerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking { Table, Id, StartDate, EndDate, ItemId, BookerId, Status }

#[derive(DeriveIden)]
enum Item { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
