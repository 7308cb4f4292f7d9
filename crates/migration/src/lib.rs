//! Migrator registering the ShareIt tables in foreign-key order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240501_000001_create_user;
mod m20240501_000002_create_item_request;
mod m20240501_000003_create_item;
mod m20240501_000004_create_booking;
mod m20240501_000005_create_comment;
mod m20240501_000006_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240501_000001_create_user::Migration),
            Box::new(m20240501_000002_create_item_request::Migration),
            Box::new(m20240501_000003_create_item::Migration),
            Box::new(m20240501_000004_create_booking::Migration),
            Box::new(m20240501_000005_create_comment::Migration),
            // Indexes should always be applied last
            Box::new(m20240501_000006_add_indexes::Migration),
        ]
    }
}
