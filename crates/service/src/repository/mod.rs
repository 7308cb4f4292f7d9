//! Persistence abstraction, one trait per aggregate.
//!
//! Domain services hold `Arc<dyn …Repository>` so the same rules run against
//! SeaORM in production and the in-memory store in unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;

use models::booking::{BookingStatus, NewBooking};
use models::item::NewItem;
use models::{booking, comment, item, item_request, user};

use crate::errors::ServiceError;

pub mod memory;
pub mod seaorm;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken name or email surfaces as `Conflict`.
    async fn create(&self, name: &str, email: &str) -> Result<user::Model, ServiceError>;
    async fn find(&self, id: i64) -> Result<Option<user::Model>, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError>;
    async fn save(&self, user: user::Model) -> Result<user::Model, ServiceError>;
    /// Remove a user and everything that references it. Returns false if absent.
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;
    /// All users by id ascending.
    async fn list(&self) -> Result<Vec<user::Model>, ServiceError>;
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, new: NewItem) -> Result<item::Model, ServiceError>;
    async fn find(&self, id: i64) -> Result<Option<item::Model>, ServiceError>;
    async fn save(&self, item: item::Model) -> Result<item::Model, ServiceError>;
    /// Owner's items by id ascending.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<item::Model>, ServiceError>;
    /// Available items whose name or description contains `text`, ignoring case.
    async fn search_available(&self, text: &str) -> Result<Vec<item::Model>, ServiceError>;
    /// Items answering any of the given requests.
    async fn list_by_requests(&self, request_ids: &[i64]) -> Result<Vec<item::Model>, ServiceError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert in the WAITING state.
    async fn create(&self, new: NewBooking) -> Result<booking::Model, ServiceError>;
    async fn find(&self, id: i64) -> Result<Option<booking::Model>, ServiceError>;
    async fn set_status(&self, booking: booking::Model, status: BookingStatus) -> Result<booking::Model, ServiceError>;
    /// Bookings made by `booker_id`, start descending.
    async fn list_by_booker(&self, booker_id: i64) -> Result<Vec<booking::Model>, ServiceError>;
    /// Bookings on items owned by `owner_id`, start descending.
    async fn list_by_item_owner(&self, owner_id: i64) -> Result<Vec<booking::Model>, ServiceError>;
    /// Any APPROVED booking of `item_id` by `booker_id` that ended before `now`.
    async fn find_finished_approved(
        &self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> Result<Option<booking::Model>, ServiceError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, item_id: i64, author_id: i64, text: &str, created: NaiveDateTime) -> Result<comment::Model, ServiceError>;
    /// Comments on an item by id ascending.
    async fn list_by_item(&self, item_id: i64) -> Result<Vec<comment::Model>, ServiceError>;
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn create(&self, requester_id: i64, description: &str, created: NaiveDateTime) -> Result<item_request::Model, ServiceError>;
    async fn find(&self, id: i64) -> Result<Option<item_request::Model>, ServiceError>;
    /// Requests made by `requester_id`, created descending.
    async fn list_by_requester(&self, requester_id: i64) -> Result<Vec<item_request::Model>, ServiceError>;
    /// Requests made by anyone else, created descending.
    async fn list_excluding_requester(&self, requester_id: i64) -> Result<Vec<item_request::Model>, ServiceError>;
}

/// One handle per aggregate, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub requests: Arc<dyn RequestRepository>,
}

impl Repositories {
    pub fn seaorm(db: DatabaseConnection) -> Self {
        use seaorm::*;
        Self {
            users: Arc::new(SeaOrmUserRepository { db: db.clone() }),
            items: Arc::new(SeaOrmItemRepository { db: db.clone() }),
            bookings: Arc::new(SeaOrmBookingRepository { db: db.clone() }),
            comments: Arc::new(SeaOrmCommentRepository { db: db.clone() }),
            requests: Arc::new(SeaOrmRequestRepository { db }),
        }
    }

    pub fn memory() -> Self {
        use memory::*;
        let store = MemoryStore::default();
        Self {
            users: Arc::new(MemoryUserRepository::new(store.clone())),
            items: Arc::new(MemoryItemRepository::new(store.clone())),
            bookings: Arc::new(MemoryBookingRepository::new(store.clone())),
            comments: Arc::new(MemoryCommentRepository::new(store.clone())),
            requests: Arc::new(MemoryRequestRepository::new(store)),
        }
    }
}
