//! Service layer holding the ShareIt business rules.
//! - Domain services depend only on the repository traits in [`repository`].
//! - [`repository::seaorm`] persists through the `models` entities.
//! - [`repository::memory`] keeps everything in process, for tests and examples.
//! - [`dto`] holds the wire shapes and the free mapping functions.

pub mod errors;
pub mod dto;
pub mod repository;
pub mod user_service;
pub mod item_service;
pub mod booking_service;
pub mod request_service;

pub use booking_service::{BookingFilter, BookingService, BookingState};
pub use errors::ServiceError;
pub use item_service::ItemService;
pub use request_service::RequestService;
pub use repository::Repositories;
pub use user_service::UserService;

/// Bundle of every domain service, wired to one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub users: std::sync::Arc<UserService>,
    pub items: std::sync::Arc<ItemService>,
    pub bookings: std::sync::Arc<BookingService>,
    pub requests: std::sync::Arc<RequestService>,
}

impl Services {
    pub fn new(repos: &Repositories) -> Self {
        use std::sync::Arc;
        Self {
            users: Arc::new(UserService::new(repos)),
            items: Arc::new(ItemService::new(repos)),
            bookings: Arc::new(BookingService::new(repos)),
            requests: Arc::new(RequestService::new(repos)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;
