//! In-process repositories for unit tests and doc examples.
//!
//! All five handles share one [`MemoryStore`], so deleting a user removes its
//! items, bookings, comments and requests the way the database cascade does.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use models::booking::{BookingStatus, NewBooking};
use models::item::NewItem;
use models::{booking, comment, item, item_request, user};

use super::{BookingRepository, CommentRepository, ItemRepository, RequestRepository, UserRepository};
use crate::errors::ServiceError;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, user::Model>,
    items: BTreeMap<i64, item::Model>,
    bookings: BTreeMap<i64, booking::Model>,
    comments: BTreeMap<i64, comment::Model>,
    requests: BTreeMap<i64, item_request::Model>,
    seq: Sequences,
}

#[derive(Default)]
struct Sequences {
    user: i64,
    item: i64,
    booking: i64,
    comment: i64,
    request: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn conflict() -> ServiceError {
    ServiceError::Conflict("name or email is already in use".into())
}

pub struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    pub fn new(store: MemoryStore) -> Self { Self { store } }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, name: &str, email: &str) -> Result<user::Model, ServiceError> {
        user::validate_name(name)?;
        user::validate_email(email)?;
        let mut t = self.store.lock();
        if t.users.values().any(|u| u.email == email || u.name == name) {
            return Err(conflict());
        }
        let u = user::Model { id: next(&mut t.seq.user), name: name.to_string(), email: email.to_string() };
        t.users.insert(u.id, u.clone());
        Ok(u)
    }

    async fn find(&self, id: i64) -> Result<Option<user::Model>, ServiceError> {
        Ok(self.store.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(self.store.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn save(&self, u: user::Model) -> Result<user::Model, ServiceError> {
        let mut t = self.store.lock();
        if t.users.values().any(|other| other.id != u.id && (other.email == u.email || other.name == u.name)) {
            return Err(conflict());
        }
        match t.users.get_mut(&u.id) {
            Some(slot) => {
                *slot = u.clone();
                Ok(u)
            }
            None => Err(ServiceError::not_found("user", u.id)),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let mut t = self.store.lock();
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<i64> = t.items.values().filter(|i| i.owner_id == id).map(|i| i.id).collect();
        let requested: Vec<i64> = t.requests.values().filter(|r| r.requester_id == id).map(|r| r.id).collect();
        t.items.retain(|_, i| i.owner_id != id);
        t.bookings.retain(|_, b| b.booker_id != id && !owned.contains(&b.item_id));
        t.comments.retain(|_, c| c.author_id != id && !owned.contains(&c.item_id));
        t.requests.retain(|_, r| r.requester_id != id);
        for i in t.items.values_mut() {
            if i.request_id.is_some_and(|r| requested.contains(&r)) {
                i.request_id = None;
            }
        }
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<user::Model>, ServiceError> {
        Ok(self.store.lock().users.values().cloned().collect())
    }
}

pub struct MemoryItemRepository {
    store: MemoryStore,
}

impl MemoryItemRepository {
    pub fn new(store: MemoryStore) -> Self { Self { store } }
}

#[async_trait]
impl ItemRepository for MemoryItemRepository {
    async fn create(&self, new: NewItem) -> Result<item::Model, ServiceError> {
        new.validate()?;
        let mut t = self.store.lock();
        let i = item::Model {
            id: next(&mut t.seq.item),
            name: new.name,
            description: new.description,
            available: new.available,
            owner_id: new.owner_id,
            request_id: new.request_id,
        };
        t.items.insert(i.id, i.clone());
        Ok(i)
    }

    async fn find(&self, id: i64) -> Result<Option<item::Model>, ServiceError> {
        Ok(self.store.lock().items.get(&id).cloned())
    }

    async fn save(&self, i: item::Model) -> Result<item::Model, ServiceError> {
        let mut t = self.store.lock();
        match t.items.get_mut(&i.id) {
            Some(slot) => {
                *slot = i.clone();
                Ok(i)
            }
            None => Err(ServiceError::not_found("item", i.id)),
        }
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<item::Model>, ServiceError> {
        let t = self.store.lock();
        Ok(t.items.values().filter(|i| i.owner_id == owner_id).cloned().collect())
    }

    async fn search_available(&self, text: &str) -> Result<Vec<item::Model>, ServiceError> {
        let needle = text.to_lowercase();
        let t = self.store.lock();
        Ok(t.items
            .values()
            .filter(|i| i.available)
            .filter(|i| i.name.to_lowercase().contains(&needle) || i.description.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_by_requests(&self, request_ids: &[i64]) -> Result<Vec<item::Model>, ServiceError> {
        let t = self.store.lock();
        Ok(t.items
            .values()
            .filter(|i| i.request_id.is_some_and(|r| request_ids.contains(&r)))
            .cloned()
            .collect())
    }
}

pub struct MemoryBookingRepository {
    store: MemoryStore,
}

impl MemoryBookingRepository {
    pub fn new(store: MemoryStore) -> Self { Self { store } }
}

fn by_start_desc(mut bookings: Vec<booking::Model>) -> Vec<booking::Model> {
    bookings.sort_by(|a, b| b.start.cmp(&a.start).then(b.id.cmp(&a.id)));
    bookings
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn create(&self, new: NewBooking) -> Result<booking::Model, ServiceError> {
        let mut t = self.store.lock();
        let b = booking::Model {
            id: next(&mut t.seq.booking),
            start: new.start,
            end: new.end,
            item_id: new.item_id,
            booker_id: new.booker_id,
            status: BookingStatus::Waiting,
        };
        t.bookings.insert(b.id, b.clone());
        Ok(b)
    }

    async fn find(&self, id: i64) -> Result<Option<booking::Model>, ServiceError> {
        Ok(self.store.lock().bookings.get(&id).cloned())
    }

    async fn set_status(&self, b: booking::Model, status: BookingStatus) -> Result<booking::Model, ServiceError> {
        let mut t = self.store.lock();
        let slot = t.bookings.get_mut(&b.id).ok_or_else(|| ServiceError::not_found("booking", b.id))?;
        slot.status = status;
        Ok(slot.clone())
    }

    async fn list_by_booker(&self, booker_id: i64) -> Result<Vec<booking::Model>, ServiceError> {
        let t = self.store.lock();
        Ok(by_start_desc(t.bookings.values().filter(|b| b.booker_id == booker_id).cloned().collect()))
    }

    async fn list_by_item_owner(&self, owner_id: i64) -> Result<Vec<booking::Model>, ServiceError> {
        let t = self.store.lock();
        let owned = |item_id: i64| t.items.get(&item_id).is_some_and(|i| i.owner_id == owner_id);
        Ok(by_start_desc(t.bookings.values().filter(|b| owned(b.item_id)).cloned().collect()))
    }

    async fn find_finished_approved(
        &self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> Result<Option<booking::Model>, ServiceError> {
        let t = self.store.lock();
        Ok(t.bookings
            .values()
            .find(|b| {
                b.booker_id == booker_id && b.item_id == item_id && b.status == BookingStatus::Approved && b.end < now
            })
            .cloned())
    }
}

pub struct MemoryCommentRepository {
    store: MemoryStore,
}

impl MemoryCommentRepository {
    pub fn new(store: MemoryStore) -> Self { Self { store } }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn create(&self, item_id: i64, author_id: i64, text: &str, created: NaiveDateTime) -> Result<comment::Model, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::validation("comment text required"));
        }
        let mut t = self.store.lock();
        let c = comment::Model { id: next(&mut t.seq.comment), text: text.to_string(), item_id, author_id, created };
        t.comments.insert(c.id, c.clone());
        Ok(c)
    }

    async fn list_by_item(&self, item_id: i64) -> Result<Vec<comment::Model>, ServiceError> {
        let t = self.store.lock();
        Ok(t.comments.values().filter(|c| c.item_id == item_id).cloned().collect())
    }
}

pub struct MemoryRequestRepository {
    store: MemoryStore,
}

impl MemoryRequestRepository {
    pub fn new(store: MemoryStore) -> Self { Self { store } }
}

fn by_created_desc(mut requests: Vec<item_request::Model>) -> Vec<item_request::Model> {
    requests.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
    requests
}

#[async_trait]
impl RequestRepository for MemoryRequestRepository {
    async fn create(&self, requester_id: i64, description: &str, created: NaiveDateTime) -> Result<item_request::Model, ServiceError> {
        if description.trim().is_empty() {
            return Err(ServiceError::validation("description required"));
        }
        let mut t = self.store.lock();
        let r = item_request::Model {
            id: next(&mut t.seq.request),
            description: description.to_string(),
            requester_id,
            created,
        };
        t.requests.insert(r.id, r.clone());
        Ok(r)
    }

    async fn find(&self, id: i64) -> Result<Option<item_request::Model>, ServiceError> {
        Ok(self.store.lock().requests.get(&id).cloned())
    }

    async fn list_by_requester(&self, requester_id: i64) -> Result<Vec<item_request::Model>, ServiceError> {
        let t = self.store.lock();
        Ok(by_created_desc(t.requests.values().filter(|r| r.requester_id == requester_id).cloned().collect()))
    }

    async fn list_excluding_requester(&self, requester_id: i64) -> Result<Vec<item_request::Model>, ServiceError> {
        let t = self.store.lock();
        Ok(by_created_desc(t.requests.values().filter(|r| r.requester_id != requester_id).cloned().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repositories;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn delete_user_cascades_to_owned_rows() -> anyhow::Result<()> {
        let repos = Repositories::memory();
        let owner = repos.users.create("Owner", "owner@example.com").await?;
        let booker = repos.users.create("Booker", "booker@example.com").await?;
        let tent = repos.items.create(NewItem {
            name: "Tent".into(),
            description: "4 person".into(),
            available: true,
            owner_id: owner.id,
            request_id: None,
        }).await?;
        let now = Utc::now().naive_utc();
        let b = repos.bookings.create(NewBooking { item_id: tent.id, booker_id: booker.id, start: now, end: now + Duration::days(1) }).await?;

        assert!(repos.users.delete(owner.id).await?);
        assert!(repos.items.find(tent.id).await?.is_none());
        assert!(repos.bookings.find(b.id).await?.is_none());
        assert!(!repos.users.delete(owner.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn user_names_and_emails_are_unique() -> anyhow::Result<()> {
        let repos = Repositories::memory();
        let a = repos.users.create("A", "a@example.com").await?;
        let b = repos.users.create("B", "b@example.com").await?;
        assert!(matches!(repos.users.create("A", "c@example.com").await, Err(ServiceError::Conflict(_))));
        assert!(matches!(repos.users.create("C", "a@example.com").await, Err(ServiceError::Conflict(_))));

        let renamed = user::Model { name: a.name.clone(), ..b.clone() };
        assert!(matches!(repos.users.save(renamed).await, Err(ServiceError::Conflict(_))));
        assert_eq!(repos.users.save(b.clone()).await?, b);
        Ok(())
    }

    #[tokio::test]
    async fn ids_are_per_table() -> anyhow::Result<()> {
        let repos = Repositories::memory();
        let u = repos.users.create("A", "a@example.com").await?;
        let r = repos.requests.create(u.id, "need a ladder", Utc::now().naive_utc()).await?;
        assert_eq!((u.id, r.id), (1, 1));
        Ok(())
    }
}
