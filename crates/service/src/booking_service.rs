use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use tracing::{info, instrument, warn};

use common::pagination::Pagination;
use models::booking::{self, BookingStatus, NewBooking};

use crate::dto::{to_booking_dto, BookingDto, BookingInputDto};
use crate::errors::ServiceError;
use crate::repository::{BookingRepository, ItemRepository, Repositories, UserRepository};

/// Which slice of a user's bookings to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    pub const ALL_STATES: [BookingState; 6] = [
        BookingState::All,
        BookingState::Current,
        BookingState::Past,
        BookingState::Future,
        BookingState::Waiting,
        BookingState::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingState::All => "ALL",
            BookingState::Current => "CURRENT",
            BookingState::Past => "PAST",
            BookingState::Future => "FUTURE",
            BookingState::Waiting => "WAITING",
            BookingState::Rejected => "REJECTED",
        }
    }

    /// Predicate selecting this slice at instant `now`.
    pub fn filter(self, now: NaiveDateTime) -> BookingFilter {
        match self {
            BookingState::All => BookingFilter::Any,
            BookingState::Current => BookingFilter::ActiveAt(now),
            BookingState::Past => BookingFilter::EndedBefore(now),
            BookingState::Future => BookingFilter::StartsAfter(now),
            BookingState::Waiting => BookingFilter::Status(BookingStatus::Waiting),
            BookingState::Rejected => BookingFilter::Status(BookingStatus::Rejected),
        }
    }
}

/// Exact, case-sensitive upper-case names only.
impl FromStr for BookingState {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingState::ALL_STATES
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ServiceError::Validation(format!("Unknown state: {}", s)))
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFilter {
    Any,
    /// start <= now <= end
    ActiveAt(NaiveDateTime),
    EndedBefore(NaiveDateTime),
    StartsAfter(NaiveDateTime),
    Status(BookingStatus),
}

impl BookingFilter {
    pub fn matches(&self, b: &booking::Model) -> bool {
        match *self {
            BookingFilter::Any => true,
            BookingFilter::ActiveAt(now) => b.is_current(now),
            BookingFilter::EndedBefore(now) => b.is_past(now),
            BookingFilter::StartsAfter(now) => b.is_future(now),
            BookingFilter::Status(status) => b.status == status,
        }
    }
}

/// Booking lifecycle: WAITING on creation, then APPROVED or REJECTED by the item owner.
pub struct BookingService {
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl BookingService {
    pub fn new(repos: &Repositories) -> Self {
        Self { users: repos.users.clone(), items: repos.items.clone(), bookings: repos.bookings.clone() }
    }

    /// Book an item. The item is looked up before the booker; an unavailable
    /// item is a validation failure. Overlapping bookings are not rejected.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, Utc};
    /// use models::booking::BookingStatus;
    /// use service::{dto::{BookingInputDto, ItemInputDto, UserInputDto}, Repositories, Services};
    ///
    /// let svc = Services::new(&Repositories::memory());
    /// let user = |n: &str| UserInputDto { name: Some(n.into()), email: Some(format!("{n}@example.com")) };
    /// let owner = tokio_test::block_on(svc.users.create_user(user("owner"))).unwrap();
    /// let booker = tokio_test::block_on(svc.users.create_user(user("booker"))).unwrap();
    /// let item = tokio_test::block_on(svc.items.add_item(owner.id, ItemInputDto {
    ///     name: Some("Drill".into()), description: Some("Cordless".into()), available: Some(true), request_id: None,
    /// })).unwrap();
    /// let now = Utc::now().naive_utc();
    /// let input = BookingInputDto { item_id: Some(item.id), start: Some(now + Duration::days(1)), end: Some(now + Duration::days(2)) };
    /// let booking = tokio_test::block_on(svc.bookings.create_booking(booker.id, input)).unwrap();
    /// assert_eq!(booking.status, BookingStatus::Waiting);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn create_booking(&self, booker_id: i64, input: BookingInputDto) -> Result<BookingDto, ServiceError> {
        let (Some(item_id), Some(start), Some(end)) = (input.item_id, input.start, input.end) else {
            return Err(ServiceError::validation("itemId, start and end are required"));
        };
        let item = self.items.find(item_id).await?.ok_or_else(|| ServiceError::not_found("item", item_id))?;
        let booker = self.users.find(booker_id).await?.ok_or_else(|| ServiceError::not_found("user", booker_id))?;
        if !item.available {
            return Err(ServiceError::Validation(format!("item {} is not available", item_id)));
        }

        let created = self.bookings.create(NewBooking { item_id, booker_id, start, end }).await?;
        info!(booking_id = created.id, item_id, booker_id, "booking_created");
        Ok(to_booking_dto(&created, &booker, &item))
    }

    /// Owner decides a booking. Deciding again overwrites the previous verdict.
    #[instrument(skip(self))]
    pub async fn update_booking(&self, user_id: i64, booking_id: i64, approved: bool) -> Result<BookingDto, ServiceError> {
        let current = self.bookings.find(booking_id).await?.ok_or_else(|| ServiceError::not_found("booking", booking_id))?;
        let item = self.items.find(current.item_id).await?.ok_or_else(|| ServiceError::not_found("item", current.item_id))?;
        if item.owner_id != user_id {
            warn!(booking_id, user_id, owner_id = item.owner_id, "booking_decision_by_non_owner");
            return Err(ServiceError::Validation(format!("user {} is not the owner of item {}", user_id, item.id)));
        }

        let status = BookingStatus::decided(approved);
        let saved = self.bookings.set_status(current, status).await?;
        let booker = self.users.find(saved.booker_id).await?.ok_or_else(|| ServiceError::not_found("user", saved.booker_id))?;
        info!(booking_id, status = %status, "booking_decided");
        Ok(to_booking_dto(&saved, &booker, &item))
    }

    /// Visible only to the booker and the item owner.
    pub async fn get_booking(&self, user_id: i64, booking_id: i64) -> Result<BookingDto, ServiceError> {
        let found = self.bookings.find(booking_id).await?.ok_or_else(|| ServiceError::not_found("booking", booking_id))?;
        let item = self.items.find(found.item_id).await?.ok_or_else(|| ServiceError::not_found("item", found.item_id))?;
        if found.booker_id != user_id && item.owner_id != user_id {
            return Err(ServiceError::Validation(format!("user {} may not view booking {}", user_id, booking_id)));
        }
        let booker = self.users.find(found.booker_id).await?.ok_or_else(|| ServiceError::not_found("user", found.booker_id))?;
        Ok(to_booking_dto(&found, &booker, &item))
    }

    /// Bookings made by `user_id` in `state`, start descending.
    pub async fn list_for_booker(&self, user_id: i64, state: &str, page: Option<Pagination>) -> Result<Vec<BookingDto>, ServiceError> {
        let state: BookingState = state.parse()?;
        let bookings = self.bookings.list_by_booker(user_id).await?;
        self.select(bookings, state, page).await
    }

    /// Bookings on items owned by `user_id`. A user with no items gets
    /// NotFound before the state is even parsed.
    pub async fn list_for_owner(&self, user_id: i64, state: &str, page: Option<Pagination>) -> Result<Vec<BookingDto>, ServiceError> {
        if self.items.list_by_owner(user_id).await?.is_empty() {
            return Err(ServiceError::NotFound(format!("user {} owns no items", user_id)));
        }
        let state: BookingState = state.parse()?;
        let bookings = self.bookings.list_by_item_owner(user_id).await?;
        self.select(bookings, state, page).await
    }

    async fn select(&self, mut bookings: Vec<booking::Model>, state: BookingState, page: Option<Pagination>) -> Result<Vec<BookingDto>, ServiceError> {
        let filter = state.filter(Utc::now().naive_utc());
        bookings.retain(|b| filter.matches(b));
        bookings.sort_by(|a, b| b.start.cmp(&a.start).then(b.id.cmp(&a.id)));

        // 未指定分页时返回全部匹配结果
        let bookings = match page {
            Some(page) => page.apply(bookings),
            None => bookings,
        };

        let mut out = Vec::new();
        for b in bookings {
            let item = self.items.find(b.item_id).await?.ok_or_else(|| ServiceError::not_found("item", b.item_id))?;
            let booker = self.users.find(b.booker_id).await?.ok_or_else(|| ServiceError::not_found("user", b.booker_id))?;
            out.push(to_booking_dto(&b, &booker, &item));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{ItemInputDto, UserInputDto};
    use crate::Services;
    use chrono::Duration;

    struct Fixture {
        svc: Services,
        owner: i64,
        booker: i64,
        item: i64,
    }

    async fn fixture() -> anyhow::Result<Fixture> {
        let svc = Services::new(&Repositories::memory());
        let user = |n: &str| UserInputDto { name: Some(n.into()), email: Some(format!("{n}@example.com")) };
        let owner = svc.users.create_user(user("owner")).await?;
        let booker = svc.users.create_user(user("booker")).await?;
        let item = svc.items.add_item(owner.id, ItemInputDto {
            name: Some("Drill".into()),
            description: Some("Cordless".into()),
            available: Some(true),
            request_id: None,
        }).await?;
        Ok(Fixture { svc, owner: owner.id, booker: booker.id, item: item.id })
    }

    fn window(item_id: i64, start_days: i64, end_days: i64) -> BookingInputDto {
        let now = Utc::now().naive_utc();
        BookingInputDto {
            item_id: Some(item_id),
            start: Some(now + Duration::days(start_days)),
            end: Some(now + Duration::days(end_days)),
        }
    }

    #[test]
    fn state_parsing_is_exact() {
        for state in BookingState::ALL_STATES {
            assert_eq!(state.as_str().parse::<BookingState>(), Ok(state));
        }
        assert_eq!("all".parse::<BookingState>(), Err(ServiceError::Validation("Unknown state: all".into())));
        assert_eq!("APPROVED".parse::<BookingState>(), Err(ServiceError::Validation("Unknown state: APPROVED".into())));
    }

    #[test]
    fn filters_partition_by_time() {
        let now = Utc::now().naive_utc();
        let b = |s: i64, e: i64| booking::Model {
            id: 1,
            start: now + Duration::hours(s),
            end: now + Duration::hours(e),
            item_id: 1,
            booker_id: 1,
            status: BookingStatus::Waiting,
        };
        let (past, current, future) = (b(-5, -1), b(-1, 1), b(1, 5));
        let pick = |state: BookingState| {
            let f = state.filter(now);
            [&past, &current, &future].iter().filter(|x| f.matches(x)).count()
        };
        assert_eq!(pick(BookingState::All), 3);
        assert_eq!(pick(BookingState::Past), 1);
        assert_eq!(pick(BookingState::Current), 1);
        assert_eq!(pick(BookingState::Future), 1);
        assert_eq!(pick(BookingState::Waiting), 3);
        assert_eq!(pick(BookingState::Rejected), 0);
        assert!(BookingState::Current.filter(now).matches(&b(0, 0)));
    }

    #[tokio::test]
    async fn create_checks_item_before_booker() -> anyhow::Result<()> {
        let f = fixture().await?;
        let err = f.svc.bookings.create_booking(999, window(888, 1, 2)).await.unwrap_err();
        assert_eq!(err, ServiceError::not_found("item", 888));
        let err = f.svc.bookings.create_booking(999, window(f.item, 1, 2)).await.unwrap_err();
        assert_eq!(err, ServiceError::not_found("user", 999));
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_item_cannot_be_booked() -> anyhow::Result<()> {
        let f = fixture().await?;
        f.svc.items.update_item(f.owner, f.item, ItemInputDto { available: Some(false), ..Default::default() }).await?;
        let err = f.svc.bookings.create_booking(f.booker, window(f.item, 1, 2)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn only_owner_decides_and_may_redecide() -> anyhow::Result<()> {
        let f = fixture().await?;
        let b = f.svc.bookings.create_booking(f.booker, window(f.item, 1, 2)).await?;
        assert_eq!(b.status, BookingStatus::Waiting);

        let err = f.svc.bookings.update_booking(f.booker, b.id, true).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = f.svc.bookings.update_booking(f.owner, 404, true).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let approved = f.svc.bookings.update_booking(f.owner, b.id, true).await?;
        assert_eq!(approved.status, BookingStatus::Approved);
        let rejected = f.svc.bookings.update_booking(f.owner, b.id, false).await?;
        assert_eq!(rejected.status, BookingStatus::Rejected);
        Ok(())
    }

    #[tokio::test]
    async fn get_is_restricted_to_booker_and_owner() -> anyhow::Result<()> {
        let f = fixture().await?;
        let stranger = f.svc.users.create_user(UserInputDto { name: Some("s".into()), email: Some("s@example.com".into()) }).await?;
        let b = f.svc.bookings.create_booking(f.booker, window(f.item, 1, 2)).await?;

        assert_eq!(f.svc.bookings.get_booking(f.booker, b.id).await?, b);
        assert_eq!(f.svc.bookings.get_booking(f.owner, b.id).await?, b);
        let err = f.svc.bookings.get_booking(stranger.id, b.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn lists_filter_by_state_and_sort_by_start_desc() -> anyhow::Result<()> {
        let f = fixture().await?;
        let past = f.svc.bookings.create_booking(f.booker, window(f.item, -3, -2)).await?;
        let current = f.svc.bookings.create_booking(f.booker, window(f.item, -1, 1)).await?;
        let future = f.svc.bookings.create_booking(f.booker, window(f.item, 2, 3)).await?;
        f.svc.bookings.update_booking(f.owner, past.id, false).await?;

        let ids = |v: Vec<BookingDto>| v.into_iter().map(|b| b.id).collect::<Vec<_>>();
        let page = None;
        let bookings = &f.svc.bookings;

        assert_eq!(ids(bookings.list_for_booker(f.booker, "ALL", page).await?), vec![future.id, current.id, past.id]);
        assert_eq!(ids(bookings.list_for_booker(f.booker, "CURRENT", page).await?), vec![current.id]);
        assert_eq!(ids(bookings.list_for_booker(f.booker, "PAST", page).await?), vec![past.id]);
        assert_eq!(ids(bookings.list_for_booker(f.booker, "FUTURE", page).await?), vec![future.id]);
        assert_eq!(ids(bookings.list_for_booker(f.booker, "WAITING", page).await?), vec![future.id, current.id]);
        assert_eq!(ids(bookings.list_for_booker(f.booker, "REJECTED", page).await?), vec![past.id]);
        assert_eq!(ids(bookings.list_for_owner(f.owner, "ALL", page).await?), vec![future.id, current.id, past.id]);
        assert_eq!(ids(bookings.list_for_owner(f.owner, "CURRENT", page).await?), vec![current.id]);
        assert_eq!(ids(bookings.list_for_owner(f.owner, "PAST", page).await?), vec![past.id]);
        assert_eq!(ids(bookings.list_for_owner(f.owner, "FUTURE", page).await?), vec![future.id]);
        assert_eq!(ids(bookings.list_for_owner(f.owner, "WAITING", page).await?), vec![future.id, current.id]);
        assert_eq!(ids(bookings.list_for_owner(f.owner, "REJECTED", page).await?), vec![past.id]);

        let second = Some(Pagination { from: 1, size: 1 });
        assert_eq!(ids(bookings.list_for_booker(f.booker, "ALL", second).await?), vec![current.id]);
        assert_eq!(ids(bookings.list_for_owner(f.owner, "ALL", second).await?), vec![current.id]);
        Ok(())
    }

    #[tokio::test]
    async fn lists_without_window_return_every_match() -> anyhow::Result<()> {
        let f = fixture().await?;
        for day in 1..=12 {
            f.svc.bookings.create_booking(f.booker, window(f.item, day, day + 1)).await?;
        }
        let bookings = &f.svc.bookings;
        assert_eq!(bookings.list_for_owner(f.owner, "ALL", None).await?.len(), 12);
        assert_eq!(bookings.list_for_booker(f.booker, "ALL", None).await?.len(), 12);
        assert_eq!(bookings.list_for_owner(f.owner, "FUTURE", None).await?.len(), 12);

        let first_page = Some(Pagination::default());
        assert_eq!(bookings.list_for_booker(f.booker, "ALL", first_page).await?.len(), 10);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_state_is_validation() -> anyhow::Result<()> {
        let f = fixture().await?;
        let err = f.svc.bookings.list_for_booker(f.booker, "UNSUPPORTED", None).await.unwrap_err();
        assert_eq!(err.reason(), "Unknown state: UNSUPPORTED");
        let err = f.svc.bookings.list_for_owner(f.owner, "all", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn owner_without_items_is_not_found_even_for_bad_state() -> anyhow::Result<()> {
        let f = fixture().await?;
        let err = f.svc.bookings.list_for_owner(f.booker, "NOPE", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn end_to_end_scenario() -> anyhow::Result<()> {
        let f = fixture().await?;
        let b = f.svc.bookings.create_booking(f.booker, window(f.item, -3, -1)).await?;
        f.svc.bookings.update_booking(f.owner, b.id, true).await?;
        let comment = f.svc.items.create_comment(f.booker, f.item, crate::dto::CommentInputDto { text: "Nice".into() }).await?;
        let item = f.svc.items.get_item(f.item).await?;
        assert_eq!(item.comments, vec![comment]);
        Ok(())
    }
}
