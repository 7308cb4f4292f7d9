use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use models::booking::{BookingStatus, NewBooking};
use models::item::NewItem;
use models::{booking, comment, item, item_request, user};

use super::{BookingRepository, CommentRepository, ItemRepository, RequestRepository, UserRepository};
use crate::errors::ServiceError;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, name: &str, email: &str) -> Result<user::Model, ServiceError> {
        Ok(user::create(&self.db, name, email).await?)
    }

    async fn find(&self, id: i64) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(found)
    }

    async fn save(&self, u: user::Model) -> Result<user::Model, ServiceError> {
        let am = user::ActiveModel {
            id: ActiveValue::Unchanged(u.id),
            name: Set(u.name),
            email: Set(u.email),
        };
        Ok(am.update(&self.db).await?)
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        // 依赖外键 ON DELETE CASCADE 清理关联数据
        let res = user::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn list(&self) -> Result<Vec<user::Model>, ServiceError> {
        Ok(user::Entity::find().order_by_asc(user::Column::Id).all(&self.db).await?)
    }
}

pub struct SeaOrmItemRepository {
    pub db: DatabaseConnection,
}

/// `%text%` with LIKE wildcards in `text` escaped by a backslash.
fn contains_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn contains_like(text: &str) -> LikeExpr {
    LikeExpr::new(contains_pattern(text)).escape('\\')
}

#[async_trait]
impl ItemRepository for SeaOrmItemRepository {
    async fn create(&self, new: NewItem) -> Result<item::Model, ServiceError> {
        Ok(item::create(&self.db, new).await?)
    }

    async fn find(&self, id: i64) -> Result<Option<item::Model>, ServiceError> {
        Ok(item::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn save(&self, i: item::Model) -> Result<item::Model, ServiceError> {
        let am = item::ActiveModel {
            id: ActiveValue::Unchanged(i.id),
            name: Set(i.name),
            description: Set(i.description),
            available: Set(i.available),
            owner_id: ActiveValue::Unchanged(i.owner_id),
            request_id: ActiveValue::Unchanged(i.request_id),
        };
        Ok(am.update(&self.db).await?)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<item::Model>, ServiceError> {
        let items = item::Entity::find()
            .filter(item::Column::OwnerId.eq(owner_id))
            .order_by_asc(item::Column::Id)
            .all(&self.db)
            .await?;
        Ok(items)
    }

    async fn search_available(&self, text: &str) -> Result<Vec<item::Model>, ServiceError> {
        let needle = text.to_lowercase();
        let by_name = Expr::expr(Func::lower(Expr::col(item::Column::Name))).like(contains_like(&needle));
        let by_description =
            Expr::expr(Func::lower(Expr::col(item::Column::Description))).like(contains_like(&needle));
        let items = item::Entity::find()
            .filter(item::Column::Available.eq(true))
            .filter(Condition::any().add(by_name).add(by_description))
            .order_by_asc(item::Column::Id)
            .all(&self.db)
            .await?;
        Ok(items)
    }

    async fn list_by_requests(&self, request_ids: &[i64]) -> Result<Vec<item::Model>, ServiceError> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }
        let items = item::Entity::find()
            .filter(item::Column::RequestId.is_in(request_ids.iter().copied()))
            .order_by_asc(item::Column::Id)
            .all(&self.db)
            .await?;
        Ok(items)
    }
}

pub struct SeaOrmBookingRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn create(&self, new: NewBooking) -> Result<booking::Model, ServiceError> {
        Ok(booking::create(&self.db, new).await?)
    }

    async fn find(&self, id: i64) -> Result<Option<booking::Model>, ServiceError> {
        Ok(booking::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn set_status(&self, b: booking::Model, status: BookingStatus) -> Result<booking::Model, ServiceError> {
        Ok(booking::set_status(&self.db, b, status).await?)
    }

    async fn list_by_booker(&self, booker_id: i64) -> Result<Vec<booking::Model>, ServiceError> {
        let bookings = booking::Entity::find()
            .filter(booking::Column::BookerId.eq(booker_id))
            .order_by_desc(booking::Column::Start)
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await?;
        Ok(bookings)
    }

    async fn list_by_item_owner(&self, owner_id: i64) -> Result<Vec<booking::Model>, ServiceError> {
        let bookings = booking::Entity::find()
            .join(JoinType::InnerJoin, booking::Relation::Item.def())
            .filter(item::Column::OwnerId.eq(owner_id))
            .order_by_desc(booking::Column::Start)
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await?;
        Ok(bookings)
    }

    async fn find_finished_approved(
        &self,
        booker_id: i64,
        item_id: i64,
        now: NaiveDateTime,
    ) -> Result<Option<booking::Model>, ServiceError> {
        let found = booking::Entity::find()
            .filter(booking::Column::BookerId.eq(booker_id))
            .filter(booking::Column::ItemId.eq(item_id))
            .filter(booking::Column::Status.eq(BookingStatus::Approved))
            .filter(booking::Column::End.lt(now))
            .one(&self.db)
            .await?;
        Ok(found)
    }
}

pub struct SeaOrmCommentRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl CommentRepository for SeaOrmCommentRepository {
    async fn create(&self, item_id: i64, author_id: i64, text: &str, created: NaiveDateTime) -> Result<comment::Model, ServiceError> {
        Ok(comment::create(&self.db, item_id, author_id, text, created).await?)
    }

    async fn list_by_item(&self, item_id: i64) -> Result<Vec<comment::Model>, ServiceError> {
        let comments = comment::Entity::find()
            .filter(comment::Column::ItemId.eq(item_id))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(comments)
    }
}

pub struct SeaOrmRequestRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl RequestRepository for SeaOrmRequestRepository {
    async fn create(&self, requester_id: i64, description: &str, created: NaiveDateTime) -> Result<item_request::Model, ServiceError> {
        Ok(item_request::create(&self.db, requester_id, description, created).await?)
    }

    async fn find(&self, id: i64) -> Result<Option<item_request::Model>, ServiceError> {
        Ok(item_request::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list_by_requester(&self, requester_id: i64) -> Result<Vec<item_request::Model>, ServiceError> {
        let requests = item_request::Entity::find()
            .filter(item_request::Column::RequesterId.eq(requester_id))
            .order_by_desc(item_request::Column::Created)
            .order_by_desc(item_request::Column::Id)
            .all(&self.db)
            .await?;
        Ok(requests)
    }

    async fn list_excluding_requester(&self, requester_id: i64) -> Result<Vec<item_request::Model>, ServiceError> {
        let requests = item_request::Entity::find()
            .filter(item_request::Column::RequesterId.ne(requester_id))
            .order_by_desc(item_request::Column::Created)
            .order_by_desc(item_request::Column::Id)
            .all(&self.db)
            .await?;
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Repositories;
    use crate::test_support::sqlite_db;
    use chrono::{Duration, Utc};

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(contains_pattern("drill"), "%drill%");
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_skips_unavailable() -> anyhow::Result<()> {
        let repos = Repositories::seaorm(sqlite_db().await?);
        let owner = repos.users.create("Owner", "owner@example.com").await?;
        let new = |name: &str, description: &str, available: bool| NewItem {
            name: name.into(),
            description: description.into(),
            available,
            owner_id: owner.id,
            request_id: None,
        };
        let drill = repos.items.create(new("Power DRILL", "cordless", true)).await?;
        let saw = repos.items.create(new("Saw", "goes with a drill bit", true)).await?;
        repos.items.create(new("Old drill", "broken", false)).await?;

        let found: Vec<i64> = repos.items.search_available("dRiLl").await?.iter().map(|i| i.id).collect();
        assert_eq!(found, vec![drill.id, saw.id]);
        Ok(())
    }

    #[tokio::test]
    async fn owner_bookings_join_through_items() -> anyhow::Result<()> {
        let repos = Repositories::seaorm(sqlite_db().await?);
        let owner = repos.users.create("Owner", "owner@example.com").await?;
        let booker = repos.users.create("Booker", "booker@example.com").await?;
        let item = repos.items.create(NewItem {
            name: "Tent".into(),
            description: "4 person".into(),
            available: true,
            owner_id: owner.id,
            request_id: None,
        }).await?;
        let now = Utc::now().naive_utc();
        let early = repos.bookings.create(NewBooking { item_id: item.id, booker_id: booker.id, start: now + Duration::days(1), end: now + Duration::days(2) }).await?;
        let late = repos.bookings.create(NewBooking { item_id: item.id, booker_id: booker.id, start: now + Duration::days(5), end: now + Duration::days(6) }).await?;

        let ids: Vec<i64> = repos.bookings.list_by_item_owner(owner.id).await?.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![late.id, early.id]);
        assert!(repos.bookings.list_by_item_owner(booker.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_maps_to_conflict() -> anyhow::Result<()> {
        let repos = Repositories::seaorm(sqlite_db().await?);
        let a = repos.users.create("A", "a@example.com").await?;
        let b = repos.users.create("B", "b@example.com").await?;
        let err = repos.users.create("C", "a@example.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err = repos.users.save(user::Model { email: a.email.clone(), ..b.clone() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_name_maps_to_conflict() -> anyhow::Result<()> {
        let repos = Repositories::seaorm(sqlite_db().await?);
        let a = repos.users.create("A", "a@example.com").await?;
        let b = repos.users.create("B", "b@example.com").await?;
        let err = repos.users.create("A", "c@example.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err = repos.users.save(user::Model { name: a.name.clone(), ..b }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        Ok(())
    }
}
