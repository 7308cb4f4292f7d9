use std::fmt;

use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{item, user};

/// Decision state of a booking. Stored as its upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[sea_orm(string_value = "WAITING")]
    Waiting,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }

    /// Owner's verdict on a waiting booking.
    pub fn decided(approved: bool) -> Self {
        if approved { BookingStatus::Approved } else { BookingStatus::Rejected }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "start_date")]
    pub start: DateTime,
    #[sea_orm(column_name = "end_date")]
    pub end: DateTime,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Item,
    Booker,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Item => Entity::belongs_to(item::Entity)
                .from(Column::ItemId)
                .to(item::Column::Id)
                .into(),
            Relation::Booker => Entity::belongs_to(user::Entity)
                .from(Column::BookerId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<item::Entity> for Entity {
    fn to() -> RelationDef { Relation::Item.def() }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Booker.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// start <= now <= end
    pub fn is_current(&self, now: DateTime) -> bool {
        self.start <= now && now <= self.end
    }

    pub fn is_past(&self, now: DateTime) -> bool {
        self.end < now
    }

    pub fn is_future(&self, now: DateTime) -> bool {
        self.start > now
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBooking {
    pub item_id: i64,
    pub booker_id: i64,
    pub start: DateTime,
    pub end: DateTime,
}

/// Insert a booking in the WAITING state.
pub async fn create(db: &DatabaseConnection, new: NewBooking) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        start: Set(new.start),
        end: Set(new.end),
        item_id: Set(new.item_id),
        booker_id: Set(new.booker_id),
        status: Set(BookingStatus::Waiting),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn set_status(db: &DatabaseConnection, booking: Model, status: BookingStatus) -> Result<Model, errors::ModelError> {
    let mut am: ActiveModel = booking.into();
    am.status = Set(status);
    Ok(am.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> DateTime {
        NaiveDate::from_ymd_opt(2024, 5, day).and_then(|d| d.and_hms_opt(hour, 0, 0)).unwrap()
    }

    fn booking(start: DateTime, end: DateTime) -> Model {
        Model { id: 1, start, end, item_id: 1, booker_id: 2, status: BookingStatus::Waiting }
    }

    #[test]
    fn time_windows_are_inclusive_for_current() {
        let b = booking(at(1, 10), at(2, 10));
        assert!(b.is_current(at(1, 10)));
        assert!(b.is_current(at(2, 10)));
        assert!(!b.is_past(at(2, 10)));
        assert!(b.is_past(at(2, 11)));
        assert!(b.is_future(at(1, 9)));
        assert!(!b.is_future(at(1, 10)));
    }

    #[test]
    fn decided_maps_flag() {
        assert_eq!(BookingStatus::decided(true), BookingStatus::Approved);
        assert_eq!(BookingStatus::decided(false).to_string(), "REJECTED");
    }
}
