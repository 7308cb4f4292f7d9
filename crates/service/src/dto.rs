//! Wire shapes exchanged with HTTP clients, plus entity-to-DTO mappers.
//!
//! Field names are camelCase on the wire (`itemId`, `requestId`, `authorName`).
//! Timestamps are naive date-times such as `2024-05-01T10:00:00`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use models::booking::BookingStatus;
use models::{booking, comment, item, item_request, user};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Body of `POST /users` and `PATCH /users/{id}`; every field optional so a
/// patch can carry only what changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

/// Body of `POST /items` and `PATCH /items/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInputDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemWithCommentsDto {
    #[serde(flatten)]
    pub item: ItemDto,
    pub comments: Vec<CommentDto>,
}

/// Item as listed under the request it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemShortDto {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_name: String,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInputDto {
    #[serde(default)]
    pub text: String,
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInputDto {
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub booker: UserDto,
    pub item: ItemDto,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestInputDto {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestDto {
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestWithItemsDto {
    pub id: i64,
    pub description: String,
    pub created: NaiveDateTime,
    pub items: Vec<ItemShortDto>,
}

pub fn to_user_dto(u: &user::Model) -> UserDto {
    UserDto { id: u.id, name: u.name.clone(), email: u.email.clone() }
}

pub fn to_item_dto(i: &item::Model) -> ItemDto {
    ItemDto {
        id: i.id,
        name: i.name.clone(),
        description: i.description.clone(),
        available: i.available,
        request_id: i.request_id,
    }
}

pub fn to_item_short_dto(i: &item::Model) -> ItemShortDto {
    ItemShortDto { id: i.id, name: i.name.clone(), owner_id: i.owner_id }
}

pub fn to_item_with_comments_dto(i: &item::Model, comments: Vec<CommentDto>) -> ItemWithCommentsDto {
    ItemWithCommentsDto { item: to_item_dto(i), comments }
}

pub fn to_comment_dto(c: &comment::Model, author_name: &str) -> CommentDto {
    CommentDto {
        id: c.id,
        text: c.text.clone(),
        item_id: c.item_id,
        author_name: author_name.to_string(),
        created: c.created,
    }
}

pub fn to_booking_dto(b: &booking::Model, booker: &user::Model, item: &item::Model) -> BookingDto {
    BookingDto {
        id: b.id,
        start: b.start,
        end: b.end,
        status: b.status,
        booker: to_user_dto(booker),
        item: to_item_dto(item),
    }
}

pub fn to_item_request_dto(r: &item_request::Model) -> ItemRequestDto {
    ItemRequestDto {
        id: r.id,
        description: r.description.clone(),
        requester_id: r.requester_id,
        created: r.created,
    }
}

pub fn to_item_request_with_items_dto(r: &item_request::Model, items: &[item::Model]) -> ItemRequestWithItemsDto {
    ItemRequestWithItemsDto {
        id: r.id,
        description: r.description.clone(),
        created: r.created,
        items: items.iter().map(to_item_short_dto).collect(),
    }
}
