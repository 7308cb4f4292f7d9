//! Shape checks applied before a request is forwarded. Business rules
//! (ownership, availability, existence) are left to the server.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use common::pagination::Pagination;

use crate::errors::GatewayError;

/// Booking list filters the server understands, in their canonical spelling.
pub const BOOKING_STATES: [&str; 6] = ["ALL", "CURRENT", "PAST", "FUTURE", "WAITING", "REJECTED"];

#[derive(Debug, Default, Deserialize)]
pub struct UserBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub request_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentBody {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingBody {
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Decode a JSON body; an empty or malformed body is a validation failure.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, GatewayError> {
    if body.is_empty() {
        return Err(GatewayError::validation("request body is required"));
    }
    serde_json::from_slice(body).map_err(|e| GatewayError::validation(format!("malformed JSON body: {e}")))
}

pub fn new_user(body: &UserBody) -> Result<(), GatewayError> {
    if is_blank(&body.name) {
        return Err(GatewayError::validation("name must not be blank"));
    }
    if is_blank(&body.email) {
        return Err(GatewayError::validation("email must not be blank"));
    }
    user_patch(body)
}

pub fn user_patch(body: &UserBody) -> Result<(), GatewayError> {
    match body.email.as_deref() {
        Some(email) if !common::is_well_formed_email(email) => {
            Err(GatewayError::validation(format!("invalid email: {email}")))
        }
        _ => Ok(()),
    }
}

pub fn new_item(body: &ItemBody) -> Result<(), GatewayError> {
    if is_blank(&body.name) {
        return Err(GatewayError::validation("name must not be blank"));
    }
    if is_blank(&body.description) {
        return Err(GatewayError::validation("description must not be blank"));
    }
    if body.available.is_none() {
        return Err(GatewayError::validation("available must be set"));
    }
    Ok(())
}

pub fn new_comment(body: &CommentBody) -> Result<(), GatewayError> {
    if is_blank(&body.text) {
        return Err(GatewayError::validation("text must not be blank"));
    }
    Ok(())
}

pub fn new_request(body: &RequestBody) -> Result<(), GatewayError> {
    if is_blank(&body.description) {
        return Err(GatewayError::validation("description must not be blank"));
    }
    Ok(())
}

/// `start` may not lie in the past, `end` must lie in the future and after `start`.
pub fn new_booking(body: &BookingBody, now: NaiveDateTime) -> Result<(), GatewayError> {
    if body.item_id.is_none() {
        return Err(GatewayError::validation("itemId must be set"));
    }
    let (Some(start), Some(end)) = (body.start, body.end) else {
        return Err(GatewayError::validation("start and end must be set"));
    };
    if start < now {
        return Err(GatewayError::validation("start must not be in the past"));
    }
    if end <= now {
        return Err(GatewayError::validation("end must be in the future"));
    }
    if end <= start {
        return Err(GatewayError::validation("end must be after start"));
    }
    Ok(())
}

/// Case-insensitive state lookup returning the canonical name; missing means ALL.
pub fn booking_state(raw: Option<&str>) -> Result<&'static str, GatewayError> {
    let Some(raw) = raw else { return Ok("ALL") };
    BOOKING_STATES
        .iter()
        .copied()
        .find(|s| s.eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| GatewayError::validation(format!("Unknown state: {raw}")))
}

/// Bounds-checked window, or `None` when the client asked for none.
pub fn page(from: Option<i64>, size: Option<i64>) -> Result<Option<Pagination>, GatewayError> {
    let page = Pagination::requested(from, size);
    if let Some(p) = &page {
        p.validate().map_err(GatewayError::Validation)?;
    }
    Ok(page)
}

pub fn approved(raw: Option<&str>) -> Result<bool, GatewayError> {
    match raw.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(GatewayError::validation(format!("approved must be true or false, got {v}"))),
        None => Err(GatewayError::validation("approved is required")),
    }
}
