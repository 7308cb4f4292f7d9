use thiserror::Error;

pub mod types;
pub mod utils;
pub mod pagination;

/// Header carrying the acting user's id on every authenticated call.
pub const USER_ID_HEADER: &str = "X-Sharer-User-Id";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("missing X-Sharer-User-Id header")]
    Missing,
    #[error("invalid X-Sharer-User-Id header: {0}")]
    Invalid(String),
}

/// Parse the raw `X-Sharer-User-Id` value into a user id.
pub fn parse_user_id(raw: Option<&str>) -> Result<i64, HeaderError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(HeaderError::Missing)?;
    raw.parse::<i64>().map_err(|_| HeaderError::Invalid(raw.to_string()))
}

/// Shape check shared by gateway validation and the `user` entity: one `@`,
/// a non-empty local part, and a dotted domain with no whitespace anywhere.
pub fn is_well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.trim().chars().any(char::is_whitespace)
}
