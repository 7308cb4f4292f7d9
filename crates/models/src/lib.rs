//! SeaORM entities for the ShareIt tables plus connection helpers.
//!
//! Each entity module carries a small `create` helper that validates its
//! input before inserting, so every writer goes through the same checks.

pub mod errors;
pub mod db;
pub mod user;
pub mod item_request;
pub mod item;
pub mod booking;
pub mod comment;

#[cfg(test)]
mod tests;
