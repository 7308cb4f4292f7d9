//! Public entry point of ShareIt: checks request shapes, then forwards
//! accepted calls to the server and relays its answer untouched.

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod forward;
pub mod observability;
pub mod routes;
pub mod validation;

pub use bootstrap::{build_app, run};
