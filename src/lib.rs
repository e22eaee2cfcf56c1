#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Domain models, persistence, authentication, routing and error handling for the"]
#![doc = "taskvault task API. The binary (`main.rs`) wires these together with a real"]
#![doc = "PostgreSQL pool; tests wire them with the in-memory stores."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;

/// Path prefix of the versioned API.
pub const API_PREFIX: &str = "/api/v1";
