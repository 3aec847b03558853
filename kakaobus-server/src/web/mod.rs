//! Web layer for the bus arrival integration.
//!
//! A JSON API standing in for the host UI: config and options flows,
//! entry management, and sensor states.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
