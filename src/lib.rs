//! Client-side goal progress, goal acknowledgment and daily reminders for
//! the habits API.

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod goals;
pub mod models;
pub mod overview;
pub mod reminders;
pub mod worker;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ClientError, ClientResult};
