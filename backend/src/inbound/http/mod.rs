//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod rides;
pub mod schemas;
pub mod state;
pub mod token_config;

pub use error::ApiResult;
