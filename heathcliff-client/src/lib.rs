//! HEATHCLIFF client library exports.

pub mod api_client;
pub mod command;
pub mod config;
pub mod error;
