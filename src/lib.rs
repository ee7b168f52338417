#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod escalation;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod persistence;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
