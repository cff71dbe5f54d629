//! # Codeshift Common Library
//!
//! Shared code for the codeshift migration service:
//! - Database models and API payload types
//! - Event types (CodeshiftEvent enum) and the EventBus
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{Error, Result};
