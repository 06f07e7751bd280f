//! Reels Core Library
//!
//! This crate provides core domain models, error types, and configuration
//! shared across all Reels components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::ReelsConfig;
pub use error::{AppError, LogLevel};
