//! # Veil Common Library
//!
//! Shared code for Veil services including:
//! - Event types (VeilEvent enum) and the broadcast EventBus
//! - SSE stream helpers
//! - Configuration file discovery and loading
//! - Human-readable size formatting

pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod sse;

pub use error::{Error, Result};
