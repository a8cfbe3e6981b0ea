//! # tbx Common Library
//!
//! Shared code for the tbx services:
//! - Error and result types
//! - TOML configuration model and loading
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
