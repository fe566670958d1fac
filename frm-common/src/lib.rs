//! # FRM Common Library
//!
//! Shared code for the Flood Relief Mapper services including:
//! - Error types
//! - Configuration file discovery and root folder resolution
//! - Text record parsing (path-length log, place metadata)

pub mod config;
pub mod error;
pub mod records;

pub use error::{Error, Result};
