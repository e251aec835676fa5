//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the playback core:
//! - Logging and tracing initialization
//! - Runtime error type
//!
//! ## Overview
//!
//! This crate establishes the logging conventions used throughout the
//! system. Application hosts call [`logging::init_logging`] once at
//! startup; library crates only ever use the `tracing` macros.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
