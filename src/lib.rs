//! fetchbin library
//!
//! This library provides the core functionality for the `fetchbin` CLI:
//! downloading a distributable artifact, inferring its packaging format,
//! unpacking archives, and installing the contained binary.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
