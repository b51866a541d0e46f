//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive a generator
//! run and helpers to load configuration from disk.

mod load;
mod schema;

pub use load::load_settings;
pub use schema::*;
