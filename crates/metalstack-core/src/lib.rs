//! Core types, configuration, and helpers shared by the MetalStack services.
//!
//! This crate provides the building blocks used by both the storage server
//! and the DHCP responder: environment-driven configuration, the core error
//! type, and a handful of small collection helpers.

mod config;
mod error;
pub mod lists;

pub use config::MetalStackConfig;
pub use error::{MetalStackError, MetalStackResult};
pub use lists::{contains, sorted_keys, unique_strings};
