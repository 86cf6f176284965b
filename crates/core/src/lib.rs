//! Chefport Core - Shared types library.
//!
//! This crate provides common types used across all Chefport components:
//! - `bot` - Checkout dialog backend driven by the messaging transport
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no
//! HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, phone
//!   numbers, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
