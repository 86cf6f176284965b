//! Chefport bot library.
//!
//! This crate provides the checkout dialog backend as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Store contracts are consumed through static dispatch only.
#![allow(async_fn_in_trait)]

pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod stores;
