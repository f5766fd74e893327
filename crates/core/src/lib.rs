//! Mebel Core - Shared domain types.
//!
//! This crate provides the types shared by every Mebel component:
//! - `storefront` - Catalogue store, basket persistence and the JSON API
//! - `cli` - Offline tools for checking catalogue documents and baskets
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no storage. Basket arithmetic lives here so it can be tested
//! without a store around it.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, category keys, catalogue records, the basket
//!   and call-back request validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
