//! Core types for the Mebel storefront.
//!
//! This module provides type-safe wrappers for catalogue and basket concepts.

pub mod basket;
pub mod category;
pub mod contact;
pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use basket::{Basket, BasketEntry, QuantityChange};
pub use category::{
    ALL_KEY, ALL_PRODUCTS_KEY, Category, CategoryRequest, DESCRIPTORS_KEY, UnknownCategory,
    WORKS_KEY, normalize_key,
};
pub use contact::{CallbackRequest, FieldErrors, ValidCallback};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{CategoryDescriptor, Colors, DEFAULT_IMAGE, Listed, ProductRecord, WorkItem};
