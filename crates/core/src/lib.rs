//! DigiVault Core - Shared types library.
//!
//! This crate provides common types used across all DigiVault components:
//! - `storefront` - The cart/checkout purchase pipeline
//! - `integration-tests` - Cross-component scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails,
//!   order references, and license keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
