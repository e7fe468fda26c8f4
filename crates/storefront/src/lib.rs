//! DigiVault storefront pipeline library.
//!
//! This crate implements the state-bearing core of the DigiVault digital
//! goods marketplace: everything between "user clicks add to cart" and
//! "user holds a license key".
//!
//! # Architecture
//!
//! - [`session`] - Gates cart and checkout on an authenticated user
//! - [`cart`] - Authoritative cart with optimistic add/remove and rollback
//! - [`checkout`] - Review / payment-selection / authorization state machine
//! - [`orders`] - Order synthesis and license-key issuance
//! - [`market`] - Remote collaborators: session, catalog, and cart REST
//!   surfaces, as traits plus one `reqwest` implementation
//!
//! Presentation (pages, cards, styling) lives elsewhere; this crate only
//! exposes the state and operations views read through.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod market;
pub mod models;
pub mod orders;
pub mod session;
pub mod telemetry;
