//! Core types for DigiVault.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod license;
pub mod price;
pub mod reference;

pub use email::{Email, EmailError};
pub use id::*;
pub use license::{LicenseKey, LicenseKeyError, LicenseStatus};
pub use price::Price;
pub use reference::{OrderReference, OrderReferenceError};
