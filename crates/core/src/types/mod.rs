//! Core types for the catalog backend.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;
pub mod sku;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::Role;
pub use sku::{Sku, SkuError};
