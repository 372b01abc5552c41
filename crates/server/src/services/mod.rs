//! Business logic over the repository layer.

pub mod auth;
pub mod catalog;
pub mod sku;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService, NewProduct};
pub use sku::{AllocationError, SkuAllocator, SkuDirectory};
pub use token::{Identity, TokenService};
