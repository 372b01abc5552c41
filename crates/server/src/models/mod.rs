//! Domain models for the catalog server.

pub mod product;
pub mod user;

pub use product::{Category, Product, ProductPatch};
pub use user::User;
