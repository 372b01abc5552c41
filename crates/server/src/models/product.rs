//! Product and category models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use catalog_core::{CategoryId, ProductId, Sku, UserId};

/// One sellable catalog entry.
///
/// `sku` is assigned once at creation and never changes; `owner_id` ties the
/// product to the seller who created it and never changes either. `is_active`
/// gates visibility in the cached customer listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: Sku,
    pub quantity: i32,
    pub price: Decimal,
    pub owner_id: UserId,
    pub category_id: CategoryId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A partial update to a product.
///
/// Fields left as `None` keep their current values. The SKU and owner are
/// immutable and deliberately absent here.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub is_active: Option<bool>,
}

impl ProductPatch {
    /// Whether the patch changes anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.price.is_none()
            && self.category_id.is_none()
            && self.is_active.is_none()
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
