//! Catalog mutation and listing orchestration.
//!
//! Every mutation runs the same sequence: authorize, persist, and only after
//! the write is acknowledged, invalidate the listing cache. A failed write
//! never invalidates. Reads of the customer listing go through
//! [`CatalogCache`] and repopulate lazily.

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{instrument, warn};

use catalog_core::{CategoryId, ProductId, Sku, UserId};

use crate::cache::{CatalogCache, ListingKey};
use crate::db::RepositoryError;
use crate::db::categories::CategoryRepository;
use crate::db::products::ProductRepository;
use crate::models::{Category, Product, ProductPatch};

use super::sku::{AllocationError, SkuAllocator};
use super::token::Identity;

/// Insert attempts before a SKU race is escalated as an internal fault.
const MAX_INSERT_ATTEMPTS: u32 = 3;

/// Confirmation message returned after a successful delete.
pub const DELETE_CONFIRMATION: &str = "Product deleted successfully";

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Caller is not allowed to mutate this entry.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// SKU allocation gave up.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validated input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub category_id: CategoryId,
}

/// Orchestrates catalog mutations and the cached customer listing.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    categories: CategoryRepository<'a>,
    allocator: SkuAllocator<ProductRepository<'a>>,
    cache: &'a CatalogCache,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a CatalogCache) -> Self {
        Self {
            products: ProductRepository::new(pool),
            categories: CategoryRepository::new(pool),
            allocator: SkuAllocator::new(ProductRepository::new(pool)),
            cache,
        }
    }

    /// Create a product owned by the caller.
    ///
    /// Allocates a SKU optimistically: if the insert loses a race on the
    /// unique index, allocation is retried rather than surfacing the
    /// conflict to the caller.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the referenced category does not
    /// exist, `CatalogError::Allocation` if the key space is exhausted.
    #[instrument(skip(self, input), fields(caller = %caller.id, category = %input.category_id))]
    pub async fn create(
        &self,
        input: NewProduct,
        caller: Identity,
    ) -> Result<Product, CatalogError> {
        self.categories
            .get_by_id(input.category_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("category {}", input.category_id)))?;

        let input = &input;
        let product = insert_with_reallocation(
            || self.allocator.allocate(&input.name),
            |sku: Sku| async move {
                self.products
                    .create(
                        &input.name,
                        &sku,
                        input.quantity,
                        input.price,
                        caller.id,
                        input.category_id,
                    )
                    .await
            },
        )
        .await?;

        // Only after the write is acknowledged. A new active entry can
        // affect any filtered view, so drop them all.
        self.cache.invalidate_all().await;

        Ok(product)
    }

    /// Apply a partial update to a product.
    ///
    /// Fields absent from the patch keep their current values.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product (or a newly
    /// referenced category) does not exist, `CatalogError::Forbidden` if the
    /// caller is neither the owner nor an administrator.
    #[instrument(skip(self, patch), fields(caller = %caller.id, product = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
        caller: Identity,
    ) -> Result<Product, CatalogError> {
        let existing = self
            .products
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;

        authorize_mutation(&existing, caller)?;

        if let Some(category_id) = patch.category_id
            && self.categories.get_by_id(category_id).await?.is_none()
        {
            return Err(CatalogError::NotFound(format!("category {category_id}")));
        }

        let updated = self.products.update(id, &patch).await?;
        self.cache.invalidate_all().await;

        Ok(updated)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Same ownership rule as [`update`](Self::update).
    #[instrument(skip(self), fields(caller = %caller.id, product = %id))]
    pub async fn delete(
        &self,
        id: ProductId,
        caller: Identity,
    ) -> Result<&'static str, CatalogError> {
        let existing = self
            .products
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;

        authorize_mutation(&existing, caller)?;

        self.products.delete(id).await?;
        self.cache.invalidate_all().await;

        Ok(DELETE_CONFIRMATION)
    }

    /// The cached customer listing of active products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if both the cached load and the
    /// direct fallback query fail.
    pub async fn list_available(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Arc<Vec<Product>>, CatalogError> {
        let products = &self.products;
        let entries = self
            .cache
            .get_or_load(ListingKey::from(category), || async move {
                products.find_available(category).await
            })
            .await?;

        Ok(entries)
    }

    /// Products owned by the calling seller. Not cached.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_owned(&self, owner: UserId) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.find_by_owner(owner).await?)
    }

    /// Every product, optionally filtered by seller (admin view). Not cached.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_all(&self, seller: Option<UserId>) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list_all(seller).await?)
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.categories.list_all().await?)
    }
}

/// Run the allocate-then-insert sequence, re-allocating when an insert
/// loses a SKU race.
///
/// The client never chose the SKU, so a unique violation on `sku` is never
/// surfaced as a conflict: each one triggers a fresh allocation, and once
/// the attempt budget is spent the failure escalates as allocation
/// exhaustion. Any other insert error passes through untouched.
async fn insert_with_reallocation<A, AF, I, IF>(
    allocate: A,
    insert: I,
) -> Result<Product, CatalogError>
where
    A: Fn() -> AF,
    AF: Future<Output = Result<Sku, AllocationError>>,
    I: Fn(Sku) -> IF,
    IF: Future<Output = Result<Product, RepositoryError>>,
{
    for attempt in 1..=MAX_INSERT_ATTEMPTS {
        let sku = allocate().await?;

        match insert(sku).await {
            Ok(product) => return Ok(product),
            Err(e) if e.is_conflict() => {
                warn!(attempt, "sku taken by concurrent writer, reallocating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(CatalogError::Allocation(AllocationError::Exhausted))
}

/// The single ownership/role decision for catalog mutations.
///
/// Administrators bypass the ownership check; everyone else may only touch
/// entries they own.
fn authorize_mutation(product: &Product, caller: Identity) -> Result<(), CatalogError> {
    if caller.role.is_administrator() || product.owner_id == caller.id {
        Ok(())
    } else {
        Err(CatalogError::Forbidden(
            "you do not have permission to modify this product".to_owned(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use catalog_core::Role;

    use super::*;

    fn fresh_sku() -> Result<Sku, AllocationError> {
        Ok(Sku::parse("MOUS0001").unwrap())
    }

    fn owned_by(owner: i32) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            name: "Mouse".to_owned(),
            sku: Sku::parse("MOUS1234").unwrap(),
            quantity: 10,
            price: Decimal::new(2999, 2),
            owner_id: UserId::new(owner),
            category_id: CategoryId::new(2),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn identity(id: i32, role: Role) -> Identity {
        Identity {
            id: UserId::new(id),
            role,
        }
    }

    #[test]
    fn test_owner_may_mutate() {
        let product = owned_by(5);
        assert!(authorize_mutation(&product, identity(5, Role::Seller)).is_ok());
    }

    #[test]
    fn test_administrator_bypasses_ownership() {
        let product = owned_by(5);
        assert!(authorize_mutation(&product, identity(99, Role::Administrator)).is_ok());
    }

    #[test]
    fn test_other_seller_is_forbidden() {
        let product = owned_by(5);
        let result = authorize_mutation(&product, identity(6, Role::Seller));
        assert!(matches!(result, Err(CatalogError::Forbidden(_))));
    }

    #[test]
    fn test_customer_is_forbidden_even_with_matching_id() {
        // A customer who somehow shares the owner's id is still the owner by
        // the rule; the role gate at the route keeps customers out of the
        // mutation endpoints entirely.
        let product = owned_by(5);
        assert!(authorize_mutation(&product, identity(5, Role::Customer)).is_ok());

        let result = authorize_mutation(&product, identity(7, Role::Customer));
        assert!(matches!(result, Err(CatalogError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_insert_retries_after_losing_sku_race() {
        let attempts = AtomicUsize::new(0);

        let product = insert_with_reallocation(
            || async { fresh_sku() },
            |_sku: Sku| async {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(RepositoryError::Conflict("sku already exists".to_owned()))
                } else {
                    Ok(owned_by(5))
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(product.owner_id, UserId::new(5));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_persistent_sku_conflicts_escalate_as_exhaustion() {
        // Conflicts on every attempt, the last one included, must surface
        // as an internal allocation fault rather than a caller-visible
        // conflict on a key the caller never chose.
        let attempts = AtomicUsize::new(0);

        let result = insert_with_reallocation(
            || async { fresh_sku() },
            |_sku: Sku| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(RepositoryError::Conflict("sku already exists".to_owned()))
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(CatalogError::Allocation(AllocationError::Exhausted))
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_conflict_insert_errors_are_not_retried() {
        let attempts = AtomicUsize::new(0);

        let result = insert_with_reallocation(
            || async { fresh_sku() },
            |_sku: Sku| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(RepositoryError::DataCorruption("boom".to_owned()))
            },
        )
        .await;

        assert!(matches!(result, Err(CatalogError::Repository(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());
        let patch = ProductPatch {
            price: Some(Decimal::new(999, 2)),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
