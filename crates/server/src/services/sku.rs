//! Collision-avoiding SKU allocation.
//!
//! A SKU candidate is derived from the product name (4-character uppercase
//! prefix) plus a random 4-digit suffix. Candidates are checked against the
//! persistence layer before use, but that check is only an optimization: the
//! database's unique index on `sku` is the real guarantee, and the catalog
//! service retries allocation when an insert loses the race.

use rand::Rng;

use catalog_core::Sku;

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;

/// Consecutive collisions beyond this count are treated as an internal
/// fault rather than looping forever. The key space (10,000 suffixes per
/// prefix) makes this implausible outside of a bug or a saturated prefix.
const MAX_COLLISIONS: u32 = 50;

/// Errors that can occur during SKU allocation.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// Too many consecutive collisions; something is wrong.
    #[error("sku allocation exhausted after {MAX_COLLISIONS} collisions")]
    Exhausted,

    /// The existence check failed.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// The persistence-side existence check the allocator needs.
///
/// A seam so allocation is testable without a database; implemented by
/// [`ProductRepository`].
pub trait SkuDirectory {
    /// Whether a SKU is already taken at check time.
    fn sku_exists(
        &self,
        sku: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

impl SkuDirectory for ProductRepository<'_> {
    async fn sku_exists(&self, sku: &str) -> Result<bool, RepositoryError> {
        Self::sku_exists(self, sku).await
    }
}

/// Allocates unique SKUs against a directory of existing keys.
pub struct SkuAllocator<D> {
    directory: D,
}

impl<D: SkuDirectory> SkuAllocator<D> {
    /// Create a new allocator over a SKU directory.
    pub const fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Allocate a SKU that is unused at check time.
    ///
    /// Not atomic against concurrent allocators; the caller must treat a
    /// unique violation at insert time as "allocate again", not an error.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError::Exhausted` after an implausible number of
    /// consecutive collisions, or `AllocationError::Repository` if the
    /// existence check fails.
    pub async fn allocate(&self, seed: &str) -> Result<Sku, AllocationError> {
        let prefix = derive_prefix(seed);

        for _ in 0..MAX_COLLISIONS {
            let candidate = format!("{prefix}{:04}", random_suffix());

            if !self.directory.sku_exists(&candidate).await? {
                let sku = Sku::parse(&candidate).map_err(|_| AllocationError::Exhausted)?;
                return Ok(sku);
            }
        }

        Err(AllocationError::Exhausted)
    }
}

/// Derive the fixed 4-character prefix from a seed text.
///
/// Whitespace and punctuation are dropped, letters uppercased, and short
/// seeds padded with `X`.
fn derive_prefix(seed: &str) -> String {
    let mut prefix: String = seed
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(4)
        .collect();

    while prefix.len() < 4 {
        prefix.push('X');
    }

    prefix
}

/// A random numeric suffix in `0000..=9999`.
fn random_suffix() -> u32 {
    rand::rng().random_range(0..10_000)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    /// In-memory directory standing in for the product table.
    struct MemoryDirectory {
        taken: Mutex<HashSet<String>>,
    }

    impl MemoryDirectory {
        fn new() -> Self {
            Self {
                taken: Mutex::new(HashSet::new()),
            }
        }

        fn insert(&self, sku: &str) {
            self.taken.lock().unwrap().insert(sku.to_owned());
        }
    }

    impl SkuDirectory for &MemoryDirectory {
        async fn sku_exists(&self, sku: &str) -> Result<bool, RepositoryError> {
            Ok(self.taken.lock().unwrap().contains(sku))
        }
    }

    /// A directory where every candidate is already taken.
    struct SaturatedDirectory;

    impl SkuDirectory for SaturatedDirectory {
        async fn sku_exists(&self, _sku: &str) -> Result<bool, RepositoryError> {
            Ok(true)
        }
    }

    #[test]
    fn test_derive_prefix() {
        assert_eq!(derive_prefix("Mouse"), "MOUS");
        assert_eq!(derive_prefix("  gaming mouse "), "GAMI");
        assert_eq!(derive_prefix("tv"), "TVXX");
        assert_eq!(derive_prefix(""), "XXXX");
        assert_eq!(derive_prefix("4K-TV!"), "4KTV");
    }

    #[tokio::test]
    async fn test_allocate_shape() {
        let dir = MemoryDirectory::new();
        let allocator = SkuAllocator::new(&dir);

        let sku = allocator.allocate("Mouse").await.unwrap();
        assert_eq!(sku.as_str().len(), 8);
        assert!(sku.as_str().starts_with("MOUS"));
        assert!(sku.as_str()[4..].bytes().all(|b| b.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_allocate_pairwise_distinct() {
        let dir = MemoryDirectory::new();
        let allocator = SkuAllocator::new(&dir);

        let mut seen = HashSet::new();
        for _ in 0..100 {
            let sku = allocator.allocate("Mouse").await.unwrap();
            // Simulate the persistence write that follows each allocation.
            dir.insert(sku.as_str());
            assert!(seen.insert(sku.as_str().to_owned()), "duplicate sku: {sku}");
        }
    }

    #[tokio::test]
    async fn test_allocate_skips_taken_candidates() {
        let dir = MemoryDirectory::new();
        // Occupy most of the suffix space for this prefix.
        for n in 0..9_000 {
            dir.insert(&format!("MOUS{n:04}"));
        }

        let allocator = SkuAllocator::new(&dir);
        let sku = allocator.allocate("Mouse").await.unwrap();
        assert!(!dir.taken.lock().unwrap().contains(sku.as_str()));
    }

    #[tokio::test]
    async fn test_allocate_exhaustion_is_bounded() {
        let allocator = SkuAllocator::new(SaturatedDirectory);
        let result = allocator.allocate("Mouse").await;
        assert!(matches!(result, Err(AllocationError::Exhausted)));
    }
}
