//! Key Policy Module
//!
//! Maps logical data categories to cache keys and default TTLs.
//!
//! The policy is a stateless table passed by reference wherever it is
//! needed, so tests can substitute alternate category tables.

use crate::expiration::CacheExpiration;

// == Cache Category ==
/// Logical category of cached data.
///
/// Parameterized categories fold every identity-changing parameter into the
/// derived key, so two descriptors with different parameters never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    /// Catalog item list
    Items,
    /// Product records
    Products,
    /// User records
    Users,
    /// Paginated book search results
    BookSearch {
        /// Search query text
        query: String,
        /// Page offset of the results
        start_index: u32,
    },
}

// == Key Policy ==
/// Derives cache keys and default expirations for data categories.
///
/// Implementations must be pure and deterministic: the same category
/// descriptor always yields the same key string.
pub trait KeyPolicy: Send + Sync {
    /// Returns the cache key for a category.
    fn cache_key(&self, category: &CacheCategory) -> String;

    /// Returns the default expiration for a category.
    fn expiration(&self, category: &CacheCategory) -> CacheExpiration;
}

// == Default Key Policy ==
/// Built-in category table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKeyPolicy;

impl KeyPolicy for DefaultKeyPolicy {
    fn cache_key(&self, category: &CacheCategory) -> String {
        match category {
            CacheCategory::Items => "cached_items".to_string(),
            CacheCategory::Products => "cached_products".to_string(),
            CacheCategory::Users => "cached_users".to_string(),
            CacheCategory::BookSearch { query, start_index } => {
                format!("cached_books_{}_{}", query, start_index)
            }
        }
    }

    fn expiration(&self, category: &CacheCategory) -> CacheExpiration {
        match category {
            CacheCategory::Items => CacheExpiration::Minutes(30.0),
            CacheCategory::Products => CacheExpiration::Hours(1.0),
            CacheCategory::Users => CacheExpiration::Days(1.0),
            CacheCategory::BookSearch { .. } => CacheExpiration::Minutes(30.0),
        }
    }
}
