// Cache module for local filesystem caching.
// Stores drupal.org responses and patch files keyed by URL hash.

pub mod paths;
pub mod store;

pub use paths::default_cache_dir;
pub use store::CacheStore;
