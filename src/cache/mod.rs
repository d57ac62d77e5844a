// Cache module for remote resources.
// Keeps decoded avatars in memory for the lifetime of the cache instance.

pub mod resource;

pub use resource::{Image, ResourceCache, ResourceFetcher};
