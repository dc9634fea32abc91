//! Content ports - the local file set and the bucket it is synced to

use std::io;
use std::path::PathBuf;

use crate::error::ProviderError;

/// One file to be published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentObject {
    /// Object key, `/`-separated and relative to the content root
    pub key: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Enumerates and reads the local content directory
pub trait ContentSource: Send + Sync {
    /// Every publishable object, sorted by key
    fn list(&self) -> io::Result<Vec<ContentObject>>;

    fn read(&self, object: &ContentObject) -> io::Result<Vec<u8>>;
}

/// Destination bucket for content uploads
pub trait ObjectStore: Send + Sync {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), ProviderError>;
}

/// Edge cache invalidation
pub trait CacheInvalidator: Send + Sync {
    /// Request invalidation of `paths`; returns the provider's invalidation id
    fn invalidate(
        &self,
        distribution_id: &str,
        paths: &[String],
        caller_reference: &str,
    ) -> Result<String, ProviderError>;
}
