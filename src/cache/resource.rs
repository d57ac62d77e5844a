// In-memory resource cache with fetch coalescing.
// Resolves images by key, fetching and decoding on a miss.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use image::{DynamicImage, GenericImageView};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{GistError, Result};

/// Network collaborator that downloads the raw bytes behind a key.
pub trait ResourceFetcher: Send + Sync + 'static {
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

impl<T: ResourceFetcher> ResourceFetcher for Arc<T> {
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send {
        (**self).fetch_bytes(url)
    }
}

/// A decoded image. Cloning is cheap and clones share the pixels.
#[derive(Debug, Clone)]
pub struct Image(Arc<DynamicImage>);

impl Image {
    /// Decode an encoded payload (PNG, JPEG, GIF...).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self(Arc::new(image)))
    }

    pub fn width(&self) -> u32 {
        self.0.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.0.dimensions().1
    }

    /// Whether both handles point at the same decoded image.
    #[cfg(test)]
    pub fn same_as(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

type PendingFetch = Shared<BoxFuture<'static, std::result::Result<Image, Arc<GistError>>>>;

struct Inner<F> {
    fetcher: F,
    entries: RwLock<HashMap<String, Image>>,
    in_flight: Mutex<HashMap<String, PendingFetch>>,
}

/// Key-addressed image cache with a fetch-if-absent contract.
///
/// Concurrent [`resolve`](Self::resolve) calls for a missing key join a single
/// in-flight fetch. The fetch runs on its own task and stores the image before
/// any waiter is woken, so it completes even if every caller goes away.
/// Failures are never cached.
pub struct ResourceCache<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for ResourceCache<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: ResourceFetcher> ResourceCache<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                entries: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Cached image for `key`, without touching the network.
    pub fn get(&self, key: &str) -> Option<Image> {
        self.inner.entries.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Number of fetches currently pending.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    /// Whether a fetch for `key` is pending.
    pub fn is_pending(&self, key: &str) -> bool {
        self.inner.in_flight.lock().contains_key(key)
    }

    /// Return the image for `key`, fetching and caching it on a miss.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn resolve(&self, key: &str) -> Result<Image> {
        if let Some(image) = self.get(key) {
            debug!(key, "image cache hit");
            return Ok(image);
        }

        let pending = {
            let mut in_flight = self.inner.in_flight.lock();
            // A fetch may have stored the entry between the miss above and taking the lock.
            if let Some(image) = self.get(key) {
                return Ok(image);
            }
            match in_flight.get(key) {
                Some(pending) => {
                    debug!(key, "joining in-flight image fetch");
                    pending.clone()
                }
                None => {
                    debug!(key, "image cache miss, fetching");
                    let pending = self.spawn_fetch(key);
                    in_flight.insert(key.to_string(), pending.clone());
                    pending
                }
            }
        };

        pending.await.map_err(GistError::Shared)
    }

    fn spawn_fetch(&self, key: &str) -> PendingFetch {
        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_string();
        let task = tokio::spawn(async move {
            let result = match inner.fetcher.fetch_bytes(&owned_key).await {
                Ok(bytes) => Image::decode(&bytes),
                Err(e) => Err(e),
            };
            match &result {
                Ok(image) => {
                    inner
                        .entries
                        .write()
                        .entry(owned_key.clone())
                        .or_insert_with(|| image.clone());
                }
                Err(e) => warn!(key = %owned_key, error = %e, "image fetch failed"),
            }
            inner.in_flight.lock().remove(&owned_key);
            result.map_err(Arc::new)
        });

        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_string();
        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    inner.in_flight.lock().remove(&owned_key);
                    Err(Arc::new(GistError::Other(format!("image fetch task failed: {}", e))))
                }
            }
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    /// Serves scripted responses per call and counts calls.
    struct ScriptedFetcher {
        calls: AtomicUsize,
        delay: Duration,
        responses: Box<dyn Fn(usize) -> Result<Vec<u8>> + Send + Sync>,
    }

    impl ScriptedFetcher {
        fn new(responses: impl Fn(usize) -> Result<Vec<u8>> + Send + Sync + 'static) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                responses: Box::new(responses),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ResourceFetcher for ScriptedFetcher {
        async fn fetch_bytes(&self, _url: &str) -> Result<Vec<u8>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            (self.responses)(call)
        }
    }

    fn fetch_error() -> GistError {
        GistError::Http {
            status: 500,
            body: "boom".to_string(),
        }
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        // First call returns bytes, any later call errors.
        let fetcher = Arc::new(ScriptedFetcher::new(|call| {
            if call == 0 {
                Ok(png_bytes(4, 3))
            } else {
                Err(fetch_error())
            }
        }));
        let cache = ResourceCache::new(Arc::clone(&fetcher));

        let first = cache.resolve("img1").await.unwrap();
        assert_eq!((first.width(), first.height()), (4, 3));

        let second = cache.resolve("img1").await.unwrap();
        assert!(second.same_as(&first));
        assert_eq!(fetcher.calls(), 1);
        assert!(cache.get("img1").is_some());
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_fetch() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(|_| Ok(png_bytes(2, 2))).with_delay(Duration::from_millis(50)),
        );
        let cache = ResourceCache::new(Arc::clone(&fetcher));

        let results =
            futures::future::join_all((0..8).map(|_| cache.resolve("https://a/avatar"))).await;

        assert_eq!(fetcher.calls(), 1);
        let images: Vec<Image> = results.into_iter().map(|r| r.unwrap()).collect();
        assert!(images.iter().all(|img| img.same_as(&images[0])));
        assert_eq!(cache.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_waiters_all_observe_failure() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(|_| Err(fetch_error())).with_delay(Duration::from_millis(20)),
        );
        let cache = ResourceCache::new(Arc::clone(&fetcher));

        let results = futures::future::join_all((0..4).map(|_| cache.resolve("k"))).await;

        assert_eq!(fetcher.calls(), 1);
        assert!(results.iter().all(|r| r.is_err()));
    }

    #[tokio::test]
    async fn test_spawned_resolves_share_one_fetch() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(|_| Ok(png_bytes(1, 1))).with_delay(Duration::from_millis(50)),
        );
        let cache = ResourceCache::new(Arc::clone(&fetcher));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.resolve("shared").await.is_ok() })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let fetcher = Arc::new(ScriptedFetcher::new(|call| {
            if call == 0 {
                Err(fetch_error())
            } else {
                Ok(png_bytes(1, 1))
            }
        }));
        let cache = ResourceCache::new(Arc::clone(&fetcher));

        assert!(cache.resolve("k").await.is_err());
        assert!(!cache.contains("k"));

        assert!(cache.resolve("k").await.is_ok());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_decode_error_and_retried() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_| Ok(b"<html>nope</html>".to_vec())));
        let cache = ResourceCache::new(Arc::clone(&fetcher));

        let err = cache.resolve("k").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
        assert!(cache.is_empty());

        assert!(cache.resolve("k").await.is_err());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_completes_when_caller_gives_up() {
        let fetcher = Arc::new(
            ScriptedFetcher::new(|_| Ok(png_bytes(1, 1))).with_delay(Duration::from_millis(30)),
        );
        let cache = ResourceCache::new(Arc::clone(&fetcher));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(1), cache.resolve("late")).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(cache.contains("late"));
        assert!(cache.resolve("late").await.is_ok());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let fetcher = Arc::new(ScriptedFetcher::new(|_| Ok(png_bytes(1, 1))));
        let cache = ResourceCache::new(Arc::clone(&fetcher));

        cache.resolve("a").await.unwrap();
        cache.resolve("b").await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(fetcher.calls(), 2);
    }
}
