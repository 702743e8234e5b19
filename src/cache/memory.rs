//! Thread-safe in-memory [`CredentialCache`] implementation for single-process deployments and tests.

// crates.io
use time::PrimitiveDateTime;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	cache::{CacheError, CacheFuture, Clock, CredentialCache, SystemClock},
};

type CacheMap = Arc<RwLock<HashMap<String, CacheEntry>>>;

#[derive(Clone, Debug)]
struct CacheEntry {
	value: TokenSecret,
	expires_at: OffsetDateTime,
}
impl CacheEntry {
	fn is_live(&self, now: OffsetDateTime) -> bool {
		self.expires_at > now
	}
}

/// Process-local cache; expired entries are evicted lazily on read.
#[derive(Clone, Debug)]
pub struct MemoryCache {
	entries: CacheMap,
	clock: Arc<dyn Clock>,
}
impl MemoryCache {
	/// Creates a cache driven by `clock`.
	pub fn with_clock(clock: impl 'static + Clock) -> Self {
		Self { entries: Default::default(), clock: Arc::new(clock) }
	}

	/// Number of live entries.
	pub fn len(&self) -> usize {
		let now = self.clock.now();

		self.entries.read().values().filter(|entry| entry.is_live(now)).count()
	}

	/// Returns true if no live entry exists.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn get_now(map: CacheMap, key: &str, now: OffsetDateTime) -> Option<TokenSecret> {
		{
			let guard = map.read();

			match guard.get(key) {
				Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
				Some(_) => (),
				None => return None,
			}
		}

		let mut guard = map.write();

		// Re-check under the write lock; a writer may have replaced the entry.
		if guard.get(key).is_some_and(|entry| !entry.is_live(now)) {
			guard.remove(key);
		}

		guard.get(key).map(|entry| entry.value.clone())
	}

	fn set_now(map: CacheMap, key: &str, value: TokenSecret, ttl: Duration, now: OffsetDateTime) {
		let expires_at = now.checked_add(ttl).unwrap_or(PrimitiveDateTime::MAX.assume_utc());

		map.write().insert(key.to_owned(), CacheEntry { value, expires_at });
	}
}
impl Default for MemoryCache {
	fn default() -> Self {
		Self::with_clock(SystemClock)
	}
}
impl CredentialCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<TokenSecret>> {
		let map = self.entries.clone();
		let now = self.clock.now();

		Box::pin(async move { Ok::<_, CacheError>(Self::get_now(map, key, now)) })
	}

	fn set<'a>(&'a self, key: &'a str, value: TokenSecret, ttl: Duration) -> CacheFuture<'a, ()> {
		let map = self.entries.clone();
		let now = self.clock.now();

		Box::pin(async move {
			Self::set_now(map, key, value, ttl, now);

			Ok(())
		})
	}
}
