//! Credential cache contract and the built-in in-memory implementation.
//!
//! The cache holds one bearer credential per client identity under [`ACCESS_TOKEN_KEY`].
//! Entries carry an absolute expiry derived from the TTL passed to
//! [`CredentialCache::set`]; once it elapses the entry must read as absent.

pub mod clock;
pub mod memory;

pub use clock::*;
pub use memory::MemoryCache;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Cache key under which the process-wide access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "cel_cash:access_token";

/// Future returned by [`CredentialCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Key-value cache with per-entry TTL used to share bearer credentials.
pub trait CredentialCache
where
	Self: Send + Sync,
{
	/// Returns the live value stored under `key`, if any.
	fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<TokenSecret>>;

	/// Stores `value` under `key`, replacing any entry and resetting its expiry to `ttl`.
	fn set<'a>(&'a self, key: &'a str, value: TokenSecret, ttl: Duration) -> CacheFuture<'a, ()>;
}

/// Error type produced by [`CredentialCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CacheError {
	/// Backend-level failure for the cache engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
