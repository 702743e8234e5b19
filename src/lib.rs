//! Typed Cel Cash (Galax Pay) client: declarative operation contracts, validated requests,
//! and a token-caching bearer pipeline in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod facade;
pub mod fetcher;
pub mod http;
pub mod obs;
pub mod resources;
pub mod schema;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::{_prelude::*, facade::ReqwestCelCash};

	// self
	use crate::{
		cache::{CredentialCache, MemoryCache},
		config::CelCashConfig,
		http::ReqwestTransport,
	};

	/// Client id used by test configurations.
	pub const TEST_CLIENT_ID: &str = "5473";
	/// Client secret used by test configurations.
	pub const TEST_CLIENT_HASH: &str = "83Mw5u8988Qj6fZqS4Z8K7LzOo1j28S706R0BeFe";

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Configuration pointing at `base_url` with the test credentials.
	pub fn test_config(base_url: &str) -> CelCashConfig {
		CelCashConfig::new(base_url, TEST_CLIENT_ID, TEST_CLIENT_HASH)
			.expect("Test configuration should be valid.")
	}

	/// Constructs a client backed by `cache` and the reqwest transport used across
	/// integration tests.
	pub fn build_test_client_with_cache(
		config: &CelCashConfig,
		cache: Arc<MemoryCache>,
	) -> ReqwestCelCash {
		let shared: Arc<dyn CredentialCache> = cache;

		ReqwestCelCash::with_transport(config, test_reqwest_transport(), shared)
			.expect("Test client should build.")
	}

	/// Constructs a client backed by a fresh in-memory cache.
	pub fn build_test_client(config: &CelCashConfig) -> (ReqwestCelCash, Arc<MemoryCache>) {
		let cache = Arc::new(MemoryCache::default());

		(build_test_client_with_cache(config, cache.clone()), cache)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value, json};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};

pub use crate::{
	config::CelCashConfig,
	error::{Error, Result},
	facade::CelCash,
};
#[cfg(feature = "reqwest")] pub use crate::facade::ReqwestCelCash;
