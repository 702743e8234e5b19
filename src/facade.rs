//! Entry point composing the registry, the credential cache, and the fetcher.

// self
use crate::{
	_prelude::*,
	auth::TokenExchange,
	cache::CredentialCache,
	client::ResourceClient,
	config::CelCashConfig,
	contract::{ContractRegistry, ResourceContract},
	fetcher::AuthenticatedFetcher,
	http::HttpTransport,
	resources::{self, transactions::{self, Transactions}},
};
#[cfg(feature = "reqwest")]
use crate::{cache::MemoryCache, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestCelCash = CelCash<ReqwestTransport>;

/// Gateway client: one per client identity.
///
/// Resource clients handed out by [`transactions`](Self::transactions) and
/// [`resource`](Self::resource) share the fetcher, so they share its cached token.
pub struct CelCash<T>
where
	T: ?Sized + HttpTransport,
{
	registry: Arc<ContractRegistry>,
	fetcher: Arc<AuthenticatedFetcher<T>>,
}
impl<T> CelCash<T>
where
	T: ?Sized + HttpTransport,
{
	/// Builds a client over a caller-provided transport and cache.
	pub fn with_transport(
		config: &CelCashConfig,
		transport: impl Into<Arc<T>>,
		cache: Arc<dyn CredentialCache>,
	) -> Result<Self> {
		config.validate()?;

		let exchange = TokenExchange::new(config.credentials(), config.scopes.clone())?;
		let fetcher = AuthenticatedFetcher::new(transport, cache, exchange, config.base_url.clone())
			.with_single_flight(config.single_flight)
			.with_default_timeout(config.timeout());

		Ok(Self { registry: Arc::new(resources::registry()?), fetcher: Arc::new(fetcher) })
	}

	/// Registry of every declared resource.
	pub fn registry(&self) -> &ContractRegistry {
		&self.registry
	}

	/// Shared authenticated fetcher.
	pub fn fetcher(&self) -> &Arc<AuthenticatedFetcher<T>> {
		&self.fetcher
	}

	/// Untyped client for the named resource.
	pub fn resource(&self, name: &str) -> Result<ResourceClient<T>> {
		let contract = self
			.registry
			.resource(name)
			.ok_or_else(|| Error::UnknownResource { resource: name.to_owned() })?;

		Ok(self.client_for(contract))
	}

	/// Typed transactions client.
	pub fn transactions(&self) -> Result<Transactions<T>> {
		Ok(Transactions::new(self.resource(transactions::RESOURCE)?))
	}

	fn client_for(&self, contract: Arc<ResourceContract>) -> ResourceClient<T> {
		ResourceClient::new(contract, self.fetcher.clone())
	}
}
#[cfg(feature = "reqwest")]
impl CelCash<ReqwestTransport> {
	/// Builds a reqwest-backed client with an in-memory credential cache.
	pub fn new(config: &CelCashConfig) -> Result<Self> {
		let transport = ReqwestTransport::with_timeout(config.timeout())?;

		Self::with_transport(config, transport, Arc::new(MemoryCache::default()))
	}
}
impl<T> Clone for CelCash<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { registry: self.registry.clone(), fetcher: self.fetcher.clone() }
	}
}
impl<T> Debug for CelCash<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CelCash")
			.field("resources", &self.registry.resources().collect::<Vec<_>>())
			.field("fetcher", &self.fetcher)
			.finish()
	}
}
