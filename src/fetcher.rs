//! Authenticated fetcher: resolves a bearer token, sends the call, and checks the response.
//!
//! Token resolution reads [`ACCESS_TOKEN_KEY`] from the shared [`CredentialCache`]. On a miss
//! the fetcher runs the token exchange and stores the credential with a TTL equal to its
//! reported lifetime. With single-flight enabled (the default) concurrent misses queue behind
//! a per-key async mutex and re-check the cache, so one exchange serves all of them. With it
//! disabled, concurrent misses each exchange and the last write wins.
//!
//! A rejected resource call never invalidates the cached token and is never retried.

// std
use std::time::Duration as StdDuration;
// crates.io
use ::http::{HeaderMap, header::AUTHORIZATION};
// self
use crate::{
	_prelude::*,
	auth::{TokenExchange, TokenSecret},
	cache::{ACCESS_TOKEN_KEY, CredentialCache},
	client::{ApiResponse, ResponseBody},
	contract::{OperationDescriptor, PreparedRequest},
	error::TransportError,
	http::{self, CallOptions, HttpResponse, HttpTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Wraps a transport with token resolution, bearer headers, and response validation.
pub struct AuthenticatedFetcher<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	cache: Arc<dyn CredentialCache>,
	exchange: TokenExchange,
	base_url: Url,
	default_timeout: Option<StdDuration>,
	single_flight: bool,
	flow_guards: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}
impl<T> AuthenticatedFetcher<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a fetcher with single-flight token resolution enabled.
	pub fn new(
		transport: impl Into<Arc<T>>,
		cache: Arc<dyn CredentialCache>,
		exchange: TokenExchange,
		base_url: Url,
	) -> Self {
		Self {
			transport: transport.into(),
			cache,
			exchange,
			base_url,
			default_timeout: None,
			single_flight: true,
			flow_guards: Default::default(),
		}
	}

	/// Enables or disables single-flight token resolution.
	pub fn with_single_flight(mut self, enabled: bool) -> Self {
		self.single_flight = enabled;

		self
	}

	/// Sets the timeout applied when a call does not carry its own.
	pub fn with_default_timeout(mut self, timeout: Option<StdDuration>) -> Self {
		self.default_timeout = timeout;

		self
	}

	/// Gateway base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Shared credential cache.
	pub fn cache(&self) -> &Arc<dyn CredentialCache> {
		&self.cache
	}

	/// Underlying transport.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Token exchange used on cache misses.
	pub fn exchange(&self) -> &TokenExchange {
		&self.exchange
	}

	/// Returns a live bearer token, exchanging credentials when the cache has none.
	pub async fn access_token(&self, options: &CallOptions) -> Result<TokenSecret> {
		if let Some(token) = self.cached_token().await? {
			return Ok(token);
		}
		if !self.single_flight {
			return self.acquire_and_store(options).await;
		}

		let guard = self.flow_guard(ACCESS_TOKEN_KEY);
		let _singleflight = guard.lock().await;

		if let Some(token) = self.cached_token().await? {
			return Ok(token);
		}

		self.acquire_and_store(options).await
	}

	/// Sends a prepared request with a bearer header and validates the response.
	pub async fn call(
		&self,
		descriptor: &OperationDescriptor,
		prepared: PreparedRequest,
		options: CallOptions,
	) -> Result<ApiResponse> {
		let options = options.or_timeout(self.default_timeout);
		let span = CallSpan::new(CallKind::Resource, descriptor.name());

		obs::record_call_outcome(CallKind::Resource, CallOutcome::Attempt);

		let result = span.instrument(self.call_inner(descriptor, prepared, &options)).await;
		let outcome = if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure };

		obs::record_call_outcome(CallKind::Resource, outcome);

		result
	}

	async fn call_inner(
		&self,
		descriptor: &OperationDescriptor,
		prepared: PreparedRequest,
		options: &CallOptions,
	) -> Result<ApiResponse> {
		let token = self.access_token(options).await?;
		let method = prepared.method();
		let path = prepared.path().to_string();
		let mut headers = HeaderMap::new();

		headers.insert(AUTHORIZATION, token.bearer_header()?);

		let request = prepared.into_http_request(&self.base_url, headers)?;

		obs::request_started(&method, &path);

		let response = match http::dispatch(self.transport.as_ref(), request, options).await {
			Ok(response) => response,
			Err(e) => {
				obs::request_failed(&method, &path, &e);

				return Err(e.into());
			},
		};
		let HttpResponse { status, headers, body } = response;
		let status = status.as_u16();

		obs::request_finished(&method, &path, status);

		match read_body(descriptor, status, &body) {
			Ok(body) => Ok(ApiResponse::new(status, headers, body)),
			Err(e) => {
				obs::request_failed(&method, &path, &e);

				Err(e.into())
			},
		}
	}

	async fn cached_token(&self) -> Result<Option<TokenSecret>> {
		let token = self.cache.get(ACCESS_TOKEN_KEY).await?;

		obs::token_cache_lookup(token.is_some());
		obs::record_token_cache_lookup(token.is_some());

		Ok(token)
	}

	async fn acquire_and_store(&self, options: &CallOptions) -> Result<TokenSecret> {
		let options = options.clone().or_timeout(self.default_timeout);
		let credential =
			self.exchange.acquire(self.transport.as_ref(), &self.base_url, &options).await?;

		self.cache.set(ACCESS_TOKEN_KEY, credential.access_token.clone(), credential.ttl()).await?;

		Ok(credential.access_token)
	}

	fn flow_guard(&self, key: &str) -> Arc<AsyncMutex<()>> {
		let mut guards = self.flow_guards.lock();

		guards.entry(key.to_owned()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl<T> Debug for AuthenticatedFetcher<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedFetcher")
			.field("base_url", &self.base_url.as_str())
			.field("client_id", &self.exchange.credentials().client_id)
			.field("default_timeout", &self.default_timeout)
			.field("single_flight", &self.single_flight)
			.finish()
	}
}

/// Decodes the body and validates it against the schema declared for `status`.
///
/// Empty bodies read as `null`. Bodies that are not JSON fail at declared statuses and pass
/// through as a string otherwise.
fn read_body(
	descriptor: &OperationDescriptor,
	status: u16,
	body: &[u8],
) -> Result<ResponseBody, TransportError> {
	let declared = descriptor.response(status).is_some();
	let raw = if body.iter().all(u8::is_ascii_whitespace) {
		Value::Null
	} else {
		match serde_json::from_slice::<Value>(body) {
			Ok(value) => value,
			Err(source) if declared => return Err(TransportError::MalformedBody { status, source }),
			Err(_) => Value::String(String::from_utf8_lossy(body).into_owned()),
		}
	};

	match descriptor.validate_response(status, &raw) {
		Some(Ok(validated)) => Ok(ResponseBody::Validated(validated)),
		Some(Err(source)) => Err(TransportError::ResponseValidation { status, source }),
		None => Ok(ResponseBody::Passthrough(raw)),
	}
}
