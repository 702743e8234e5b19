//! Transport seam between the fetcher and an HTTP stack.
//!
//! [`HttpTransport`] is the client's only dependency on an HTTP implementation: it takes a
//! fully built [`HttpRequest`] and yields the raw [`HttpResponse`]. Per-call timeouts and
//! cancellation are applied around the transport by [`CallOptions`], so custom transports
//! do not need to implement either. [`ReqwestTransport`] is the default implementation.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
use std::time::Duration as StdDuration;
// crates.io
use ::http::{HeaderMap, Method, StatusCode, header::RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
pub use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, error::TransportError};

/// Future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing gateway calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared behind an
/// `Arc` by the fetcher and every resource client built from it.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and returns the response, whatever its status.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Fully built outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Request headers, authorization included.
	pub headers: HeaderMap,
	/// Encoded JSON body.
	pub body: Option<Vec<u8>>,
}

/// Raw response as returned by the transport.
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw body bytes.
	pub body: Vec<u8>,
}

/// Per-call timeout and cancellation signal.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
	/// Upper bound for the transport call; the client default applies when unset.
	pub timeout: Option<StdDuration>,
	/// Token that aborts the call when cancelled.
	pub cancellation: Option<CancellationToken>,
}
impl CallOptions {
	/// Sets the timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sets the cancellation token.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = Some(token);

		self
	}

	/// Fills in `default` when no timeout was set.
	pub fn or_timeout(mut self, default: Option<StdDuration>) -> Self {
		if self.timeout.is_none() {
			self.timeout = default;
		}

		self
	}
}

/// Sends `request`, racing it against the call's timeout and cancellation token.
pub(crate) async fn dispatch<T>(
	transport: &T,
	request: HttpRequest,
	options: &CallOptions,
) -> Result<HttpResponse, TransportError>
where
	T: ?Sized + HttpTransport,
{
	let timed = async {
		match options.timeout {
			Some(limit) => tokio::time::timeout(limit, transport.send(request))
				.await
				.map_err(|_| TransportError::TimedOut)?,
			None => transport.send(request).await,
		}
	};

	match &options.cancellation {
		Some(token) => tokio::select! {
			biased;
			_ = token.cancelled() => Err(TransportError::Cancelled),
			result = timed => result,
		},
		None => timed.await,
	}
}

/// Parses a `Retry-After` header expressed in seconds or as an RFC 2822 date.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose own timeout matches `timeout`.
	pub fn with_timeout(timeout: Option<StdDuration>) -> Result<Self, crate::error::ConfigError> {
		let mut builder = ReqwestClient::builder();

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let HttpRequest { method, url, headers, body } = request;
			let mut builder = client.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, headers, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug)]
	struct Stalled;
	impl HttpTransport for Stalled {
		fn send(&self, _: HttpRequest) -> TransportFuture<'_> {
			Box::pin(async {
				tokio::time::sleep(StdDuration::from_secs(30)).await;

				Err(TransportError::Network { source: "unreachable".into() })
			})
		}
	}

	fn request() -> HttpRequest {
		HttpRequest {
			method: Method::GET,
			url: Url::parse("https://api.sandbox.cel.cash/v2/transactions").expect("URL should parse."),
			headers: HeaderMap::new(),
			body: None,
		}
	}

	#[tokio::test]
	async fn timeout_and_cancellation_map_to_distinct_errors() {
		let options = CallOptions::default().with_timeout(StdDuration::from_millis(20));
		let err = dispatch(&Stalled, request(), &options).await.expect_err("Call should time out.");

		assert!(matches!(err, TransportError::TimedOut));

		let token = CancellationToken::new();

		token.cancel();

		let options = CallOptions::default().with_cancellation(token);
		let err = dispatch(&Stalled, request(), &options).await.expect_err("Call should be cancelled.");

		assert!(matches!(err, TransportError::Cancelled));
	}

	#[test]
	fn explicit_timeouts_win_over_defaults() {
		let explicit = CallOptions::default()
			.with_timeout(StdDuration::from_secs(1))
			.or_timeout(Some(StdDuration::from_secs(9)));

		assert_eq!(explicit.timeout, Some(StdDuration::from_secs(1)));
		assert_eq!(
			CallOptions::default().or_timeout(Some(StdDuration::from_secs(9))).timeout,
			Some(StdDuration::from_secs(9)),
		);
	}

	#[test]
	fn retry_after_accepts_seconds() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, "120".parse().expect("Header should parse."));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(120)));
		assert_eq!(parse_retry_after(&HeaderMap::new()), None);
	}
}
