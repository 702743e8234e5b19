//! Client-level error types shared across contracts, the token pipeline, and transports.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Each variant is a distinct failure category so callers can tell a rejected credential
/// exchange apart from a malformed request or a dropped connection.
#[derive(Debug, ThisError)]
pub enum Error {
	/// An operation descriptor or resource contract is malformed.
	#[error(transparent)]
	Contract(#[from] crate::contract::ContractDefinitionError),
	/// Caller-supplied input failed schema validation; no request was sent.
	#[error(transparent)]
	Validation(#[from] crate::schema::ValidationError),
	/// The token exchange did not yield a usable credential.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Network failure, cancellation, timeout, or a response that broke its contract.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Credential cache failure.
	#[error("{0}")]
	Cache(
		#[from]
		#[source]
		crate::cache::CacheError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// No resource with the given name is registered.
	#[error("Resource `{resource}` is not registered.")]
	UnknownResource {
		/// Requested resource name.
		resource: String,
	},
	/// The resource does not declare the requested operation.
	#[error("Resource `{resource}` does not declare the `{operation}` operation.")]
	UnknownOperation {
		/// Resource name.
		resource: String,
		/// Requested operation name.
		operation: String,
	},
	/// The gateway answered with a status that has no declared schema.
	///
	/// Only produced when the caller asks for a declared shape; plain calls pass these
	/// responses through untouched.
	#[error("Gateway returned undeclared status {status}.")]
	UnexpectedStatus {
		/// HTTP status code returned by the gateway.
		status: u16,
		/// Raw response body.
		body: Value,
	},
}

/// Token exchange failures.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// The token endpoint answered with a non-200 status.
	#[error("Token endpoint rejected the client credentials with status {status}.")]
	Rejected {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Response body, decoded lossily as UTF-8.
		body: String,
	},
	/// The token endpoint answered 200 with a body that could not be decoded.
	#[error("Token endpoint returned a malformed body.")]
	MalformedTokenResponse {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Structured decoding failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The token endpoint answered 200 with a body that does not match the token schema.
	#[error("Token endpoint response does not match the token schema.")]
	InvalidTokenResponse {
		/// Validation failure.
		#[source]
		source: crate::schema::ValidationError,
	},
}

/// Configuration and construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingVariable {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds an unparsable value.
	#[error("Environment variable `{name}` holds an invalid value.")]
	InvalidVariable {
		/// Variable name.
		name: &'static str,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than http or https.
	#[error("Base URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Offending scheme.
		scheme: String,
	},
	/// Base URL cannot carry path segments.
	#[error("Base URL `{url}` cannot be used as a base.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Scope list cannot be normalized.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// A header value contains bytes HTTP does not allow.
	#[error("Header value is invalid.")]
	InvalidHeader(#[from] ::http::header::InvalidHeaderValue),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures and responses that break their declared contract.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the gateway.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the gateway.")]
	Io(#[from] std::io::Error),
	/// The call exceeded its timeout.
	#[error("Gateway call timed out.")]
	TimedOut,
	/// The caller cancelled the call.
	#[error("Gateway call was cancelled.")]
	Cancelled,
	/// Request body could not be encoded.
	#[error("Request body could not be encoded.")]
	Encode {
		/// Encoding failure.
		#[source]
		source: serde_json::Error,
	},
	/// A declared status came back with a body that is not JSON.
	#[error("Gateway returned a non-JSON body for status {status}.")]
	MalformedBody {
		/// HTTP status code.
		status: u16,
		/// Parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// A declared status came back with a body that does not match its schema.
	#[error("Gateway response for status {status} does not match its schema.")]
	ResponseValidation {
		/// HTTP status code.
		status: u16,
		/// Validation failure.
		#[source]
		source: crate::schema::ValidationError,
	},
	/// A validated body could not be decoded into the requested type.
	#[error("Gateway response for status {status} could not be decoded.")]
	ResponseDecode {
		/// HTTP status code.
		status: u16,
		/// Structured decoding failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::TimedOut } else { Self::network(e) }
	}
}
