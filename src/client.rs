//! Resource clients built from a contract and a shared fetcher.
//!
//! A [`ResourceClient`] holds nothing but two `Arc`s, so it is cheap to build per request.
//! Every call validates its input against the operation descriptor before anything reaches
//! the fetcher.

// crates.io
use ::http::HeaderMap;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	contract::ResourceContract,
	error::TransportError,
	fetcher::AuthenticatedFetcher,
	http::{self, CallOptions, HttpTransport},
};

/// Response body after the status-keyed schema check.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
	/// Status has a declared schema and the body satisfied it.
	Validated(Value),
	/// Status has no declared schema; the body is returned as received.
	Passthrough(Value),
}
impl ResponseBody {
	/// Body value.
	pub fn value(&self) -> &Value {
		match self {
			ResponseBody::Validated(value) | ResponseBody::Passthrough(value) => value,
		}
	}

	/// Consumes the wrapper.
	pub fn into_value(self) -> Value {
		match self {
			ResponseBody::Validated(value) | ResponseBody::Passthrough(value) => value,
		}
	}
}

/// Result of one resource call.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	status: u16,
	headers: HeaderMap,
	body: ResponseBody,
}
impl ApiResponse {
	pub(crate) fn new(status: u16, headers: HeaderMap, body: ResponseBody) -> Self {
		Self { status, headers, body }
	}

	/// HTTP status.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Header value as text, if present and visible ASCII.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// `Retry-After` hint.
	pub fn retry_after(&self) -> Option<Duration> {
		http::parse_retry_after(&self.headers)
	}

	/// Body value, validated or not.
	pub fn body(&self) -> &Value {
		self.body.value()
	}

	/// Body with its validation marker.
	pub fn response_body(&self) -> &ResponseBody {
		&self.body
	}

	/// Returns true if the body was checked against a declared schema.
	pub fn is_validated(&self) -> bool {
		matches!(self.body, ResponseBody::Validated(_))
	}

	/// Returns the validated body, or [`Error::UnexpectedStatus`] for passthrough responses.
	pub fn expect_declared(self) -> Result<Value> {
		match self.body {
			ResponseBody::Validated(value) => Ok(value),
			ResponseBody::Passthrough(body) => Err(Error::UnexpectedStatus { status: self.status, body }),
		}
	}

	/// Decodes the validated body into `T`.
	pub fn json<T>(self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let status = self.status;
		let value = self.expect_declared()?;

		serde_path_to_error::deserialize(value)
			.map_err(|source| TransportError::ResponseDecode { status, source }.into())
	}
}

/// Untyped call input.
#[derive(Clone, Debug, Default)]
pub struct ApiRequest {
	/// Path params keyed by placeholder name; `null` means none.
	pub path_params: Value,
	/// Query object.
	pub query: Option<Value>,
	/// Body object.
	pub body: Option<Value>,
	/// Timeout and cancellation.
	pub options: CallOptions,
}
impl ApiRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the path params.
	pub fn path_params(mut self, params: Value) -> Self {
		self.path_params = params;

		self
	}

	/// Sets the query.
	pub fn query(mut self, query: Value) -> Self {
		self.query = Some(query);

		self
	}

	/// Sets the body.
	pub fn body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Sets the call options.
	pub fn options(mut self, options: CallOptions) -> Self {
		self.options = options;

		self
	}
}

/// Stateless client exposing every operation of one resource.
pub struct ResourceClient<T>
where
	T: ?Sized + HttpTransport,
{
	contract: Arc<ResourceContract>,
	fetcher: Arc<AuthenticatedFetcher<T>>,
}
impl<T> ResourceClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Binds `contract` to `fetcher`.
	pub fn new(contract: Arc<ResourceContract>, fetcher: Arc<AuthenticatedFetcher<T>>) -> Self {
		Self { contract, fetcher }
	}

	/// Resource contract.
	pub fn contract(&self) -> &ResourceContract {
		&self.contract
	}

	/// Declared operation names.
	pub fn operations(&self) -> impl Iterator<Item = &str> {
		self.contract.operations().map(|op| op.name())
	}

	/// Validates `request` against `operation` and sends it.
	pub async fn call(&self, operation: &str, request: ApiRequest) -> Result<ApiResponse> {
		let descriptor =
			self.contract.operation(operation).ok_or_else(|| Error::UnknownOperation {
				resource: self.contract.name().to_owned(),
				operation: operation.to_owned(),
			})?;
		let ApiRequest { path_params, query, body, options } = request;
		let prepared = descriptor.prepare(&path_params, query.as_ref(), body.as_ref())?;

		self.fetcher.call(descriptor, prepared, options).await
	}
}
impl<T> Clone for ResourceClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { contract: self.contract.clone(), fetcher: self.fetcher.clone() }
	}
}
impl<T> Debug for ResourceClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResourceClient").field("resource", &self.contract.name()).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Cancelled {
		#[serde(rename = "type")]
		ok: bool,
	}

	#[test]
	fn json_requires_a_declared_status() {
		let passthrough = ApiResponse::new(
			404,
			HeaderMap::new(),
			ResponseBody::Passthrough(json!({ "error": "missing" })),
		);
		let err = passthrough.json::<Cancelled>().expect_err("Passthrough bodies are not typed.");

		assert!(matches!(err, Error::UnexpectedStatus { status: 404, .. }));

		let validated =
			ApiResponse::new(200, HeaderMap::new(), ResponseBody::Validated(json!({ "type": true })));

		assert!(validated.is_validated());
		assert!(validated.json::<Cancelled>().expect("Declared body should decode.").ok);
	}

	#[test]
	fn decode_failures_carry_the_field_path() {
		let response =
			ApiResponse::new(200, HeaderMap::new(), ResponseBody::Validated(json!({ "type": 1 })));
		let err = response.json::<Cancelled>().expect_err("Integer is not a boolean.");

		match err {
			Error::Transport(TransportError::ResponseDecode { status, source }) => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "type");
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
