//! Token acquisition: trades the client credentials for a short-lived bearer token.

// crates.io
use ::http::{HeaderMap, header::AUTHORIZATION};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, ScopeSet, TokenSecret},
	contract::OperationDescriptor,
	error::AuthenticationError,
	http::{self, CallOptions, HttpTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
	resources::auth::{self as auth_contract, GRANT_TYPE},
};

/// Bearer credential returned by a successful exchange.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Credential {
	/// Opaque bearer token.
	pub access_token: TokenSecret,
	/// Lifetime in seconds, as reported by the gateway.
	pub expires_in: u64,
}
impl Credential {
	/// Lifetime as a cache TTL.
	pub fn ttl(&self) -> Duration {
		Duration::seconds(i64::try_from(self.expires_in).unwrap_or(i64::MAX))
	}
}

/// `auth.token` exchange bound to one client identity and its fixed scope list.
#[derive(Clone, Debug)]
pub struct TokenExchange {
	descriptor: OperationDescriptor,
	credentials: ClientCredentials,
	scopes: ScopeSet,
}
impl TokenExchange {
	/// Binds the exchange contract to `credentials`, requesting `scopes` on every call.
	pub fn new(credentials: ClientCredentials, scopes: ScopeSet) -> Result<Self> {
		// Credentials must form a valid header value.
		credentials.basic_authorization()?;

		Ok(Self { descriptor: auth_contract::token()?, credentials, scopes })
	}

	/// Client identity used on the exchange.
	pub fn credentials(&self) -> &ClientCredentials {
		&self.credentials
	}

	/// Scopes sent on every exchange.
	pub fn scopes(&self) -> &ScopeSet {
		&self.scopes
	}

	/// Performs one exchange; nothing is cached here and no retry is attempted.
	pub async fn acquire<T>(
		&self,
		transport: &T,
		base_url: &Url,
		options: &CallOptions,
	) -> Result<Credential>
	where
		T: ?Sized + HttpTransport,
	{
		let span = CallSpan::new(CallKind::TokenExchange, auth_contract::TOKEN);

		obs::record_call_outcome(CallKind::TokenExchange, CallOutcome::Attempt);

		let result = span.instrument(self.acquire_inner(transport, base_url, options)).await;
		let outcome = if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure };

		obs::record_call_outcome(CallKind::TokenExchange, outcome);

		result
	}

	async fn acquire_inner<T>(
		&self,
		transport: &T,
		base_url: &Url,
		options: &CallOptions,
	) -> Result<Credential>
	where
		T: ?Sized + HttpTransport,
	{
		let body = json!({ "grant_type": GRANT_TYPE, "scope": self.scopes });
		let prepared = self.descriptor.prepare(&Value::Null, None, Some(&body))?;
		let method = prepared.method();
		let path = prepared.path().to_string();
		let mut headers = HeaderMap::new();

		headers.insert(AUTHORIZATION, self.credentials.basic_authorization()?);

		let request = prepared.into_http_request(base_url, headers)?;

		obs::request_started(&method, &path);

		let response = match http::dispatch(transport, request, options).await {
			Ok(response) => response,
			Err(e) => {
				obs::request_failed(&method, &path, &e);

				return Err(e.into());
			},
		};
		let status = response.status.as_u16();

		obs::request_finished(&method, &path, status);

		let credential = match self.read_credential(status, &response.body) {
			Ok(credential) => credential,
			Err(e) => {
				obs::request_failed(&method, &path, &e);

				return Err(e.into());
			},
		};

		obs::token_acquired(credential.expires_in);

		Ok(credential)
	}

	fn read_credential(&self, status: u16, body: &[u8]) -> Result<Credential, AuthenticationError> {
		if status != 200 {
			return Err(AuthenticationError::Rejected {
				status,
				body: String::from_utf8_lossy(body).into_owned(),
			});
		}

		let decoded = decode_token_body(status, body)?;
		let validated = match self.descriptor.validate_response(status, &decoded) {
			Some(Ok(validated)) => validated,
			Some(Err(source)) => return Err(AuthenticationError::InvalidTokenResponse { source }),
			None => decoded,
		};

		serde_path_to_error::deserialize(validated)
			.map_err(|source| AuthenticationError::MalformedTokenResponse { status, source })
	}
}

fn decode_token_body(status: u16, body: &[u8]) -> Result<Value, AuthenticationError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| AuthenticationError::MalformedTokenResponse { status, source })
}
