//! Long-lived client identity used on the token exchange.

// crates.io
use ::http::HeaderValue;
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Client id + secret pair issued by the gateway (`ID` and `HASH`).
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
	/// Public client identifier.
	pub client_id: String,
	/// Client secret (the gateway calls it the hash).
	pub client_secret: TokenSecret,
}
impl ClientCredentials {
	/// Creates a credential pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<TokenSecret>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into() }
	}

	/// Builds the sensitive `Basic base64(id:secret)` authorization header.
	pub fn basic_authorization(&self) -> Result<HeaderValue, ConfigError> {
		let encoded =
			STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret.expose()));
		let mut value = HeaderValue::try_from(format!("Basic {encoded}"))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn basic_authorization_encodes_id_and_hash() {
		let credentials = ClientCredentials::new("5473", "83Mw5u8988Qj6fZqS4Z8K7LzOo1j28S706R0BeFe");
		let header = credentials.basic_authorization().expect("Header should build.");

		assert_eq!(
			header.to_str().expect("Header should be ASCII."),
			"Basic NTQ3Mzo4M013NXU4OTg4UWo2ZlpxUzRaOEs3THpPbzFqMjhTNzA2UjBCZUZl",
		);
		assert!(header.is_sensitive());
		assert!(!format!("{credentials:?}").contains("83Mw5u"));
	}
}
