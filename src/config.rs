//! Client configuration.
//!
//! ## Environment Variables
//! - `CEL_CASH_BASE_URL`: gateway base URL, e.g. `https://api.sandbox.cel.cash/v2`
//! - `CEL_CASH_ID`: client id
//! - `CEL_CASH_HASH`: client secret
//! - `CEL_CASH_TIMEOUT_SECS`: optional default call timeout in whole seconds, must be positive
//! - `CEL_CASH_SCOPES`: optional comma- or space-separated scope override
//! - `CEL_CASH_SINGLE_FLIGHT`: optional `true`/`false`, defaults to `true`

// std
use std::time::Duration as StdDuration;
// crates.io
use serde::{Deserializer, de::Error as _};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, ScopeSet, TokenSecret},
	error::ConfigError,
};

/// Environment variable holding the base URL.
pub const ENV_BASE_URL: &str = "CEL_CASH_BASE_URL";
/// Environment variable holding the client id.
pub const ENV_ID: &str = "CEL_CASH_ID";
/// Environment variable holding the client secret.
pub const ENV_HASH: &str = "CEL_CASH_HASH";
/// Environment variable holding the default timeout.
pub const ENV_TIMEOUT_SECS: &str = "CEL_CASH_TIMEOUT_SECS";
/// Environment variable overriding the requested scopes.
pub const ENV_SCOPES: &str = "CEL_CASH_SCOPES";
/// Environment variable toggling single-flight token resolution.
pub const ENV_SINGLE_FLIGHT: &str = "CEL_CASH_SINGLE_FLIGHT";

/// Settings for one gateway client identity.
#[derive(Clone, Debug, Deserialize)]
pub struct CelCashConfig {
	/// Gateway base URL; operation paths are appended below it.
	pub base_url: Url,
	/// Client id.
	#[serde(alias = "id")]
	pub client_id: String,
	/// Client secret.
	#[serde(alias = "hash")]
	pub client_secret: TokenSecret,
	/// Scopes requested on every exchange.
	#[serde(default = "ScopeSet::capabilities")]
	pub scopes: ScopeSet,
	/// Default call timeout; read from `timeout_secs` when deserialized.
	#[serde(default, rename = "timeout_secs", deserialize_with = "deserialize_timeout_secs")]
	pub default_timeout: Option<StdDuration>,
	/// Whether concurrent cache misses share one exchange.
	#[serde(default = "default_single_flight")]
	pub single_flight: bool,
}
impl CelCashConfig {
	/// Creates a configuration with the full capability scope list and single-flight enabled.
	pub fn new(
		base_url: &str,
		client_id: impl Into<String>,
		client_secret: impl Into<TokenSecret>,
	) -> Result<Self, ConfigError> {
		let config = Self {
			base_url: Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scopes: ScopeSet::capabilities(),
			default_timeout: None,
			single_flight: default_single_flight(),
		};

		config.validate()?;

		Ok(config)
	}

	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads the configuration through `lookup`, which maps a variable name to its value.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let require = |name: &'static str| {
			lookup(name)
				.filter(|value| !value.trim().is_empty())
				.ok_or(ConfigError::MissingVariable { name })
		};
		let mut config =
			Self::new(&require(ENV_BASE_URL)?, require(ENV_ID)?, require(ENV_HASH)?)?;

		if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
			let secs = raw
				.trim()
				.parse::<u64>()
				.ok()
				.filter(|secs| *secs > 0)
				.ok_or(ConfigError::InvalidVariable { name: ENV_TIMEOUT_SECS })?;

			config.default_timeout = Some(StdDuration::from_secs(secs));
		}
		if let Some(raw) = lookup(ENV_SCOPES) {
			config.scopes = raw.parse()?;
		}
		if let Some(raw) = lookup(ENV_SINGLE_FLIGHT) {
			config.single_flight = match raw.trim().to_ascii_lowercase().as_str() {
				"1" | "true" | "yes" => true,
				"0" | "false" | "no" => false,
				_ => return Err(ConfigError::InvalidVariable { name: ENV_SINGLE_FLIGHT }),
			};
		}

		Ok(config)
	}

	/// Overrides the requested scopes.
	pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = scopes;

		self
	}

	/// Sets the default call timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.default_timeout = Some(timeout);

		self
	}

	/// Enables or disables single-flight token resolution.
	pub fn with_single_flight(mut self, enabled: bool) -> Self {
		self.single_flight = enabled;

		self
	}

	/// Default call timeout.
	pub fn timeout(&self) -> Option<StdDuration> {
		self.default_timeout
	}

	/// Client id + secret pair.
	pub fn credentials(&self) -> ClientCredentials {
		ClientCredentials::new(self.client_id.clone(), self.client_secret.clone())
	}

	/// Ensures the base URL can carry operation paths over http(s).
	pub fn validate(&self) -> Result<(), ConfigError> {
		match self.base_url.scheme() {
			"http" | "https" => (),
			scheme => return Err(ConfigError::UnsupportedScheme { scheme: scheme.to_owned() }),
		}

		if self.base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeABase { url: self.base_url.to_string() });
		}

		Ok(())
	}
}

fn default_single_flight() -> bool {
	true
}

fn deserialize_timeout_secs<'de, D>(deserializer: D) -> Result<Option<StdDuration>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<u64>::deserialize(deserializer)? {
		Some(0) => Err(D::Error::custom("timeout_secs must be positive")),
		secs => Ok(secs.map(StdDuration::from_secs)),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
		move |name| vars.iter().find(|(key, _)| *key == name).map(|(_, value)| (*value).to_owned())
	}

	#[test]
	fn from_lookup_reads_required_and_optional_variables() {
		let config = CelCashConfig::from_lookup(lookup(&[
			(ENV_BASE_URL, "https://api.sandbox.cel.cash/v2"),
			(ENV_ID, "5473"),
			(ENV_HASH, "secret"),
			(ENV_TIMEOUT_SECS, "15"),
			(ENV_SINGLE_FLIGHT, "false"),
		]))
		.expect("Configuration should load.");

		assert_eq!(config.base_url.as_str(), "https://api.sandbox.cel.cash/v2");
		assert_eq!(config.client_id, "5473");
		assert_eq!(config.client_secret.expose(), "secret");
		assert_eq!(config.timeout(), Some(StdDuration::from_secs(15)));
		assert!(!config.single_flight);
		assert_eq!(config.scopes, ScopeSet::capabilities());
	}

	#[test]
	fn missing_and_invalid_variables_are_reported() {
		let err = CelCashConfig::from_lookup(lookup(&[(ENV_BASE_URL, "https://api.cel.cash/v2")]))
			.expect_err("Missing id should fail.");

		assert!(matches!(err, ConfigError::MissingVariable { name: ENV_ID }));

		let err = CelCashConfig::from_lookup(lookup(&[
			(ENV_BASE_URL, "https://api.cel.cash/v2"),
			(ENV_ID, "1"),
			(ENV_HASH, "2"),
			(ENV_TIMEOUT_SECS, "soon"),
		]))
		.expect_err("Non-numeric timeout should fail.");

		assert!(matches!(err, ConfigError::InvalidVariable { name: ENV_TIMEOUT_SECS }));

		let err = CelCashConfig::from_lookup(lookup(&[
			(ENV_BASE_URL, "https://api.cel.cash/v2"),
			(ENV_ID, "1"),
			(ENV_HASH, "2"),
			(ENV_TIMEOUT_SECS, "0"),
		]))
		.expect_err("A zero timeout should fail.");

		assert!(matches!(err, ConfigError::InvalidVariable { name: ENV_TIMEOUT_SECS }));
	}

	#[test]
	fn sub_second_timeouts_are_kept_exactly() {
		let config = CelCashConfig::new("https://api.cel.cash/v2", "1", "2")
			.expect("Config should build.")
			.with_timeout(StdDuration::from_millis(500));

		assert_eq!(config.timeout(), Some(StdDuration::from_millis(500)));
	}

	#[test]
	fn deserialized_timeouts_are_whole_positive_seconds() {
		let config: CelCashConfig = serde_json::from_value(json!({
			"base_url": "https://api.cel.cash/v2",
			"id": "5473",
			"hash": "secret",
			"timeout_secs": 3,
		}))
		.expect("Config should deserialize.");

		assert_eq!(config.timeout(), Some(StdDuration::from_secs(3)));
		assert!(
			serde_json::from_value::<CelCashConfig>(json!({
				"base_url": "https://api.cel.cash/v2",
				"id": "5473",
				"hash": "secret",
				"timeout_secs": 0,
			}))
			.is_err()
		);
	}

	#[test]
	fn base_url_must_be_http() {
		let err = CelCashConfig::new("ftp://api.cel.cash", "1", "2").expect_err("FTP should fail.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { .. }));
		assert!(matches!(
			CelCashConfig::new("not a url", "1", "2"),
			Err(ConfigError::InvalidBaseUrl { .. }),
		));
	}

	#[test]
	fn deserializes_gateway_field_aliases() {
		let config: CelCashConfig = serde_json::from_value(json!({
			"base_url": "https://api.cel.cash/v2",
			"id": "5473",
			"hash": "secret",
		}))
		.expect("Config should deserialize.");

		assert!(config.single_flight);
		assert_eq!(config.scopes.len(), crate::auth::CAPABILITY_SCOPES.len());
		assert!(!format!("{config:?}").contains("\"secret\""));
	}
}
