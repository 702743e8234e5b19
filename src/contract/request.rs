// crates.io
use ::http::{
	HeaderMap, HeaderValue,
	header::{ACCEPT, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	contract::{HttpMethod, ResolvedPath},
	error::{ConfigError, TransportError},
	http::HttpRequest,
};

const APPLICATION_JSON: &str = "application/json";

/// Validated request context for one operation call.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
	method: HttpMethod,
	path: ResolvedPath,
	query: Vec<(String, String)>,
	body: Option<Value>,
}
impl PreparedRequest {
	pub(crate) fn new(
		method: HttpMethod,
		path: ResolvedPath,
		query: Option<&Value>,
		body: Option<Value>,
	) -> Self {
		Self { method, path, query: query.map(encode_query).unwrap_or_default(), body }
	}

	/// HTTP method.
	pub fn method(&self) -> HttpMethod {
		self.method
	}

	/// Resolved path (relative to the gateway base URL).
	pub fn path(&self) -> &ResolvedPath {
		&self.path
	}

	/// Encoded query pairs, ordered by key.
	pub fn query(&self) -> &[(String, String)] {
		&self.query
	}

	/// Normalized JSON body.
	pub fn body(&self) -> Option<&Value> {
		self.body.as_ref()
	}

	/// Builds the absolute URL below `base_url`, keeping any path the base already carries.
	pub fn url(&self, base_url: &Url) -> Result<Url, ConfigError> {
		let mut url = base_url.clone();

		{
			let mut segments = url
				.path_segments_mut()
				.map_err(|_| ConfigError::CannotBeABase { url: base_url.to_string() })?;

			segments.pop_if_empty().extend(self.path.segments());
		}

		if self.query.is_empty() {
			url.set_query(None);
		} else {
			url.query_pairs_mut().clear().extend_pairs(&self.query);
		}

		Ok(url)
	}

	/// Converts the request into a transport-level request with JSON headers attached.
	pub fn into_http_request(self, base_url: &Url, mut headers: HeaderMap) -> Result<HttpRequest> {
		let url = self.url(base_url)?;
		let body = self
			.body
			.as_ref()
			.map(serde_json::to_vec)
			.transpose()
			.map_err(|source| TransportError::Encode { source })?;

		headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

		if body.is_some() {
			headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
		}

		Ok(HttpRequest { method: self.method.into(), url, headers, body })
	}
}

/// Flattens a validated query object into ordered key/value pairs.
///
/// Arrays become comma-joined lists, nulls are skipped, and nested objects are sent as JSON.
pub fn encode_query(query: &Value) -> Vec<(String, String)> {
	let Value::Object(map) = query else {
		return Vec::new();
	};

	map.iter()
		.filter_map(|(key, value)| {
			let encoded = match value {
				Value::Null => return None,
				Value::Array(items) => items
					.iter()
					.filter(|item| !item.is_null())
					.map(scalar_text)
					.collect::<Vec<_>>()
					.join(","),
				other => scalar_text(other),
			};

			Some((key.clone(), encoded))
		})
		.collect()
}

fn scalar_text(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
