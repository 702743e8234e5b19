//! Token-exchange contract (`auth.token`).

// self
use crate::{
	contract::{ContractDefinitionError, HttpMethod, OperationDescriptor},
	schema::{ObjectSchema, Schema},
};

/// Resource name.
pub const RESOURCE: &str = "auth";
/// Token exchange operation name.
pub const TOKEN: &str = "token";
/// Only grant type the gateway accepts on the exchange.
pub const GRANT_TYPE: &str = "authorization_code";

const GRANT_TYPES: &[&str] = &[GRANT_TYPE];

/// Returns the token exchange descriptor.
pub fn token() -> Result<OperationDescriptor, ContractDefinitionError> {
	OperationDescriptor::builder(TOKEN, HttpMethod::Post, "/token")
		.body(
			ObjectSchema::new()
				.required("grant_type", Schema::one_of(GRANT_TYPES))
				.required("scope", Schema::array_of(Schema::string())),
		)
		.response(
			200,
			ObjectSchema::new()
				.required("access_token", Schema::string())
				.required("expires_in", Schema::integer().minimum(0))
				.passthrough(),
		)
		.build()
}
