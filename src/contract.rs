//! Declarative operation contracts and the registry that groups them per resource.
//!
//! An [`OperationDescriptor`] binds an operation name to an HTTP method, a path template,
//! and the schemas for path params, query, body, and each documented response status.
//! Descriptors are grouped into a [`ResourceContract`] sharing a path prefix, and contracts
//! are grouped into a [`ContractRegistry`]. Every structural invariant is checked when the
//! contract is built, so malformed declarations fail at startup rather than per request.

/// Operation descriptors and their builder.
pub mod descriptor;
/// Path templates with `:name` placeholders.
pub mod path;
/// Validated request context produced from a descriptor.
pub mod request;
/// Resource contracts and the registry.
pub mod resource;

pub use descriptor::*;
pub use path::*;
pub use request::*;
pub use resource::*;

// self
use crate::_prelude::*;

/// HTTP methods operations can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `PATCH`.
	Patch,
	/// `DELETE`.
	Delete,
}
impl HttpMethod {
	/// Returns the canonical upper-case method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
			HttpMethod::Patch => "PATCH",
			HttpMethod::Delete => "DELETE",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<HttpMethod> for ::http::Method {
	fn from(value: HttpMethod) -> Self {
		match value {
			HttpMethod::Get => ::http::Method::GET,
			HttpMethod::Post => ::http::Method::POST,
			HttpMethod::Put => ::http::Method::PUT,
			HttpMethod::Patch => ::http::Method::PATCH,
			HttpMethod::Delete => ::http::Method::DELETE,
		}
	}
}

/// Errors raised while declaring operations, resources, or the registry.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ContractDefinitionError {
	/// A path template is syntactically invalid.
	#[error("Path template `{template}` is invalid: {reason}.")]
	InvalidPathTemplate {
		/// Offending template.
		template: String,
		/// Short explanation.
		reason: &'static str,
	},
	/// A placeholder has no matching path-param field.
	#[error("Operation `{operation}` has placeholder `:{placeholder}` without a path-param field.")]
	UnboundPlaceholder {
		/// Operation name.
		operation: String,
		/// Placeholder name.
		placeholder: String,
	},
	/// A path-param field has no matching placeholder.
	#[error("Operation `{operation}` declares path param `{field}` that the path never uses.")]
	OrphanPathParam {
		/// Operation name.
		operation: String,
		/// Field name.
		field: String,
	},
	/// Path params are always required.
	#[error("Operation `{operation}` declares path param `{field}` as optional.")]
	OptionalPathParam {
		/// Operation name.
		operation: String,
		/// Field name.
		field: String,
	},
	/// Operation or resource names must be non-empty.
	#[error("Contract names cannot be empty.")]
	EmptyName,
	/// An operation name is declared twice within a resource.
	#[error("Resource `{resource}` declares `{operation}` more than once.")]
	DuplicateOperation {
		/// Resource name.
		resource: String,
		/// Operation name.
		operation: String,
	},
	/// A resource name is registered twice.
	#[error("Resource `{resource}` is registered more than once.")]
	DuplicateResource {
		/// Resource name.
		resource: String,
	},
}
