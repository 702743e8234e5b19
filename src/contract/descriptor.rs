// self
use crate::{
	_prelude::*,
	contract::{ContractDefinitionError, HttpMethod, PathTemplate, PreparedRequest},
	schema::{Location, ObjectSchema, Schema, ValidationError},
};

/// Immutable declaration of one operation: method, path, and validation schemas.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationDescriptor {
	name: String,
	method: HttpMethod,
	path: PathTemplate,
	path_params: ObjectSchema,
	query: Option<Schema>,
	body: Option<Schema>,
	responses: BTreeMap<u16, Schema>,
}
impl OperationDescriptor {
	/// Creates a new builder; `path` is relative to the owning resource's prefix.
	pub fn builder(
		name: impl Into<String>,
		method: HttpMethod,
		path: impl Into<String>,
	) -> OperationDescriptorBuilder {
		OperationDescriptorBuilder::new(name, method, path)
	}

	/// Operation name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// HTTP method.
	pub fn method(&self) -> HttpMethod {
		self.method
	}

	/// Full path template (resource prefix included once registered).
	pub fn path(&self) -> &PathTemplate {
		&self.path
	}

	/// Path-param schema.
	pub fn path_params(&self) -> &ObjectSchema {
		&self.path_params
	}

	/// Query schema, if the operation accepts one.
	pub fn query(&self) -> Option<&Schema> {
		self.query.as_ref()
	}

	/// Body schema, if the operation sends one.
	pub fn body(&self) -> Option<&Schema> {
		self.body.as_ref()
	}

	/// Response schema declared for `status`.
	pub fn response(&self, status: u16) -> Option<&Schema> {
		self.responses.get(&status)
	}

	/// Declared response statuses.
	pub fn statuses(&self) -> impl Iterator<Item = u16> + '_ {
		self.responses.keys().copied()
	}

	/// Validates caller input and resolves the concrete path.
	///
	/// `null` path params are read as `{}`. A declared query or body that the caller omits is
	/// validated as `{}`, so required fields still fail. Query or body input the operation
	/// does not declare is dropped.
	pub fn prepare(
		&self,
		path_params: &Value,
		query: Option<&Value>,
		body: Option<&Value>,
	) -> Result<PreparedRequest, ValidationError> {
		let empty = Value::Object(Map::new());
		let path_input = if path_params.is_null() { &empty } else { path_params };
		let params = self.path_params.validate(Location::Path, path_input)?;
		let path = match &params {
			Value::Object(map) => self.path.render(map)?,
			_ => self.path.render(&Map::new())?,
		};
		let query = self
			.query
			.as_ref()
			.map(|schema| schema.validate(Location::Query, query.unwrap_or(&empty)))
			.transpose()?;
		let body = self
			.body
			.as_ref()
			.map(|schema| schema.validate(Location::Body, body.unwrap_or(&empty)))
			.transpose()?;

		Ok(PreparedRequest::new(self.method, path, query.as_ref(), body))
	}

	/// Validates a decoded response body against the schema for its status.
	///
	/// Returns `None` when the status is undeclared, meaning the body passes through raw.
	pub fn validate_response(
		&self,
		status: u16,
		body: &Value,
	) -> Option<Result<Value, ValidationError>> {
		self.responses.get(&status).map(|schema| schema.validate(Location::Response, body))
	}

	fn validate(&self) -> Result<(), ContractDefinitionError> {
		if self.name.is_empty() {
			return Err(ContractDefinitionError::EmptyName);
		}

		for placeholder in self.path.placeholders() {
			match self.path_params.field(placeholder) {
				Some(field) if !field.required =>
					return Err(ContractDefinitionError::OptionalPathParam {
						operation: self.name.clone(),
						field: placeholder.to_owned(),
					}),
				Some(_) => (),
				None =>
					return Err(ContractDefinitionError::UnboundPlaceholder {
						operation: self.name.clone(),
						placeholder: placeholder.to_owned(),
					}),
			}
		}
		for field in self.path_params.names() {
			if !self.path.placeholders().any(|placeholder| placeholder == field) {
				return Err(ContractDefinitionError::OrphanPathParam {
					operation: self.name.clone(),
					field: field.to_owned(),
				});
			}
		}

		Ok(())
	}
}

/// Builder for [`OperationDescriptor`] values.
#[derive(Clone, Debug)]
pub struct OperationDescriptorBuilder {
	name: String,
	method: HttpMethod,
	path: String,
	path_params: ObjectSchema,
	query: Option<Schema>,
	body: Option<Schema>,
	responses: BTreeMap<u16, Schema>,
}
impl OperationDescriptorBuilder {
	fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			method,
			path: path.into(),
			path_params: ObjectSchema::default(),
			query: None,
			body: None,
			responses: BTreeMap::new(),
		}
	}

	/// Operation name being declared.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Sets the path-param schema; its fields must match the template placeholders.
	pub fn path_params(mut self, schema: ObjectSchema) -> Self {
		self.path_params = schema;

		self
	}

	/// Sets the query schema.
	pub fn query(mut self, schema: impl Into<Schema>) -> Self {
		self.query = Some(schema.into());

		self
	}

	/// Sets the body schema.
	pub fn body(mut self, schema: impl Into<Schema>) -> Self {
		self.body = Some(schema.into());

		self
	}

	/// Declares the response schema for one status code.
	pub fn response(mut self, status: u16, schema: impl Into<Schema>) -> Self {
		self.responses.insert(status, schema.into());

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<OperationDescriptor, ContractDefinitionError> {
		self.build_under(&PathTemplate::parse("/")?)
	}

	/// Builds the descriptor with its path joined below `prefix`.
	pub(crate) fn build_under(
		self,
		prefix: &PathTemplate,
	) -> Result<OperationDescriptor, ContractDefinitionError> {
		let relative = PathTemplate::parse(&self.path)?;
		let descriptor = OperationDescriptor {
			name: self.name,
			method: self.method,
			path: prefix.join(&relative)?,
			path_params: self.path_params,
			query: self.query,
			body: self.body,
			responses: self.responses,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::schema::ValidationIssue;

	const ID_TYPES: &[&str] = &["galaxPayId", "myId"];

	fn target() -> ObjectSchema {
		ObjectSchema::new()
			.required("transactionId", Schema::coerced_string())
			.required("typeId", Schema::one_of(ID_TYPES))
	}

	#[test]
	fn build_rejects_placeholder_schema_mismatches() {
		let err = OperationDescriptor::builder("retry", HttpMethod::Put, "/:transactionId/retry")
			.path_params(target())
			.build()
			.expect_err("Orphan fields should be rejected.");

		assert_eq!(
			err,
			ContractDefinitionError::OrphanPathParam {
				operation: "retry".into(),
				field: "typeId".into(),
			},
		);

		let err = OperationDescriptor::builder("retry", HttpMethod::Put, "/:transactionId/:typeId")
			.build()
			.expect_err("Unbound placeholders should be rejected.");

		assert!(matches!(err, ContractDefinitionError::UnboundPlaceholder { .. }));

		let err = OperationDescriptor::builder("retry", HttpMethod::Put, "/:transactionId")
			.path_params(ObjectSchema::new().optional("transactionId", Schema::string()))
			.build()
			.expect_err("Optional path params should be rejected.");

		assert!(matches!(err, ContractDefinitionError::OptionalPathParam { .. }));
	}

	#[test]
	fn prepare_validates_before_resolving_the_path() {
		let descriptor =
			OperationDescriptor::builder("cancel", HttpMethod::Delete, "/:transactionId/:typeId")
				.path_params(target())
				.body(ObjectSchema::new())
				.response(200, ObjectSchema::new().required("type", Schema::boolean()))
				.build()
				.expect("Cancel descriptor should build.");
		let prepared = descriptor
			.prepare(&json!({ "transactionId": 9, "typeId": "myId" }), None, None)
			.expect("Valid params should prepare.");

		assert_eq!(prepared.path().to_string(), "/9/myId");
		assert_eq!(prepared.body(), Some(&json!({})));

		let err = descriptor
			.prepare(&json!({ "transactionId": 9, "typeId": "other" }), None, None)
			.expect_err("Selectors outside the closed set should fail.");

		assert_eq!(err.location, Location::Path);
		assert!(matches!(err.issue, ValidationIssue::NotAllowed { .. }));
	}

	#[test]
	fn undeclared_statuses_are_not_validated() {
		let descriptor = OperationDescriptor::builder("cancel", HttpMethod::Delete, "/")
			.response(200, ObjectSchema::new().required("type", Schema::boolean()))
			.build()
			.expect("Descriptor should build.");

		assert!(descriptor.validate_response(404, &json!("not found")).is_none());
		assert!(matches!(descriptor.validate_response(200, &json!({ "type": true })), Some(Ok(_))));
		assert!(matches!(descriptor.validate_response(200, &json!({})), Some(Err(_))));
	}
}
