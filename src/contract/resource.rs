// self
use crate::{
	_prelude::*,
	contract::{ContractDefinitionError, OperationDescriptor, OperationDescriptorBuilder, PathTemplate},
};

/// Named group of operations sharing a path prefix.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceContract {
	name: String,
	prefix: PathTemplate,
	operations: BTreeMap<String, OperationDescriptor>,
}
impl ResourceContract {
	/// Starts declaring a resource mounted at `prefix`.
	pub fn builder(name: impl Into<String>, prefix: impl Into<String>) -> ResourceContractBuilder {
		ResourceContractBuilder {
			name: name.into(),
			prefix: prefix.into(),
			operations: Vec::new(),
		}
	}

	/// Resource name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Path prefix shared by every operation.
	pub fn prefix(&self) -> &PathTemplate {
		&self.prefix
	}

	/// Looks up an operation by name.
	pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
		self.operations.get(name)
	}

	/// Iterator over declared operations, ordered by name.
	pub fn operations(&self) -> impl Iterator<Item = &OperationDescriptor> {
		self.operations.values()
	}
}

/// Builder for [`ResourceContract`] values.
#[derive(Clone, Debug)]
pub struct ResourceContractBuilder {
	name: String,
	prefix: String,
	operations: Vec<OperationDescriptorBuilder>,
}
impl ResourceContractBuilder {
	/// Adds an operation declared relative to the resource prefix.
	pub fn operation(mut self, operation: OperationDescriptorBuilder) -> Self {
		self.operations.push(operation);

		self
	}

	/// Validates every operation and freezes the resource.
	pub fn build(self) -> Result<ResourceContract, ContractDefinitionError> {
		if self.name.is_empty() {
			return Err(ContractDefinitionError::EmptyName);
		}

		let prefix = PathTemplate::parse(&self.prefix)?;
		let mut operations = BTreeMap::new();

		for builder in self.operations {
			if operations.contains_key(builder.name()) {
				return Err(ContractDefinitionError::DuplicateOperation {
					resource: self.name,
					operation: builder.name().to_owned(),
				});
			}

			let descriptor = builder.build_under(&prefix)?;

			operations.insert(descriptor.name().to_owned(), descriptor);
		}

		Ok(ResourceContract { name: self.name, prefix, operations })
	}
}

/// Immutable lookup table from resource name to contract.
#[derive(Clone, Debug, Default)]
pub struct ContractRegistry {
	resources: BTreeMap<String, Arc<ResourceContract>>,
}
impl ContractRegistry {
	/// Starts an empty registry builder.
	pub fn builder() -> ContractRegistryBuilder {
		ContractRegistryBuilder::default()
	}

	/// Looks up a resource.
	pub fn resource(&self, name: &str) -> Option<Arc<ResourceContract>> {
		self.resources.get(name).cloned()
	}

	/// Looks up a single operation.
	pub fn operation(&self, resource: &str, operation: &str) -> Option<&OperationDescriptor> {
		self.resources.get(resource).and_then(|contract| contract.operation(operation))
	}

	/// Registered resource names.
	pub fn resources(&self) -> impl Iterator<Item = &str> {
		self.resources.keys().map(String::as_str)
	}
}

/// Builder for [`ContractRegistry`] values.
#[derive(Debug, Default)]
pub struct ContractRegistryBuilder {
	resources: Vec<ResourceContract>,
}
impl ContractRegistryBuilder {
	/// Registers a resource.
	pub fn resource(mut self, contract: ResourceContract) -> Self {
		self.resources.push(contract);

		self
	}

	/// Freezes the registry, rejecting duplicate resource names.
	pub fn build(self) -> Result<ContractRegistry, ContractDefinitionError> {
		let mut resources = BTreeMap::new();

		for contract in self.resources {
			if resources.contains_key(contract.name()) {
				return Err(ContractDefinitionError::DuplicateResource {
					resource: contract.name().to_owned(),
				});
			}

			resources.insert(contract.name().to_owned(), Arc::new(contract));
		}

		Ok(ContractRegistry { resources })
	}
}
