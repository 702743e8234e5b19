//! Gateway resources declared as contracts.
//!
//! `auth` holds the token-exchange contract used internally by the fetcher; it is never
//! exposed through the public registry. `transactions` is the fully modeled resource with
//! typed request/response models and a typed client.

pub mod auth;
pub mod transactions;

// self
use crate::contract::{ContractDefinitionError, ContractRegistry};

/// Builds the registry of every public resource.
pub fn registry() -> Result<ContractRegistry, ContractDefinitionError> {
	ContractRegistry::builder().resource(transactions::contract()?).build()
}
