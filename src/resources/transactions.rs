//! Transactions resource: contract, typed models, and typed client.
//!
//! Every operation targets a transaction (or its subscription) through a two-valued
//! namespace selector, [`IdType`], which decides whether the id in the path is the
//! gateway-assigned `galaxPayId` or the caller-assigned `myId`.

// self
use crate::{
	_prelude::*,
	client::{ApiRequest, ApiResponse, ResourceClient},
	contract::{ContractDefinitionError, HttpMethod, OperationDescriptor, ResourceContract},
	http::{CallOptions, HttpTransport},
	schema::{Location, ObjectSchema, Schema, ValidationError, ValidationIssue},
};

/// Resource name.
pub const RESOURCE: &str = "transactions";
/// `GET /transactions`.
pub const LIST: &str = "list";
/// `POST /transactions/:subscriptionId/:typeId/add`.
pub const CREATE: &str = "create";
/// `PUT /transactions/:subscriptionId/:typeId`.
pub const UPDATE: &str = "update";
/// `PUT /transactions/:transactionId/:typeId/retry`.
pub const RETRY: &str = "retry";
/// `PUT /transactions/:transactionId/:typeId/reverse`.
pub const REVERSE: &str = "reverse";
/// `PUT /transactions/:transactionId/:typeId/capture`.
pub const CAPTURE: &str = "capture";
/// `DELETE /transactions/:transactionId/:typeId`.
pub const CANCEL: &str = "cancel";

/// Identifier namespaces accepted by the `typeId` selector.
pub const ID_TYPES: &[&str] = &["galaxPayId", "myId"];

/// Declares the `transactions` resource.
pub fn contract() -> Result<ResourceContract, ContractDefinitionError> {
	let by_subscription = || target("subscriptionId");
	let by_transaction = || target("transactionId");

	ResourceContract::builder(RESOURCE, "/transactions")
		.operation(
			OperationDescriptor::builder(LIST, HttpMethod::Get, "/")
				.query(list_query())
				.response(200, transaction_list()),
		)
		.operation(
			OperationDescriptor::builder(CREATE, HttpMethod::Post, "/:subscriptionId/:typeId/add")
				.path_params(by_subscription())
				.body(add_body())
				.response(200, transaction_envelope()),
		)
		.operation(
			OperationDescriptor::builder(UPDATE, HttpMethod::Put, "/:subscriptionId/:typeId")
				.path_params(by_subscription())
				.body(update_body())
				.response(200, transaction_envelope()),
		)
		.operation(
			OperationDescriptor::builder(RETRY, HttpMethod::Put, "/:transactionId/:typeId/retry")
				.path_params(by_transaction())
				.body(ObjectSchema::new())
				.response(200, transaction_envelope()),
		)
		.operation(
			OperationDescriptor::builder(REVERSE, HttpMethod::Put, "/:transactionId/:typeId/reverse")
				.path_params(by_transaction())
				.body(ObjectSchema::new().optional("valueToReverse", Schema::coerced_number()))
				.response(200, transaction_envelope()),
		)
		.operation(
			OperationDescriptor::builder(CAPTURE, HttpMethod::Put, "/:transactionId/:typeId/capture")
				.path_params(by_transaction())
				.body(ObjectSchema::new())
				.response(200, transaction_envelope()),
		)
		.operation(
			OperationDescriptor::builder(CANCEL, HttpMethod::Delete, "/:transactionId/:typeId")
				.path_params(by_transaction())
				.body(ObjectSchema::new())
				.response(200, ObjectSchema::new().required("type", Schema::boolean()).passthrough()),
		)
		.build()
}

fn target(id_field: &'static str) -> ObjectSchema {
	ObjectSchema::new()
		.required(id_field, Schema::coerced_string())
		.required("typeId", Schema::one_of(ID_TYPES))
}

fn list_query() -> ObjectSchema {
	let ids = || Schema::array_of(Schema::coerced_string());

	ObjectSchema::new()
		.required("startAt", Schema::coerced_integer().minimum(0))
		.required("limit", Schema::coerced_integer().minimum(1))
		.optional("myIds", ids())
		.optional("galaxPayIds", ids())
		.optional("customerMyIds", ids())
		.optional("customerGalaxPayIds", ids())
		.optional("subscriptionMyIds", ids())
		.optional("subscriptionGalaxPayIds", ids())
		.optional("status", Schema::array_of(Schema::string()))
		.optional("createdAtFrom", Schema::string())
		.optional("createdAtTo", Schema::string())
		.optional("order", Schema::string())
}

fn add_body() -> ObjectSchema {
	ObjectSchema::new()
		.required("myId", Schema::coerced_string())
		.required("value", Schema::coerced_number())
		.required("payday", Schema::string())
		.optional("payedOutsideGalaxPay", Schema::boolean())
		.optional("additionalInfo", Schema::string())
}

fn update_body() -> ObjectSchema {
	ObjectSchema::new()
		.optional("myId", Schema::coerced_string())
		.optional("value", Schema::coerced_number())
		.optional("payday", Schema::string())
		.optional("payedOutsideGalaxPay", Schema::boolean())
		.optional("additionalInfo", Schema::string())
}

fn transaction() -> ObjectSchema {
	ObjectSchema::new()
		.required("galaxPayId", Schema::integer())
		.required("value", Schema::integer())
		.required("status", Schema::string())
		.optional("myId", Schema::string().nullable())
		.optional("payday", Schema::string().nullable())
		.optional("installment", Schema::integer().nullable())
		.optional("additionalInfo", Schema::string().nullable())
		.optional("subscriptionGalaxPayId", Schema::integer().nullable())
		.optional("subscriptionMyId", Schema::string().nullable())
		.optional("createdAt", Schema::string().nullable())
		.optional("statusDescription", Schema::string().nullable())
		.optional("payedOutsideGalaxPay", Schema::boolean().nullable())
		.passthrough()
}

fn transaction_envelope() -> ObjectSchema {
	ObjectSchema::new()
		.required("type", Schema::boolean())
		.required("Transaction", transaction())
		.passthrough()
}

fn transaction_list() -> ObjectSchema {
	ObjectSchema::new()
		.required("totalQtdFoundInPage", Schema::integer().minimum(0))
		.required("Transactions", Schema::array_of(transaction()))
		.passthrough()
}

/// Namespace an identifier in the path belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
	/// Gateway-assigned identifier.
	#[serde(rename = "galaxPayId")]
	GalaxPayId,
	/// Caller-assigned identifier.
	#[serde(rename = "myId")]
	MyId,
}
impl IdType {
	/// Wire literal.
	pub const fn as_str(self) -> &'static str {
		match self {
			IdType::GalaxPayId => "galaxPayId",
			IdType::MyId => "myId",
		}
	}
}
impl Display for IdType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for IdType {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"galaxPayId" => Ok(IdType::GalaxPayId),
			"myId" => Ok(IdType::MyId),
			other => Err(ValidationError::new(
				Location::Path,
				"$.typeId",
				ValidationIssue::NotAllowed { allowed: ID_TYPES, found: other.to_owned() },
			)),
		}
	}
}

/// Path identifier; the gateway accepts numeric and textual ids alike.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathId {
	/// Numeric id (typically a `galaxPayId`).
	Number(i64),
	/// Textual id (typically a `myId`).
	Text(String),
}
impl Display for PathId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			PathId::Number(id) => write!(f, "{id}"),
			PathId::Text(id) => f.write_str(id),
		}
	}
}
impl From<i64> for PathId {
	fn from(value: i64) -> Self {
		Self::Number(value)
	}
}
impl From<&str> for PathId {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}
impl From<String> for PathId {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

/// Subscription targeted by `create`/`update`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRef {
	/// Subscription id.
	pub subscription_id: PathId,
	/// Namespace of `subscription_id`.
	pub type_id: IdType,
}
impl SubscriptionRef {
	/// Creates a reference.
	pub fn new(subscription_id: impl Into<PathId>, type_id: IdType) -> Self {
		Self { subscription_id: subscription_id.into(), type_id }
	}
}

/// Transaction targeted by `retry`/`reverse`/`capture`/`cancel`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRef {
	/// Transaction id.
	pub transaction_id: PathId,
	/// Namespace of `transaction_id`.
	pub type_id: IdType,
}
impl TransactionRef {
	/// Creates a reference.
	pub fn new(transaction_id: impl Into<PathId>, type_id: IdType) -> Self {
		Self { transaction_id: transaction_id.into(), type_id }
	}
}

/// Query for `list`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
	/// Offset of the first record.
	pub start_at: u32,
	/// Page size.
	pub limit: u32,
	/// Caller-assigned transaction ids.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub my_ids: Option<Vec<String>>,
	/// Gateway-assigned transaction ids.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub galax_pay_ids: Option<Vec<i64>>,
	/// Caller-assigned customer ids.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub customer_my_ids: Option<Vec<String>>,
	/// Gateway-assigned customer ids.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub customer_galax_pay_ids: Option<Vec<i64>>,
	/// Caller-assigned subscription ids.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subscription_my_ids: Option<Vec<String>>,
	/// Gateway-assigned subscription ids.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subscription_galax_pay_ids: Option<Vec<i64>>,
	/// Status filter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<Vec<String>>,
	/// Lower creation-date bound (`YYYY-MM-DD`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at_from: Option<String>,
	/// Upper creation-date bound (`YYYY-MM-DD`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at_to: Option<String>,
	/// Sort expression such as `createdAt.desc`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub order: Option<String>,
}
impl ListTransactionsQuery {
	/// Creates a page query.
	pub fn page(start_at: u32, limit: u32) -> Self {
		Self { start_at, limit, ..Default::default() }
	}
}

/// Body for `create`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTransaction {
	/// Caller-assigned id.
	pub my_id: String,
	/// Amount in cents.
	pub value: i64,
	/// Due date (`YYYY-MM-DD`).
	pub payday: String,
	/// Whether the payment happened outside the gateway.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payed_outside_galax_pay: Option<bool>,
	/// Free-form note.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub additional_info: Option<String>,
}

/// Body for `update`; absent fields are left untouched upstream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
	/// Caller-assigned id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub my_id: Option<String>,
	/// Amount in cents.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<i64>,
	/// Due date (`YYYY-MM-DD`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payday: Option<String>,
	/// Whether the payment happened outside the gateway.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub payed_outside_galax_pay: Option<bool>,
	/// Free-form note.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub additional_info: Option<String>,
}

/// Body for `reverse`; omitting the value reverses the full amount.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseTransaction {
	/// Amount in cents to reverse.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value_to_reverse: Option<i64>,
}

/// Transaction as returned by the gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	/// Gateway-assigned id.
	pub galax_pay_id: i64,
	/// Caller-assigned id.
	#[serde(default)]
	pub my_id: Option<String>,
	/// Amount in cents.
	pub value: i64,
	/// Gateway status label.
	pub status: String,
	/// Due date.
	#[serde(default)]
	pub payday: Option<String>,
	/// Installment number within the subscription.
	#[serde(default)]
	pub installment: Option<i64>,
	/// Free-form note.
	#[serde(default)]
	pub additional_info: Option<String>,
	/// Owning subscription, gateway id.
	#[serde(default)]
	pub subscription_galax_pay_id: Option<i64>,
	/// Owning subscription, caller id.
	#[serde(default)]
	pub subscription_my_id: Option<String>,
	/// Creation timestamp.
	#[serde(default)]
	pub created_at: Option<String>,
	/// Human-readable status.
	#[serde(default)]
	pub status_description: Option<String>,
	/// Whether the payment happened outside the gateway.
	#[serde(default)]
	pub payed_outside_galax_pay: Option<bool>,
	/// Fields this model does not name.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// `list` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
	/// Records on this page.
	#[serde(rename = "totalQtdFoundInPage")]
	pub total_in_page: u64,
	/// Page records.
	#[serde(rename = "Transactions")]
	pub transactions: Vec<Transaction>,
}

/// Single-transaction response shared by every mutating operation except `cancel`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
	/// Gateway success flag.
	#[serde(rename = "type")]
	pub ok: bool,
	/// Affected transaction.
	#[serde(rename = "Transaction")]
	pub transaction: Transaction,
}

/// `cancel` response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelTransactionResponse {
	/// Gateway success flag.
	#[serde(rename = "type")]
	pub ok: bool,
}

/// Typed client for the transactions resource.
#[derive(Debug)]
pub struct Transactions<T>
where
	T: ?Sized + HttpTransport,
{
	client: ResourceClient<T>,
	options: CallOptions,
}
impl<T> Transactions<T>
where
	T: ?Sized + HttpTransport,
{
	/// Wraps a resource client bound to the transactions contract.
	pub fn new(client: ResourceClient<T>) -> Self {
		Self { client, options: CallOptions::default() }
	}

	/// Applies `options` to every subsequent call.
	pub fn with_options(mut self, options: CallOptions) -> Self {
		self.options = options;

		self
	}

	/// Underlying untyped client.
	pub fn client(&self) -> &ResourceClient<T> {
		&self.client
	}

	/// Lists transactions.
	pub async fn list(&self, query: &ListTransactionsQuery) -> Result<ApiResponse> {
		self.send(LIST, self.request().query(to_value(Location::Query, query)?)).await
	}

	/// Adds a transaction to a subscription.
	pub async fn create(
		&self,
		subscription: &SubscriptionRef,
		body: &AddTransaction,
	) -> Result<ApiResponse> {
		let request = self
			.request()
			.path_params(to_value(Location::Path, subscription)?)
			.body(to_value(Location::Body, body)?);

		self.send(CREATE, request).await
	}

	/// Updates a subscription transaction.
	pub async fn update(
		&self,
		subscription: &SubscriptionRef,
		body: &UpdateTransaction,
	) -> Result<ApiResponse> {
		let request = self
			.request()
			.path_params(to_value(Location::Path, subscription)?)
			.body(to_value(Location::Body, body)?);

		self.send(UPDATE, request).await
	}

	/// Retries a failed charge.
	pub async fn retry(&self, transaction: &TransactionRef) -> Result<ApiResponse> {
		self.send(RETRY, self.targeting(transaction)?).await
	}

	/// Reverses a transaction, fully or partially.
	pub async fn reverse(
		&self,
		transaction: &TransactionRef,
		body: &ReverseTransaction,
	) -> Result<ApiResponse> {
		let request = self.targeting(transaction)?.body(to_value(Location::Body, body)?);

		self.send(REVERSE, request).await
	}

	/// Captures a pre-authorized transaction.
	pub async fn capture(&self, transaction: &TransactionRef) -> Result<ApiResponse> {
		self.send(CAPTURE, self.targeting(transaction)?).await
	}

	/// Cancels a transaction.
	pub async fn cancel(&self, transaction: &TransactionRef) -> Result<ApiResponse> {
		self.send(CANCEL, self.targeting(transaction)?).await
	}

	fn request(&self) -> ApiRequest {
		ApiRequest::new().options(self.options.clone())
	}

	fn targeting(&self, transaction: &TransactionRef) -> Result<ApiRequest> {
		Ok(self.request().path_params(to_value(Location::Path, transaction)?))
	}

	async fn send(&self, operation: &str, request: ApiRequest) -> Result<ApiResponse> {
		self.client.call(operation, request).await
	}
}
impl<T> Clone for Transactions<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { client: self.client.clone(), options: self.options.clone() }
	}
}

fn to_value<S>(location: Location, input: &S) -> Result<Value, ValidationError>
where
	S: Serialize,
{
	serde_json::to_value(input).map_err(|e| ValidationError::unserializable(location, e))
}
