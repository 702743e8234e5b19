#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use cel_cash::{
	_preludet::*,
	cache::{ACCESS_TOKEN_KEY, CredentialCache},
	client::ApiRequest,
	error::TransportError,
	resources::transactions::{
		AddTransaction, CancelTransactionResponse, IdType, ListTransactionsQuery,
		ReverseTransaction, SubscriptionRef, TransactionEnvelope, TransactionList, TransactionRef,
	},
	schema::Location,
};

const TOKEN: &str = "seeded-token";
const BEARER: &str = "Bearer seeded-token";

fn transaction(id: i64, my_id: &str) -> Value {
	json!({
		"galaxPayId": id,
		"myId": my_id,
		"value": 1500,
		"payday": "2026-11-01",
		"status": "pendingBoleto",
		"installment": 1,
		"additionalInfo": null,
		"Boleto": { "pdf": "https://example.invalid/boleto.pdf" },
	})
}

async fn seeded_client(server: &MockServer) -> ReqwestCelCash {
	let (client, cache) = build_test_client(&test_config(&server.url("/v2")));

	cache
		.set(ACCESS_TOKEN_KEY, TOKEN.into(), Duration::minutes(10))
		.await
		.expect("Cache seed should succeed.");

	client
}

#[tokio::test]
async fn create_posts_to_the_subscription_path_and_decodes_the_envelope() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/token");
			then.status(200).json_body(json!({ "access_token": "fresh", "expires_in": 600 }));
		})
		.await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v2/transactions/42/galaxPayId/add")
				.header("authorization", "Bearer fresh")
				.header("content-type", "application/json")
				.json_body(json!({ "myId": "tx-42", "value": 1500, "payday": "2026-11-01" }));
			then.status(200).json_body(json!({ "type": true, "Transaction": transaction(9001, "tx-42") }));
		})
		.await;
	let (client, _) = build_test_client(&test_config(&server.url("/v2")));
	let response = client
		.transactions()
		.expect("Transactions client should build.")
		.create(
			&SubscriptionRef::new(42_i64, IdType::GalaxPayId),
			&AddTransaction {
				my_id: "tx-42".into(),
				value: 1500,
				payday: "2026-11-01".into(),
				payed_outside_galax_pay: None,
				additional_info: None,
			},
		)
		.await
		.expect("Create should succeed.");

	assert_eq!(response.status(), 200);
	assert!(response.is_validated());
	assert_eq!(response.body()["Transaction"]["Boleto"]["pdf"], "https://example.invalid/boleto.pdf");

	let envelope: TransactionEnvelope = response.json().expect("Envelope should decode.");

	assert!(envelope.ok);
	assert_eq!(envelope.transaction.galax_pay_id, 9001);
	assert_eq!(envelope.transaction.my_id.as_deref(), Some("tx-42"));
	assert_eq!(envelope.transaction.additional_info, None);
	assert!(envelope.transaction.extra.contains_key("Boleto"));

	token.assert_calls_async(1).await;
	create.assert_calls_async(1).await;
}

#[tokio::test]
async fn list_encodes_filters_and_decodes_the_page() {
	let server = MockServer::start_async().await;
	let list = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/transactions")
				.header("authorization", BEARER)
				.query_param("startAt", "20")
				.query_param("limit", "2")
				.query_param("galaxPayIds", "1,2")
				.query_param("status", "captured,payedBoleto");
			then.status(200).json_body(json!({
				"totalQtdFoundInPage": 2,
				"Transactions": [transaction(1, "a"), transaction(2, "b")],
			}));
		})
		.await;
	let client = seeded_client(&server).await;
	let query = ListTransactionsQuery {
		galax_pay_ids: Some(vec![1, 2]),
		status: Some(vec!["captured".into(), "payedBoleto".into()]),
		..ListTransactionsQuery::page(20, 2)
	};
	let page: TransactionList = client
		.transactions()
		.expect("Transactions client should build.")
		.list(&query)
		.await
		.expect("List should succeed.")
		.json()
		.expect("Page should decode.");

	assert_eq!(page.total_in_page, 2);
	assert_eq!(
		page.transactions.iter().map(|tx| tx.galax_pay_id).collect::<Vec<_>>(),
		[1, 2],
	);

	list.assert_async().await;
}

#[tokio::test]
async fn invalid_id_namespace_is_rejected_before_any_request() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/token");
			then.status(200).json_body(json!({ "access_token": "unused", "expires_in": 600 }));
		})
		.await;
	let cancel = server
		.mock_async(|when, then| {
			when.method(DELETE);
			then.status(200).json_body(json!({ "type": true }));
		})
		.await;
	let (client, _) = build_test_client(&test_config(&server.url("/v2")));
	let err = client
		.resource("transactions")
		.expect("Transactions resource should exist.")
		.call(
			"cancel",
			ApiRequest::new().path_params(json!({ "transactionId": 7, "typeId": "internalId" })),
		)
		.await
		.expect_err("Unknown namespaces should fail validation.");

	match err {
		Error::Validation(e) => {
			assert_eq!(e.location, Location::Path);
			assert_eq!(e.path, "$.typeId");
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	token.assert_calls_async(0).await;
	cancel.assert_calls_async(0).await;
}

#[tokio::test]
async fn unknown_resources_and_operations_are_reported() {
	let server = MockServer::start_async().await;
	let client = seeded_client(&server).await;

	assert!(matches!(client.resource("customers"), Err(Error::UnknownResource { .. })));

	let err = client
		.resource("transactions")
		.expect("Transactions resource should exist.")
		.call("refund", ApiRequest::new())
		.await
		.expect_err("Undeclared operations should fail.");

	assert!(matches!(err, Error::UnknownOperation { .. }));
}

#[tokio::test]
async fn reverse_sends_the_partial_amount() {
	let server = MockServer::start_async().await;
	let reverse = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/v2/transactions/tx-9/myId/reverse")
				.header("authorization", BEARER)
				.json_body(json!({ "valueToReverse": 500 }));
			then.status(200).json_body(json!({ "type": true, "Transaction": transaction(9, "tx-9") }));
		})
		.await;
	let client = seeded_client(&server).await;
	let envelope: TransactionEnvelope = client
		.transactions()
		.expect("Transactions client should build.")
		.reverse(
			&TransactionRef::new("tx-9", IdType::MyId),
			&ReverseTransaction { value_to_reverse: Some(500) },
		)
		.await
		.expect("Reverse should succeed.")
		.json()
		.expect("Envelope should decode.");

	assert_eq!(envelope.transaction.galax_pay_id, 9);

	reverse.assert_async().await;
}

#[tokio::test]
async fn cancel_returns_the_success_flag() {
	let server = MockServer::start_async().await;
	let cancel = server
		.mock_async(|when, then| {
			when.method(DELETE)
				.path("/v2/transactions/9/galaxPayId")
				.header("authorization", BEARER);
			then.status(200).json_body(json!({ "type": true }));
		})
		.await;
	let client = seeded_client(&server).await;
	let response: CancelTransactionResponse = client
		.transactions()
		.expect("Transactions client should build.")
		.cancel(&TransactionRef::new(9_i64, IdType::GalaxPayId))
		.await
		.expect("Cancel should succeed.")
		.json()
		.expect("Cancel response should decode.");

	assert!(response.ok);

	cancel.assert_async().await;
}

#[tokio::test]
async fn undeclared_statuses_pass_through_untouched() {
	let server = MockServer::start_async().await;
	let capture = server
		.mock_async(|when, then| {
			when.method(PUT).path("/v2/transactions/5/galaxPayId/capture");
			then.status(404)
				.header("retry-after", "30")
				.json_body(json!({ "error": { "message": "transaction not found" } }));
		})
		.await;
	let client = seeded_client(&server).await;
	let response = client
		.transactions()
		.expect("Transactions client should build.")
		.capture(&TransactionRef::new(5_i64, IdType::GalaxPayId))
		.await
		.expect("Undeclared statuses are not errors.");

	assert_eq!(response.status(), 404);
	assert!(!response.is_validated());
	assert_eq!(response.body()["error"]["message"], "transaction not found");
	assert_eq!(response.retry_after(), Some(Duration::seconds(30)));

	capture.assert_async().await;
}

#[tokio::test]
async fn declared_statuses_with_mismatched_bodies_fail_validation() {
	let server = MockServer::start_async().await;
	let retry = server
		.mock_async(|when, then| {
			when.method(PUT).path("/v2/transactions/5/galaxPayId/retry");
			then.status(200).json_body(json!({ "type": true, "Transaction": { "galaxPayId": "five" } }));
		})
		.await;
	let client = seeded_client(&server).await;
	let err = client
		.transactions()
		.expect("Transactions client should build.")
		.retry(&TransactionRef::new(5_i64, IdType::GalaxPayId))
		.await
		.expect_err("Mismatched bodies should fail.");

	match err {
		Error::Transport(TransportError::ResponseValidation { status, source }) => {
			assert_eq!(status, 200);
			assert_eq!(source.location, Location::Response);
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	retry.assert_async().await;
}

#[tokio::test]
async fn declared_statuses_with_non_json_bodies_are_malformed() {
	let server = MockServer::start_async().await;
	let retry = server
		.mock_async(|when, then| {
			when.method(PUT).path("/v2/transactions/5/galaxPayId/retry");
			then.status(200).header("content-type", "text/html").body("<html>gateway</html>");
		})
		.await;
	let client = seeded_client(&server).await;
	let err = client
		.transactions()
		.expect("Transactions client should build.")
		.retry(&TransactionRef::new(5_i64, IdType::GalaxPayId))
		.await
		.expect_err("HTML at a declared status should fail.");

	assert!(matches!(err, Error::Transport(TransportError::MalformedBody { status: 200, .. })));

	retry.assert_async().await;
}
