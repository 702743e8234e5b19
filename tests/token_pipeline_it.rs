#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use cel_cash::{
	_preludet::*,
	auth::CAPABILITY_SCOPES,
	cache::{ACCESS_TOKEN_KEY, CredentialCache, ManualClock, MemoryCache},
	error::AuthenticationError,
	resources::transactions::ListTransactionsQuery,
};

const BASIC: &str = "Basic NTQ3Mzo4M013NXU4OTg4UWo2ZlpxUzRaOEs3THpPbzFqMjhTNzA2UjBCZUZl";

fn list_body() -> Value {
	json!({
		"totalQtdFoundInPage": 1,
		"Transactions": [{ "galaxPayId": 7, "myId": "tx-7", "value": 1000, "status": "captured" }],
	})
}

async fn mock_token<'a>(server: &'a MockServer, token: &str, expires_in: u64) -> httpmock::Mock<'a> {
	let token = token.to_owned();

	server
		.mock_async(move |when, then| {
			when.method(POST)
				.path("/v2/token")
				.header("authorization", BASIC)
				.json_body(json!({ "grant_type": "authorization_code", "scope": CAPABILITY_SCOPES }));
			then.status(200).json_body(json!({
				"access_token": token,
				"expires_in": expires_in,
				"token_type": "Bearer",
			}));
		})
		.await
}

async fn mock_list<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	let bearer = format!("Bearer {token}");

	server
		.mock_async(move |when, then| {
			when.method(GET)
				.path("/v2/transactions")
				.header("authorization", bearer.as_str())
				.query_param("startAt", "0")
				.query_param("limit", "10");
			then.status(200).json_body(list_body());
		})
		.await
}

#[tokio::test]
async fn cold_cache_exchanges_once_across_sequential_calls() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "token-1", 600).await;
	let list = mock_list(&server, "token-1").await;
	let (client, cache) = build_test_client(&test_config(&server.url("/v2")));
	let transactions = client.transactions().expect("Transactions client should build.");

	for _ in 0..3 {
		let response = transactions
			.list(&ListTransactionsQuery::page(0, 10))
			.await
			.expect("List should succeed.");

		assert_eq!(response.status(), 200);
		assert!(response.is_validated());
	}

	token.assert_calls_async(1).await;
	list.assert_calls_async(3).await;

	let cached = cache.get(ACCESS_TOKEN_KEY).await.expect("Cache read should succeed.");

	assert_eq!(cached.as_ref().map(|secret| secret.expose()), Some("token-1"));
}

#[tokio::test]
async fn rejected_exchange_surfaces_authentication_error_and_leaves_cache_empty() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/token");
			then.status(403).json_body(json!({ "error": { "message": "invalid credentials" } }));
		})
		.await;
	let list = mock_list(&server, "never-issued").await;
	let (client, cache) = build_test_client(&test_config(&server.url("/v2")));
	let err = client
		.transactions()
		.expect("Transactions client should build.")
		.list(&ListTransactionsQuery::page(0, 10))
		.await
		.expect_err("Rejected exchanges should fail the call.");

	match err {
		Error::Authentication(AuthenticationError::Rejected { status, body }) => {
			assert_eq!(status, 403);
			assert!(body.contains("invalid credentials"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	token.assert_calls_async(1).await;
	list.assert_calls_async(0).await;

	assert!(cache.get(ACCESS_TOKEN_KEY).await.expect("Cache read should succeed.").is_none());
}

#[tokio::test]
async fn expired_tokens_trigger_a_fresh_exchange() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "token-ttl", 60).await;
	let list = mock_list(&server, "token-ttl").await;
	let clock = ManualClock::default();
	let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
	let client = build_test_client_with_cache(&test_config(&server.url("/v2")), cache.clone());
	let transactions = client.transactions().expect("Transactions client should build.");
	let query = ListTransactionsQuery::page(0, 10);

	transactions.list(&query).await.expect("First list should succeed.");
	clock.advance(Duration::seconds(59));
	transactions.list(&query).await.expect("Second list should reuse the token.");

	token.assert_calls_async(1).await;

	clock.advance(Duration::seconds(1));

	assert!(cache.is_empty());

	transactions.list(&query).await.expect("Third list should re-acquire.");

	token.assert_calls_async(2).await;
	list.assert_calls_async(3).await;
}

#[tokio::test]
async fn unauthorized_resource_calls_are_not_retried_or_invalidated() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "unused", 600).await;
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/transactions").header("authorization", "Bearer revoked");
			then.status(401).json_body(json!({ "error": { "message": "token revoked" } }));
		})
		.await;
	let (client, cache) = build_test_client(&test_config(&server.url("/v2")));

	cache
		.set(ACCESS_TOKEN_KEY, "revoked".into(), Duration::minutes(10))
		.await
		.expect("Cache seed should succeed.");

	let response = client
		.transactions()
		.expect("Transactions client should build.")
		.list(&ListTransactionsQuery::page(0, 10))
		.await
		.expect("Undeclared statuses pass through.");

	assert_eq!(response.status(), 401);
	assert!(!response.is_validated());
	assert!(matches!(response.expect_declared(), Err(Error::UnexpectedStatus { status: 401, .. })));

	token.assert_calls_async(0).await;
	list.assert_calls_async(1).await;

	let cached = cache.get(ACCESS_TOKEN_KEY).await.expect("Cache read should succeed.");

	assert_eq!(cached.as_ref().map(|secret| secret.expose()), Some("revoked"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_flight_shares_one_exchange_between_concurrent_misses() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/token");
			then.status(200)
				.delay(std::time::Duration::from_millis(300))
				.json_body(json!({ "access_token": "shared", "expires_in": 600 }));
		})
		.await;
	let list = mock_list(&server, "shared").await;
	let (client, _) = build_test_client(&test_config(&server.url("/v2")));
	let mut handles = Vec::new();

	for _ in 0..5 {
		let transactions = client.transactions().expect("Transactions client should build.");

		handles.push(tokio::spawn(async move {
			transactions.list(&ListTransactionsQuery::page(0, 10)).await.map(|r| r.status())
		}));
	}
	for handle in handles {
		assert_eq!(
			handle.await.expect("Task should join.").expect("List should succeed."),
			200,
		);
	}

	token.assert_calls_async(1).await;
	list.assert_calls_async(5).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disabling_single_flight_lets_concurrent_misses_race() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/token");
			then.status(200)
				.delay(std::time::Duration::from_millis(300))
				.json_body(json!({ "access_token": "raced", "expires_in": 600 }));
		})
		.await;
	let list = mock_list(&server, "raced").await;
	let config = test_config(&server.url("/v2")).with_single_flight(false);
	let (client, cache) = build_test_client(&config);
	let mut handles = Vec::new();

	for _ in 0..3 {
		let transactions = client.transactions().expect("Transactions client should build.");

		handles.push(tokio::spawn(async move {
			transactions.list(&ListTransactionsQuery::page(0, 10)).await.map(|r| r.status())
		}));
	}
	for handle in handles {
		handle.await.expect("Task should join.").expect("List should succeed.");
	}

	token.assert_calls_async(3).await;
	list.assert_calls_async(3).await;

	assert_eq!(cache.len(), 1);
}
