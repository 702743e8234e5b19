//! Lists transactions through the typed client against a local stand-in gateway, showing one
//! token exchange serving several calls.
//!
//! Set `CEL_CASH_BASE_URL`, `CEL_CASH_ID`, and `CEL_CASH_HASH` to talk to a real gateway instead.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use cel_cash::{
	CelCash, CelCashConfig, ReqwestCelCash,
	cache::MemoryCache,
	http::ReqwestTransport,
	reqwest::Client,
	resources::transactions::{ListTransactionsQuery, TransactionList},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	if std::env::var_os(cel_cash::config::ENV_BASE_URL).is_some() {
		let client = ReqwestCelCash::new(&CelCashConfig::from_env()?)?;

		return list_twice(&client).await;
	}

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":600}",
			);
		})
		.await;
	let list_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/transactions").header("authorization", "Bearer demo-access");
			then.status(200).json_body(json!({
				"totalQtdFoundInPage": 1,
				"Transactions": [{
					"galaxPayId": 1,
					"myId": "demo-1",
					"value": 1990,
					"status": "payedBoleto",
				}],
			}));
		})
		.await;
	let config = CelCashConfig::new(&server.url("/v2"), "5473", "demo-hash")?;
	let transport = ReqwestTransport::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let client = CelCash::with_transport(&config, transport, Arc::new(MemoryCache::default()))?;

	list_twice(&client).await?;

	token_mock.assert_calls_async(1).await;
	list_mock.assert_calls_async(2).await;

	Ok(())
}

async fn list_twice(client: &CelCash<ReqwestTransport>) -> Result<()> {
	let transactions = client.transactions()?;

	for start_at in [0, 1] {
		let page: TransactionList =
			transactions.list(&ListTransactionsQuery::page(start_at, 1)).await?.json()?;

		for tx in page.transactions {
			println!(
				"Transaction {} ({}): {} cents, {}.",
				tx.galax_pay_id,
				tx.my_id.unwrap_or_default(),
				tx.value,
				tx.status,
			);
		}
	}

	Ok(())
}
