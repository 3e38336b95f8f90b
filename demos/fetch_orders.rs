//! Signs in against a mocked pet-booking API, lets the access credential expire, and shows the
//! gateway refreshing it and replaying the request.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use pet_booking_gateway::{
	config::GatewayConfig,
	flows::{Gateway, RecordingResetHook},
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200)
				.header("content-type", "application/json")
				.header("set-cookie", "refresh_token=demo-refresh; Path=/; HttpOnly")
				.body("{\"access\":\"demo-expired\"}");
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/orders").header("authorization", "Bearer demo-expired");
			then.status(401).body("{\"detail\":\"Token is expired\"}");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh").header("cookie", "refresh_token=demo-refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"demo-rotated\"}");
		})
		.await;
	let orders_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/orders").header("authorization", "Bearer demo-rotated");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":1,\"pet\":\"Mochi\",\"service\":\"grooming\"}]");
		})
		.await;
	let config = GatewayConfig::builder(Url::parse(&server.url("/api"))?).build()?;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let hook = RecordingResetHook::default();
	let gateway = Gateway::new(config, store)?.with_reset_hook(Arc::new(hook.clone()));

	gateway.login("owner@pets.test", "demo-password").await?;

	let orders: serde_json::Value = gateway.get_json("/orders").await?;

	println!("Orders after transparent refresh: {orders}.");
	println!("Refresh calls: {}, session resets: {}.", gateway.refresh_metrics.attempts(), hook.len());

	login_mock.assert_async().await;
	expired_mock.assert_async().await;
	refresh_mock.assert_async().await;
	orders_mock.assert_async().await;

	Ok(())
}
