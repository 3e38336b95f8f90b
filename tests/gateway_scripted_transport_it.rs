#![cfg(feature = "reqwest")]

// std
use std::{env, fs, process};
// self
use pet_booking_gateway::{
	_preludet::*,
	auth::{Credential, CredentialError, CredentialKey, CredentialSource, StoredCredential},
	config::{GatewayConfig, RefreshPolicy},
	error::{RefreshError, TransportError},
	flows::{Gateway, RecordingResetHook},
	http::{ApiHttpClient, ApiRequest, HttpRequest, HttpResponse, TransportFuture},
	http_types::{StatusCode, header::AUTHORIZATION},
	store::{CredentialStore, FileStore, MemoryStore},
};

const API_BASE: &str = "http://pets.test/api";

#[derive(Clone, Debug)]
struct Recorded {
	method: String,
	path: String,
	authorization: Option<String>,
	body: Vec<u8>,
}

/// In-process API: `/api/orders` accepts only `Bearer fresh`, `/api/token/refresh` answers with
/// `refresh_status` and issues `issued`, `/api/reports` always fails with 500, and `/api/offline`
/// fails in transport.
struct ScriptedApi {
	log: Mutex<Vec<Recorded>>,
	refresh_status: u16,
	issued: &'static str,
}
impl ScriptedApi {
	fn new(refresh_status: u16) -> Self {
		Self { log: Mutex::new(Vec::new()), refresh_status, issued: "fresh" }
	}

	fn issuing(mut self, issued: &'static str) -> Self {
		self.issued = issued;

		self
	}

	fn recorded(&self) -> Vec<Recorded> {
		self.log.lock().clone()
	}

	fn calls_to(&self, path: &str) -> Vec<Recorded> {
		self.recorded().into_iter().filter(|call| call.path == path).collect()
	}
}
impl ApiHttpClient for ScriptedApi {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			// Yield so concurrent callers interleave at every network boundary.
			tokio::task::yield_now().await;

			let recorded = Recorded {
				method: request.method().to_string(),
				path: request.uri().path().to_owned(),
				authorization: request
					.headers()
					.get(AUTHORIZATION)
					.and_then(|value| value.to_str().ok())
					.map(str::to_owned),
				body: request.body().clone(),
			};

			self.log.lock().push(recorded.clone());

			let (status, body) = match recorded.path.as_str() {
				"/api/offline" =>
					return Err(TransportError::Io(std::io::Error::other("connection reset"))),
				"/api/token/refresh" =>
					(self.refresh_status, serde_json::json!({ "access": self.issued }).to_string()),
				"/api/reports" => (500, r#"{"detail":"report service down"}"#.to_owned()),
				"/api/orders" if recorded.authorization.as_deref() == Some("Bearer fresh") =>
					(200, r#"[{"id":1}]"#.to_owned()),
				"/api/orders" => (401, r#"{"detail":"token expired"}"#.to_owned()),
				_ => (404, r#"{"detail":"not found"}"#.to_owned()),
			};
			let mut response = HttpResponse::new(body.into_bytes());

			*response.status_mut() =
				StatusCode::from_u16(status).expect("Scripted status should be valid.");

			Ok(response)
		})
	}
}

fn config(policy: RefreshPolicy) -> GatewayConfig {
	GatewayConfig::builder(Url::parse(API_BASE).expect("API base should parse."))
		.refresh_policy(policy)
		.build()
		.expect("Scripted gateway configuration should be valid.")
}

fn gateway_with(
	api: Arc<ScriptedApi>,
	policy: RefreshPolicy,
	seed: Option<&str>,
) -> (Gateway<ScriptedApi>, Arc<MemoryStore>) {
	let store_backend = Arc::new(match seed {
		Some(token) => MemoryStore::seeded(
			CredentialKey::default(),
			StoredCredential::new(Credential::new(token), CredentialSource::Imported),
		),
		None => MemoryStore::default(),
	});
	let store: Arc<dyn CredentialStore> = store_backend.clone();

	(Gateway::with_http_client(config(policy), store, api), store_backend)
}

#[tokio::test]
async fn missing_credential_omits_bearer_header() {
	let api = Arc::new(ScriptedApi::new(200));
	let (gateway, _) = gateway_with(api.clone(), RefreshPolicy::Independent, None);
	let response = gateway.get("/stores").await.expect("Unauthenticated request should complete.");

	assert_eq!(response.status, StatusCode::NOT_FOUND);

	let calls = api.recorded();

	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].path, "/api/stores");
	assert_eq!(calls[0].authorization, None);
}

#[tokio::test]
async fn refresh_call_bypasses_the_gateway() {
	let api = Arc::new(ScriptedApi::new(200));
	let (gateway, store) = gateway_with(api.clone(), RefreshPolicy::Independent, Some("stale"));
	let response = gateway.get("/orders").await.expect("Refreshed request should succeed.");

	assert_eq!(response.status, StatusCode::OK);

	let refreshes = api.calls_to("/api/token/refresh");

	assert_eq!(refreshes.len(), 1);
	assert_eq!(refreshes[0].method, "POST");
	assert_eq!(refreshes[0].authorization, None);
	assert_eq!(refreshes[0].body, b"{}");

	let orders: Vec<_> =
		api.calls_to("/api/orders").into_iter().map(|call| call.authorization).collect();

	assert_eq!(orders, [Some("Bearer stale".to_owned()), Some("Bearer fresh".to_owned())]);

	let stored = store.peek(&CredentialKey::default()).expect("Refreshed credential should be stored.");

	assert_eq!(stored.credential.expose(), "fresh");
	assert_eq!(stored.source, CredentialSource::Refresh);
}

#[tokio::test]
async fn refresh_without_credential_still_recovers() {
	let api = Arc::new(ScriptedApi::new(200));
	let (gateway, _) = gateway_with(api.clone(), RefreshPolicy::Independent, None);
	let response = gateway.get("/orders").await.expect("Cookie-backed refresh should recover.");

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(gateway.refresh_metrics.attempts(), 1);
	assert_eq!(api.calls_to("/api/orders")[0].authorization, None);
}

#[tokio::test]
async fn transport_errors_propagate_without_refresh() {
	let api = Arc::new(ScriptedApi::new(200));
	let (gateway, _) = gateway_with(api.clone(), RefreshPolicy::Independent, Some("stale"));
	let err = gateway.get("/offline").await.expect_err("Transport failures should surface.");

	assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	assert_eq!(gateway.refresh_metrics.attempts(), 0);
	assert!(api.calls_to("/api/token/refresh").is_empty());
}

#[tokio::test]
async fn rejected_refresh_reports_status_and_resets_session() {
	let api = Arc::new(ScriptedApi::new(401));
	let hook = RecordingResetHook::default();
	let (gateway, store) = gateway_with(api.clone(), RefreshPolicy::Independent, Some("stale"));
	let gateway = gateway.with_reset_hook(Arc::new(hook.clone()));
	let err = gateway.get("/orders").await.expect_err("Failed refresh should surface.");

	match err {
		Error::SessionExpired { response, login_path, source } => {
			assert_eq!(response.status, StatusCode::UNAUTHORIZED);
			assert_eq!(login_path, "/login");
			assert!(matches!(source, RefreshError::Rejected { status: 401 }));
		},
		other => panic!("Expected a session expiry, got {other:?}."),
	}

	assert_eq!(api.calls_to("/api/orders").len(), 1, "No replay may follow a failed refresh.");
	assert_eq!(hook.take().len(), 1);
	assert_eq!(gateway.refresh_metrics.failures(), 1);
	assert_eq!(
		store.peek(&CredentialKey::default()).map(|stored| stored.credential),
		Some(Credential::new("stale")),
		"A failed refresh leaves the stored credential for the login flow to replace."
	);
}

#[tokio::test]
async fn independent_policy_refreshes_per_failing_request() {
	let api = Arc::new(ScriptedApi::new(200));
	let (gateway, _) = gateway_with(api.clone(), RefreshPolicy::Independent, Some("stale"));
	let (first, second) = tokio::join!(gateway.get("/orders"), gateway.get("/orders"));

	assert_eq!(first.expect("First request should recover.").status, StatusCode::OK);
	assert_eq!(second.expect("Second request should recover.").status, StatusCode::OK);
	assert_eq!(api.calls_to("/api/token/refresh").len(), 2);
	assert_eq!(gateway.refresh_metrics.reused(), 0);
}

#[tokio::test]
async fn coalesced_policy_shares_one_refresh() {
	let api = Arc::new(ScriptedApi::new(200));
	let (gateway, _) = gateway_with(api.clone(), RefreshPolicy::Coalesced, Some("stale"));
	let (first, second) = tokio::join!(gateway.get("/orders"), gateway.get("/orders"));

	assert_eq!(first.expect("First request should recover.").status, StatusCode::OK);
	assert_eq!(second.expect("Second request should recover.").status, StatusCode::OK);
	assert_eq!(api.calls_to("/api/token/refresh").len(), 1);
	assert_eq!(gateway.refresh_metrics.reused(), 1);
	assert_eq!(api.calls_to("/api/orders").len(), 4);
}

#[tokio::test]
async fn refreshed_credential_is_durable() {
	let path = env::temp_dir().join(format!(
		"pet_booking_gateway_durable_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	));
	let file_store = FileStore::open(&path).expect("Failed to open file store.");

	file_store
		.save(
			&CredentialKey::default(),
			StoredCredential::new(Credential::new("stale"), CredentialSource::Login),
		)
		.await
		.expect("Seeding the file store should succeed.");

	let api = Arc::new(ScriptedApi::new(200));
	let gateway: Gateway<ScriptedApi> =
		Gateway::with_http_client(config(RefreshPolicy::Independent), Arc::new(file_store), api);

	gateway.get("/orders").await.expect("Refreshed request should succeed.");

	let reopened = FileStore::open(&path).expect("Failed to reopen file store.");
	let stored = reopened
		.fetch(&CredentialKey::default())
		.await
		.expect("Fetch should succeed.")
		.expect("Refreshed credential should survive reopen.");

	assert_eq!(stored.credential.expose(), "fresh");
	assert_eq!(stored.source, CredentialSource::Refresh);

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
	});
}

#[tokio::test]
async fn explicit_requests_keep_caller_headers() {
	let api = Arc::new(ScriptedApi::new(200));
	let (gateway, _) = gateway_with(api.clone(), RefreshPolicy::Independent, Some("fresh"));
	let request = ApiRequest::get("/orders").header(
		pet_booking_gateway::http_types::header::ACCEPT,
		pet_booking_gateway::http_types::HeaderValue::from_static("application/json"),
	);
	let orders: serde_json::Value = gateway
		.send(request)
		.await
		.expect("Authorized request should succeed.")
		.json()
		.expect("Orders should decode.");

	assert_eq!(orders[0]["id"], 1);
	assert_eq!(gateway.refresh_metrics.attempts(), 0);
}

#[tokio::test]
async fn server_errors_with_credential_skip_refresh() {
	let api = Arc::new(ScriptedApi::new(200));
	let (gateway, store) = gateway_with(api.clone(), RefreshPolicy::Independent, Some("stale"));
	let response = gateway.get("/reports").await.expect("A 500 should be returned as a response.");

	assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(gateway.refresh_metrics.attempts(), 0);
	assert!(api.calls_to("/api/token/refresh").is_empty());
	assert_eq!(api.calls_to("/api/reports")[0].authorization.as_deref(), Some("Bearer stale"));
	assert_eq!(
		store.peek(&CredentialKey::default()).map(|stored| stored.credential),
		Some(Credential::new("stale"))
	);
}

#[tokio::test]
async fn empty_stored_credential_omits_bearer_header() {
	let api = Arc::new(ScriptedApi::new(200));
	let (gateway, _) = gateway_with(api.clone(), RefreshPolicy::Independent, None);

	gateway
		.import_credential(Credential::new(""), CredentialSource::Imported)
		.await
		.expect("Importing should succeed.");
	gateway.get("/stores").await.expect("Unauthenticated request should complete.");

	let calls = api.calls_to("/api/stores");

	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].authorization, None);
}

#[tokio::test]
async fn unusable_refreshed_credential_resets_session() {
	let api = Arc::new(ScriptedApi::new(200).issuing("bad\ntoken"));
	let hook = RecordingResetHook::default();
	let (gateway, store) = gateway_with(api.clone(), RefreshPolicy::Independent, Some("stale"));
	let gateway = gateway.with_reset_hook(Arc::new(hook.clone()));
	let err = gateway.get("/orders").await.expect_err("An unusable credential should surface.");

	match err {
		Error::SessionExpired { response, source, .. } => {
			assert_eq!(response.status, StatusCode::UNAUTHORIZED);
			assert!(matches!(source, RefreshError::Credential(CredentialError::NotHeaderSafe(_))));
		},
		other => panic!("Expected a session expiry, got {other:?}."),
	}

	assert_eq!(hook.len(), 1);
	assert_eq!(api.calls_to("/api/orders").len(), 1);
	assert_eq!(
		store.peek(&CredentialKey::default()).map(|stored| stored.credential),
		Some(Credential::new("stale")),
		"An unusable credential must never reach the store."
	);

	// The next request still reaches the API and gets its own refresh attempt.
	gateway.get("/orders").await.expect_err("The refresh endpoint still issues a bad credential.");

	assert_eq!(api.calls_to("/api/orders").len(), 2);
	assert_eq!(api.calls_to("/api/token/refresh").len(), 2);
	assert_eq!(hook.len(), 2);
}

#[tokio::test]
async fn empty_refreshed_credential_resets_session() {
	let api = Arc::new(ScriptedApi::new(200).issuing(""));
	let hook = RecordingResetHook::default();
	let (gateway, _) = gateway_with(api.clone(), RefreshPolicy::Independent, Some("stale"));
	let gateway = gateway.with_reset_hook(Arc::new(hook.clone()));
	let err = gateway.get("/orders").await.expect_err("An empty credential should surface.");

	assert!(matches!(
		err,
		Error::SessionExpired { source: RefreshError::Credential(CredentialError::Empty), .. }
	));
	assert_eq!(hook.len(), 1);
}
