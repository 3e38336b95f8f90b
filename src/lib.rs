//! Authenticated request gateway for the pet-booking API: bearer injection, durable credential
//! stores, and a single refresh-and-retry cycle on expired sessions.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::GatewayConfig,
		flows::Gateway,
		http::ReqwestHttpClient,
		store::{CredentialStore, MemoryStore},
	};

	/// Gateway type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGateway = Gateway<ReqwestHttpClient>;

	/// Builds a gateway rooted at `api_base`, backed by an in-memory store and the default reqwest
	/// transport.
	pub fn build_reqwest_test_gateway(api_base: &str) -> (ReqwestTestGateway, Arc<MemoryStore>) {
		let config = GatewayConfig::builder(
			Url::parse(api_base).expect("Test API base should be a valid URL."),
		)
		.build()
		.expect("Test gateway configuration should be valid.");

		build_reqwest_test_gateway_with(config)
	}

	/// Builds a gateway for the provided configuration, backed by an in-memory store.
	pub fn build_reqwest_test_gateway_with(
		config: GatewayConfig,
	) -> (ReqwestTestGateway, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let http_client =
			ReqwestHttpClient::new().expect("Failed to build Reqwest client for tests.");
		let gateway = Gateway::with_http_client(config, store, http_client);

		(gateway, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
