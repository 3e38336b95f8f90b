//! The authenticated request gateway and the flows it runs (dispatch, refresh, login).

pub mod dispatch;
pub mod refresh;
pub mod session;

mod login;

pub use dispatch::*;
pub use refresh::*;
pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKey},
	config::GatewayConfig,
	http::ApiHttpClient,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestHttpClient>;

/// Sends application requests with the stored bearer credential and recovers once from an
/// expired session.
///
/// The gateway owns the transport, the injected credential store, the validated configuration,
/// and the session-reset hook. Cloning is cheap; clones share all of them, including the refresh
/// guard used by [`RefreshPolicy::Coalesced`](crate::config::RefreshPolicy::Coalesced).
pub struct Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Session-state store holding the bearer credential.
	pub store: Arc<dyn CredentialStore>,
	/// Endpoints, credential slot, and refresh policy.
	pub config: GatewayConfig,
	/// Hook notified when a refresh fails and the user must sign in again.
	pub reset_hook: Arc<dyn SessionResetHook>,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a gateway over the caller-provided transport.
	pub fn with_http_client(
		config: GatewayConfig,
		store: Arc<dyn CredentialStore>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			config,
			reset_hook: Arc::new(NoopResetHook),
			refresh_metrics: Default::default(),
			refresh_guard: Arc::new(AsyncMutex::new(())),
		}
	}

	/// Sets or replaces the session-reset hook.
	pub fn with_reset_hook(mut self, hook: Arc<dyn SessionResetHook>) -> Self {
		self.reset_hook = hook;

		self
	}

	/// Returns the currently stored credential, if any.
	pub async fn credential(&self) -> Result<Option<Credential>> {
		let stored = self.store.fetch(self.key()).await?;

		Ok(stored.map(|record| record.credential))
	}

	fn key(&self) -> &CredentialKey {
		&self.config.credential_key
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient> {
	/// Creates a gateway with its own cookie-aware reqwest transport.
	pub fn new(config: GatewayConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(config, store, ReqwestHttpClient::new()?))
	}
}
impl<C> Clone for Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			reset_hook: self.reset_hook.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("api_base", &self.config.api_base.as_str())
			.field("credential_key", &self.config.credential_key)
			.field("refresh_policy", &self.config.refresh_policy)
			.finish()
	}
}
