//! Credential refresh against the unauthenticated refresh endpoint.
//!
//! The refresh call goes straight to the transport with an empty JSON body and no bearer
//! header, so it can never be intercepted by the 401 handling in
//! [`Gateway::send`](crate::flows::Gateway::send). The endpoint authenticates the session cookie
//! and answers `{"access": "<credential>"}`; the new credential replaces the stored one.
//!
//! Under [`RefreshPolicy::Coalesced`] refreshes run behind a single async guard. A caller that
//! acquires the guard after another task already rotated the credential reuses the stored value
//! instead of calling the endpoint again.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialSource, StoredCredential},
	config::RefreshPolicy,
	error::RefreshError,
	flows::Gateway,
	http::{ApiHttpClient, ApiRequest, ApiResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Body returned by the login and refresh endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessPayload {
	pub(crate) access: String,
}

impl<C> Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Exchanges the session cookie for a new bearer credential and persists it.
	pub async fn refresh_credential(&self) -> Result<Credential, RefreshError> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh_credential");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let endpoint = &self.config.refresh_endpoint;
				let request = ApiRequest::post(endpoint.as_str())
					.json(&serde_json::json!({}))?
					.to_http(endpoint)?;
				let response = ApiResponse::from(self.http_client.execute(request).await?);

				if !response.is_success() {
					return Err(RefreshError::Rejected { status: response.status.as_u16() });
				}

				let credential = Credential::issued(response.json::<AccessPayload>()?.access)?;

				self.store
					.save(
						&self.config.credential_key,
						StoredCredential::new(credential.clone(), CredentialSource::Refresh),
					)
					.await?;
				obs::trace_credential(KIND, Some(&credential.fingerprint()));

				Ok::<_, RefreshError>(credential)
			})
			.await;

		match &result {
			Ok(_) => {
				self.refresh_metrics.record_success();
				obs::record_call_outcome(KIND, CallOutcome::Success);
			},
			Err(_) => {
				self.refresh_metrics.record_failure();
				obs::record_call_outcome(KIND, CallOutcome::Failure);
			},
		}

		result
	}

	/// Obtains a replacement for `sent_with` according to the configured refresh policy.
	pub(crate) async fn recover(
		&self,
		sent_with: Option<&Credential>,
	) -> Result<Credential, RefreshError> {
		match self.config.refresh_policy {
			RefreshPolicy::Independent => self.refresh_credential().await,
			RefreshPolicy::Coalesced => {
				let _singleflight = self.refresh_guard.lock().await;
				let current = self.store.fetch(&self.config.credential_key).await?;

				if let Some(stored) = current.filter(|stored| Some(&stored.credential) != sent_with) {
					self.refresh_metrics.record_reuse();

					return Ok(stored.credential);
				}

				self.refresh_credential().await
			},
		}
	}
}
