// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialSource, StoredCredential},
	flows::{Gateway, refresh::AccessPayload},
	http::{ApiHttpClient, ApiRequest, ApiResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

#[derive(Serialize)]
struct LoginPayload<'a> {
	username: &'a str,
	password: &'a str,
}

impl<C> Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Signs in with username and password and stores the issued credential.
	///
	/// The login endpoint is called without a bearer header. Besides the credential it usually
	/// sets the session cookie the refresh endpoint relies on, which the transport keeps.
	pub async fn login(&self, username: &str, password: &str) -> Result<Credential> {
		const KIND: CallKind = CallKind::Login;

		let span = CallSpan::new(KIND, "login");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let endpoint = &self.config.login_endpoint;
				let request = ApiRequest::post(endpoint.as_str())
					.json(&LoginPayload { username, password })?
					.to_http(endpoint)?;
				let response =
					ApiResponse::from(self.http_client.execute(request).await?).error_for_status()?;
				let credential = Credential::issued(response.json::<AccessPayload>()?.access)?;

				self.import_credential(credential.clone(), CredentialSource::Login).await?;

				Ok::<_, Error>(credential)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Stores `credential` as the current bearer credential.
	pub async fn import_credential(
		&self,
		credential: Credential,
		source: CredentialSource,
	) -> Result<()> {
		obs::trace_credential(CallKind::from(source), Some(&credential.fingerprint()));
		self.store
			.save(&self.config.credential_key, StoredCredential::new(credential, source))
			.await?;

		Ok(())
	}

	/// Forgets the stored credential; later requests go out unauthenticated.
	pub async fn logout(&self) -> Result<Option<Credential>> {
		let removed = self.store.remove(&self.config.credential_key).await?;

		Ok(removed.map(|record| record.credential))
	}
}
