//! Authenticated dispatch with a single refresh-and-retry on 401.
//!
//! [`Gateway::send`] reads the stored credential, attaches it as a bearer header, and dispatches
//! the request. A 401 on the first attempt triggers one refresh through
//! [`Gateway::refresh_credential`]; the request is then replayed once with the new credential.
//! The retry state lives in [`PendingRequest::attempted_refresh`], so a replayed request that is
//! rejected again surfaces [`Error::Unauthorized`] instead of refreshing a second time. A failed
//! refresh notifies the [`SessionResetHook`](crate::flows::SessionResetHook) and surfaces
//! [`Error::SessionExpired`] with the original 401.

// crates.io
use ::http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::{ConfigError, RefreshError},
	flows::{Gateway, SessionReset},
	http::{ApiHttpClient, ApiRequest, ApiResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// An outbound request together with its refresh bookkeeping.
#[derive(Clone, Debug)]
pub struct PendingRequest {
	/// The request as it will be dispatched, including the bearer header.
	pub request: ApiRequest,
	/// Set once a refresh was attempted on behalf of this request.
	pub attempted_refresh: bool,
	credential: Option<Credential>,
}
impl PendingRequest {
	/// Wraps a fresh request; no refresh has been attempted for it yet.
	pub fn new(request: ApiRequest) -> Self {
		Self { request, attempted_refresh: false, credential: None }
	}

	/// Attaches `credential` as the bearer header.
	pub fn authorize(mut self, credential: Credential) -> Result<Self, ConfigError> {
		let value = credential.header_value()?;

		self.request.headers.insert(AUTHORIZATION, value);
		self.credential = Some(credential);

		Ok(self)
	}

	/// Produces the single replay allowed after a refresh.
	pub fn into_retry(self, credential: Credential) -> Result<Self, ConfigError> {
		let mut retry = self.authorize(credential)?;

		retry.attempted_refresh = true;

		Ok(retry)
	}

	/// Credential the request was authorized with, if any.
	pub fn credential(&self) -> Option<&Credential> {
		self.credential.as_ref()
	}
}

impl<C> Gateway<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Sends `request` with the stored credential, refreshing and replaying once on 401.
	///
	/// Every status other than 401 is returned as `Ok`, unmodified. Use
	/// [`ApiResponse::error_for_status`] to turn 4xx/5xx into errors.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		let url = self.config.resolve(&request.path)?;
		let mut pending = PendingRequest::new(request);

		// An empty slot counts as signed out.
		if let Some(credential) =
			self.credential().await?.filter(|credential| !credential.expose().is_empty())
		{
			pending = pending.authorize(credential)?;
		}

		loop {
			let kind = if pending.attempted_refresh { CallKind::Retry } else { CallKind::Dispatch };
			let response = self.dispatch(kind, &pending, &url).await?;

			if !response.is_unauthorized() {
				return Ok(response);
			}
			if pending.attempted_refresh {
				return Err(Error::Unauthorized { response: Box::new(response) });
			}

			let recovered = self.recover(pending.credential()).await;

			match recovered {
				Ok(credential) => pending = pending.into_retry(credential)?,
				Err(source) => return Err(self.reset_session(response, source)),
			}
		}
	}

	/// Sends a `GET` request.
	pub async fn get(&self, path: impl Into<String>) -> Result<ApiResponse> {
		self.send(ApiRequest::get(path)).await
	}

	/// Sends a `GET` request and decodes a successful JSON body.
	pub async fn get_json<T>(&self, path: impl Into<String>) -> Result<T>
	where
		T: serde::de::DeserializeOwned,
	{
		let response = self.get(path).await?.error_for_status()?;

		Ok(response.json()?)
	}

	/// Sends a `POST` request with a JSON body.
	pub async fn post_json<T>(&self, path: impl Into<String>, payload: &T) -> Result<ApiResponse>
	where
		T: ?Sized + Serialize,
	{
		self.send(ApiRequest::post(path).json(payload)?).await
	}

	/// Sends a `PUT` request with a JSON body.
	pub async fn put_json<T>(&self, path: impl Into<String>, payload: &T) -> Result<ApiResponse>
	where
		T: ?Sized + Serialize,
	{
		self.send(ApiRequest::put(path).json(payload)?).await
	}

	/// Sends a `PATCH` request with a JSON body.
	pub async fn patch_json<T>(&self, path: impl Into<String>, payload: &T) -> Result<ApiResponse>
	where
		T: ?Sized + Serialize,
	{
		self.send(ApiRequest::patch(path).json(payload)?).await
	}

	/// Sends a `DELETE` request.
	pub async fn delete(&self, path: impl Into<String>) -> Result<ApiResponse> {
		self.send(ApiRequest::delete(path)).await
	}

	async fn dispatch(
		&self,
		kind: CallKind,
		pending: &PendingRequest,
		url: &Url,
	) -> Result<ApiResponse> {
		let span = CallSpan::new(kind, "send");

		obs::record_call_outcome(kind, CallOutcome::Attempt);
		obs::trace_credential(kind, pending.credential().map(Credential::fingerprint).as_deref());

		let result = span
			.instrument(async move {
				let request = pending.request.to_http(url)?;
				let response = self.http_client.execute(request).await?;

				Ok::<_, Error>(ApiResponse::from(response))
			})
			.await;

		match &result {
			Ok(response) if !response.is_unauthorized() =>
				obs::record_call_outcome(kind, CallOutcome::Success),
			_ => obs::record_call_outcome(kind, CallOutcome::Failure),
		}

		result
	}

	fn reset_session(&self, response: ApiResponse, source: RefreshError) -> Error {
		let login_path = self.config.login_route.clone();

		obs::warn_session_reset(&login_path, &source);
		self.reset_hook.on_session_reset(&SessionReset::new(&login_path, source.to_string()));

		Error::SessionExpired { response: Box::new(response), login_path, source }
	}
}
