//! Bearer credential wrapper and the record persisted by credential stores.

// crates.io
use ::http::{HeaderValue, header::InvalidHeaderValue};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Reasons a credential issued by the API cannot be used as a bearer header.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// The endpoint issued an empty credential.
	#[error("Issued credential is empty.")]
	Empty,
	/// The credential contains bytes that are not allowed in a header value.
	#[error("Issued credential cannot be encoded as an Authorization header.")]
	NotHeaderSafe(#[from] InvalidHeaderValue),
}

/// Opaque bearer credential; redacted in every formatter.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);
impl Credential {
	/// Wraps a bearer token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Accepts a credential issued by the login or refresh endpoint.
	///
	/// Rejects values that could never be sent back, so they are not persisted.
	pub fn issued(value: impl Into<String>) -> Result<Self, CredentialError> {
		let credential = Self::new(value);

		if credential.0.is_empty() {
			return Err(CredentialError::Empty);
		}

		credential.header_value()?;

		Ok(credential)
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Formats the value for an `Authorization` header.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}

	/// Encodes the `Authorization` header value.
	pub fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
		HeaderValue::from_str(&self.bearer())
	}

	/// Short, non-reversible tag that identifies the credential in logs.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(self.0.as_bytes());

		URL_SAFE_NO_PAD.encode(&digest[..8])
	}
}
impl AsRef<str> for Credential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// How a stored credential was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
	/// Issued by the login endpoint.
	Login,
	/// Issued by the refresh endpoint after a 401.
	Refresh,
	/// Handed to the store by the embedding application.
	Imported,
}

/// Credential plus the bookkeeping stores keep alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
	/// The bearer credential.
	pub credential: Credential,
	/// Where the credential came from.
	pub source: CredentialSource,
	/// When the credential was written.
	pub stored_at: OffsetDateTime,
}
impl StoredCredential {
	/// Wraps a credential, stamping it with the current UTC instant.
	pub fn new(credential: Credential, source: CredentialSource) -> Self {
		Self { credential, source, stored_at: OffsetDateTime::now_utc() }
	}

	/// Overrides the write instant.
	pub fn with_stored_at(mut self, instant: OffsetDateTime) -> Self {
		self.stored_at = instant;

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credential_formatters_redact() {
		let credential = Credential::new("super-secret");

		assert_eq!(format!("{credential:?}"), "Credential(\"<redacted>\")");
		assert_eq!(format!("{credential}"), "<redacted>");
		assert_eq!(credential.bearer(), "Bearer super-secret");
	}

	#[test]
	fn issued_credentials_must_be_header_safe() {
		assert_eq!(
			Credential::issued("eyJhbGciOi.payload.sig")
				.expect("JWT-shaped credentials should be accepted.")
				.expose(),
			"eyJhbGciOi.payload.sig"
		);
		assert!(matches!(Credential::issued(""), Err(CredentialError::Empty)));
		assert!(matches!(
			Credential::issued("bad\ntoken"),
			Err(CredentialError::NotHeaderSafe(_))
		));
	}

	#[test]
	fn fingerprint_is_stable_and_distinct() {
		let a = Credential::new("token-a");
		let b = Credential::new("token-b");

		assert_eq!(a.fingerprint(), Credential::new("token-a").fingerprint());
		assert_ne!(a.fingerprint(), b.fingerprint());
		assert_eq!(a.fingerprint().len(), 11);
		assert!(!a.fingerprint().contains("token"));
	}

	#[test]
	fn stored_credential_serializes_source_in_snake_case() {
		let stored = StoredCredential::new(Credential::new("abc"), CredentialSource::Refresh)
			.with_stored_at(time::macros::datetime!(2025-11-10 12:00 UTC));
		let payload =
			serde_json::to_value(&stored).expect("Stored credential should serialize to JSON.");

		assert_eq!(payload["credential"], "abc");
		assert_eq!(payload["source"], "refresh");
	}
}
