//! Storage contracts and built-in backends for the gateway's bearer credential.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, StoredCredential},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Session-state backend holding bearer credentials by slot name.
///
/// The gateway reads the slot before every dispatch and writes it after login and refresh.
/// Writes to the same key are last-writer-wins.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the credential held under `key`.
	fn save<'a>(&'a self, key: &'a CredentialKey, record: StoredCredential)
	-> StoreFuture<'a, ()>;

	/// Fetches the credential held under `key`, if present.
	fn fetch<'a>(&'a self, key: &'a CredentialKey) -> StoreFuture<'a, Option<StoredCredential>>;

	/// Removes the credential held under `key`, returning what was stored.
	fn remove<'a>(&'a self, key: &'a CredentialKey)
	-> StoreFuture<'a, Option<StoredCredential>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_gateway_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let gateway_error: Error = store_error.clone().into();

		assert!(matches!(gateway_error, Error::Storage(_)));
		assert!(gateway_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&gateway_error)
			.expect("Gateway error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
