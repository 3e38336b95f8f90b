//! Process-local [`CredentialStore`] for tests, demos, and short-lived sessions.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, StoredCredential},
	store::{CredentialStore, StoreError, StoreFuture},
};

type SlotMap = Arc<RwLock<HashMap<CredentialKey, StoredCredential>>>;

/// Thread-safe storage backend that keeps credentials in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SlotMap);
impl MemoryStore {
	/// Creates a store pre-populated with `record` under `key`.
	pub fn seeded(key: CredentialKey, record: StoredCredential) -> Self {
		let store = Self::default();

		store.0.write().insert(key, record);

		store
	}

	/// Returns a snapshot of the slot without going through the async contract.
	pub fn peek(&self, key: &CredentialKey) -> Option<StoredCredential> {
		self.0.read().get(key).cloned()
	}

	fn save_now(map: SlotMap, key: CredentialKey, record: StoredCredential) -> Result<(), StoreError> {
		map.write().insert(key, record);

		Ok(())
	}
}
impl CredentialStore for MemoryStore {
	fn save<'a>(
		&'a self,
		key: &'a CredentialKey,
		record: StoredCredential,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move { Self::save_now(map, key, record) })
	}

	fn fetch<'a>(&'a self, key: &'a CredentialKey) -> StoreFuture<'a, Option<StoredCredential>> {
		Box::pin(async move { Ok(self.peek(key)) })
	}

	fn remove<'a>(
		&'a self,
		key: &'a CredentialKey,
	) -> StoreFuture<'a, Option<StoredCredential>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(key)) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{Credential, CredentialSource};

	#[tokio::test]
	async fn save_fetch_and_remove_share_one_slot() {
		let store = MemoryStore::default();
		let key = CredentialKey::default();
		let first = StoredCredential::new(Credential::new("first"), CredentialSource::Login);
		let second = StoredCredential::new(Credential::new("second"), CredentialSource::Refresh);

		assert!(store.fetch(&key).await.expect("Fetch should succeed.").is_none());

		store.save(&key, first).await.expect("First save should succeed.");
		store.save(&key, second.clone()).await.expect("Second save should succeed.");

		let fetched = store.fetch(&key).await.expect("Fetch should succeed.");

		assert_eq!(fetched, Some(second.clone()));
		assert_eq!(store.remove(&key).await.expect("Remove should succeed."), Some(second));
		assert!(store.peek(&key).is_none());
	}

	#[tokio::test]
	async fn keys_are_isolated() {
		let customer = CredentialKey::new("customer_token").expect("Key fixture should be valid.");
		let store = MemoryStore::seeded(
			customer.clone(),
			StoredCredential::new(Credential::new("c"), CredentialSource::Imported),
		);

		assert!(store.peek(&CredentialKey::default()).is_none());
		assert!(store.peek(&customer).is_some());
	}
}
