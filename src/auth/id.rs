//! Validated name of the storage slot holding the bearer credential.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const KEY_MAX_LEN: usize = 128;

/// Error returned when credential key validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The key was empty.
	#[error("Credential key cannot be empty.")]
	Empty,
	/// The key contains whitespace characters.
	#[error("Credential key contains whitespace.")]
	ContainsWhitespace,
	/// The key exceeded the allowed byte count.
	#[error("Credential key exceeds {max} bytes.")]
	TooLong {
		/// Maximum permitted length.
		max: usize,
	},
}

/// Name of the storage slot holding a bearer credential.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CredentialKey(String);
impl CredentialKey {
	/// Slot name used when no key is configured explicitly.
	pub const DEFAULT: &'static str = "access_token";

	/// Creates a new key after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_key(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Default for CredentialKey {
	fn default() -> Self {
		Self(Self::DEFAULT.to_owned())
	}
}
impl Deref for CredentialKey {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CredentialKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CredentialKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CredentialKey> for String {
	fn from(value: CredentialKey) -> Self {
		value.0
	}
}
impl TryFrom<String> for CredentialKey {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_key(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for CredentialKey {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CredentialKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CredentialKey({})", self.0)
	}
}
impl Display for CredentialKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_key(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.len() > KEY_MAX_LEN {
		return Err(IdentifierError::TooLong { max: KEY_MAX_LEN });
	}

	Ok(())
}
