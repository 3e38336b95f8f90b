//! Optional observability helpers for gateway calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `pet_booking_gateway.call` with the `call`
//!   (dispatch/retry/refresh/login/import) and `stage` (call site) fields, plus warnings when a session is
//!   reset.
//! - Enable `metrics` to increment the `pet_booking_gateway_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, auth::CredentialSource};

/// Kinds of outbound calls the gateway makes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// First dispatch of an application request.
	Dispatch,
	/// Replay of an application request after a refresh.
	Retry,
	/// Unauthenticated refresh endpoint call.
	Refresh,
	/// Login endpoint call.
	Login,
	/// Credential handed over by the embedding application.
	Import,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Dispatch => "dispatch",
			CallKind::Retry => "retry",
			CallKind::Refresh => "refresh",
			CallKind::Login => "login",
			CallKind::Import => "import",
		}
	}
}
impl From<CredentialSource> for CallKind {
	fn from(source: CredentialSource) -> Self {
		match source {
			CredentialSource::Login => CallKind::Login,
			CredentialSource::Refresh => CallKind::Refresh,
			CredentialSource::Imported => CallKind::Import,
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a gateway helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credential_sources_trace_under_their_own_kind() {
		assert_eq!(CallKind::from(CredentialSource::Login), CallKind::Login);
		assert_eq!(CallKind::from(CredentialSource::Refresh), CallKind::Refresh);
		assert_eq!(CallKind::from(CredentialSource::Imported).as_str(), "import");
	}
}
