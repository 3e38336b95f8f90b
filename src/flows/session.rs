//! Session-reset notifications raised when an expired session cannot be recovered.

// self
use crate::_prelude::*;

/// Describes a session that must be re-established through the login entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReset {
	/// Route the user should be sent to.
	pub login_route: String,
	/// Why the refresh failed.
	pub reason: String,
	/// When the gateway gave up on the session.
	pub occurred_at: OffsetDateTime,
}
impl SessionReset {
	/// Creates a reset event stamped with the current UTC instant.
	pub fn new(login_route: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			login_route: login_route.into(),
			reason: reason.into(),
			occurred_at: OffsetDateTime::now_utc(),
		}
	}
}

/// Receives [`SessionReset`] events; typically wired to the application's navigation.
///
/// Called synchronously, once per failed refresh, before the failing request returns.
pub trait SessionResetHook
where
	Self: Send + Sync,
{
	/// Handles a reset, e.g. by navigating to `reset.login_route`.
	fn on_session_reset(&self, reset: &SessionReset);
}

/// Hook that ignores resets; callers still receive [`Error::SessionExpired`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopResetHook;
impl SessionResetHook for NoopResetHook {
	fn on_session_reset(&self, _: &SessionReset) {}
}

/// Hook that queues resets for callers that poll instead of reacting inline.
#[derive(Clone, Debug, Default)]
pub struct RecordingResetHook(Arc<Mutex<Vec<SessionReset>>>);
impl RecordingResetHook {
	/// Drains and returns every reset recorded so far.
	pub fn take(&self) -> Vec<SessionReset> {
		std::mem::take(&mut *self.0.lock())
	}

	/// Number of resets recorded and not yet taken.
	pub fn len(&self) -> usize {
		self.0.lock().len()
	}

	/// Returns `true` when no reset is pending.
	pub fn is_empty(&self) -> bool {
		self.0.lock().is_empty()
	}
}
impl SessionResetHook for RecordingResetHook {
	fn on_session_reset(&self, reset: &SessionReset) {
		self.0.lock().push(reset.clone());
	}
}
