// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span wrapper used around gateway calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("pet_booking_gateway.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event describing which credential (by fingerprint) a request carries.
pub(crate) fn trace_credential(kind: CallKind, fingerprint: Option<&str>) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(call = kind.as_str(), credential = fingerprint.unwrap_or("none"));
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, fingerprint);
	}
}

/// Emits the informational warning logged when a refresh fails and the session is reset.
pub(crate) fn warn_session_reset(login_route: &str, reason: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(login_route, error = %reason, "refresh failed; sign-in required");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (login_route, reason);
	}
}
