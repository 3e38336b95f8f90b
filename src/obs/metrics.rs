// self
use crate::obs::{CallKind, CallOutcome};

/// Counter incremented once per recorded call outcome.
pub const CALL_COUNTER: &str = "pet_booking_gateway_call_total";

/// Bumps [`CALL_COUNTER`] labeled with `call` and `outcome`.
///
/// Compiles to nothing without the `metrics` feature; with it, samples go to whichever recorder
/// the application installed.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(CALL_COUNTER, "call" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn every_call_label_is_distinct_and_recordable() {
		let kinds = [
			CallKind::Dispatch,
			CallKind::Retry,
			CallKind::Refresh,
			CallKind::Login,
			CallKind::Import,
		];
		let mut labels: Vec<_> = kinds.iter().map(|kind| kind.as_str()).collect();

		labels.sort_unstable();
		labels.dedup();

		assert_eq!(labels.len(), kinds.len());

		// No recorder is installed here, so every combination must be a silent no-op.
		for kind in kinds {
			for outcome in [CallOutcome::Attempt, CallOutcome::Success, CallOutcome::Failure] {
				record_call_outcome(kind, outcome);
			}
		}
	}
}
