// self
use crate::obs::{CallKind, CallOutcome};

/// Counts one gateway call stage on `cel_cash_call_total`, labeled by `kind` and `outcome`.
///
/// Token exchanges and resource operations each record an `attempt` before dispatch and then
/// either `success` or `failure`, so `attempt - success - failure` is the number of calls in
/// flight. Compiles to nothing without the `metrics` feature.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cel_cash_call_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts one bearer lookup on `cel_cash_token_cache_total`, labeled `hit` or `miss`.
pub fn record_token_cache_lookup(hit: bool) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cel_cash_token_cache_total",
			"result" => if hit { "hit" } else { "miss" }
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = hit;
	}
}
