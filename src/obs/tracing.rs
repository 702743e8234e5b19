// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span wrapping one outbound call.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("cel_cash.call", kind = kind.as_str(), stage);

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

/// Emits the pre-call event.
pub fn request_started(method: &dyn Display, path: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::info!("Requesting {method} {path}");
	#[cfg(not(feature = "tracing"))]
	let _ = (method, path);
}

/// Emits the post-call event.
pub fn request_finished(method: &dyn Display, path: &dyn Display, status: u16) {
	#[cfg(feature = "tracing")]
	tracing::info!(status, "Response {method} {path}");
	#[cfg(not(feature = "tracing"))]
	let _ = (method, path, status);
}

/// Emits the error event; the error itself is still propagated by the caller.
pub fn request_failed(method: &dyn Display, path: &dyn Display, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::error!(error = %error, "Error {method} {path}");
	#[cfg(not(feature = "tracing"))]
	let _ = (method, path, error);
}

/// Emits a cache lookup event.
pub fn token_cache_lookup(hit: bool) {
	#[cfg(feature = "tracing")]
	{
		if hit {
			tracing::debug!("Access token served from cache.");
		} else {
			tracing::debug!("Access token missing from cache.");
		}
	}
	#[cfg(not(feature = "tracing"))]
	let _ = hit;
}

/// Emits the acquisition event; never includes the token.
pub fn token_acquired(expires_in: u64) {
	#[cfg(feature = "tracing")]
	tracing::debug!(expires_in, "Access token acquired.");
	#[cfg(not(feature = "tracing"))]
	let _ = expires_in;
}
