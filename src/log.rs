//! Mask-aware leveled logging for broker and provider call sites.
//!
//! Every line emitted through [`SecureLog`] passes the masker first, so call sites
//! can log formatted payloads without re-checking them for secrets. Callers must
//! never hand unmasked payloads to the underlying subscriber directly.

// self
use crate::{_prelude::*, mask, obs::CallKind, payment::ProviderId};

/// Component-tagged logger that masks every emitted line.
#[derive(Clone, Copy, Debug)]
pub struct SecureLog {
	/// Component label attached to every event.
	component: &'static str,
}
impl SecureLog {
	/// Creates a logger for the given component label.
	pub const fn new(component: &'static str) -> Self {
		Self { component }
	}

	/// Logs an informational message after masking.
	pub fn info(&self, message: impl AsRef<str>) {
		tracing::info!(component = self.component, "{}", mask::mask(message.as_ref()));
	}

	/// Logs a debug message after masking.
	pub fn debug(&self, message: impl AsRef<str>) {
		tracing::debug!(component = self.component, "{}", mask::mask(message.as_ref()));
	}

	/// Logs a warning after masking.
	pub fn warn(&self, message: impl AsRef<str>) {
		tracing::warn!(component = self.component, "{}", mask::mask(message.as_ref()));
	}

	/// Logs an error after masking.
	pub fn error(&self, message: impl AsRef<str>) {
		tracing::error!(component = self.component, "{}", mask::mask(message.as_ref()));
	}

	/// Logs an outbound provider request with its masked payload.
	pub fn request(&self, provider: &ProviderId, operation: CallKind, payload: &serde_json::Value) {
		let line = mask::mask(&format!("[{provider}] {operation} request: {payload}"));

		tracing::info!(
			component = self.component,
			provider = %provider,
			operation = operation.as_str(),
			observed_at = %OffsetDateTime::now_utc(),
			"{line}",
		);
	}

	/// Logs a provider response with its masked payload and call duration.
	pub fn response(
		&self,
		provider: &ProviderId,
		operation: CallKind,
		payload: &serde_json::Value,
		duration: Duration,
	) {
		let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
		let line =
			mask::mask(&format!("[{provider}] {operation} response ({duration_ms}ms): {payload}"));

		tracing::info!(
			component = self.component,
			provider = %provider,
			operation = operation.as_str(),
			observed_at = %OffsetDateTime::now_utc(),
			duration_ms,
			"{line}",
		);
	}
}
