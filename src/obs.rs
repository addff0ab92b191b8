//! Observability labels and recorders for the protected call pipeline.
//!
//! # Feature Flags
//!
//! - Structured spans named `paygate_broker.call` carry the `provider` and `operation`
//!   fields around every routed call.
//! - Enable `metrics` to increment the `paygate_broker_call_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

// self
use crate::{_prelude::*, payment::ProviderId};

/// Provider operations observed by the broker pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Virtual-account creation for a deposit.
	CreateVirtualAccount,
	/// QRIS creation for a deposit.
	CreateQris,
	/// Withdrawal/disbursement processing.
	ProcessWithdraw,
	/// Callback signature or token verification.
	VerifyCallback,
	/// Transaction status lookup.
	CheckStatus,
	/// Bank-account inquiry.
	InquiryAccount,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::CreateVirtualAccount => "create_virtual_account",
			CallKind::CreateQris => "create_qris",
			CallKind::ProcessWithdraw => "process_withdraw",
			CallKind::VerifyCallback => "verify_callback",
			CallKind::CheckStatus => "check_status",
			CallKind::InquiryAccount => "inquiry_account",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to the protected pipeline.
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

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"paygate_broker_call_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// A span builder used around routed provider calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	/// Underlying tracing span carrying the provider + operation fields.
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided provider + operation.
	pub fn new(provider: &ProviderId, kind: CallKind) -> Self {
		let span = tracing::info_span!(
			"paygate_broker.call",
			provider = %provider,
			operation = kind.as_str(),
		);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> tracing::instrument::Instrumented<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}
