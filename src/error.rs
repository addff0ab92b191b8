//! Broker-level error types shared across routing, rate limiting, and provider calls.

// self
use crate::{
	_prelude::*,
	obs::CallKind,
	payment::{IdentifierError, LabelCode, ProviderId},
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Identifier validation failure.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),
	/// Upstream or worker failure surfaced by a provider call.
	#[error(transparent)]
	Provider(#[from] ProviderError),

	/// The provider's token bucket is empty; back off and retry later.
	#[error("Rate limit exceeded for provider `{provider}`.")]
	RateLimitExceeded {
		/// Provider whose request budget was exhausted.
		provider: ProviderId,
	},
	/// The call outlived its deadline; the upstream outcome is unknown.
	#[error("Provider call timed out after {deadline_ms}ms.")]
	ProviderTimeout {
		/// Wall-clock deadline that expired, in milliseconds.
		deadline_ms: u64,
	},
	/// The routed provider cannot perform the requested operation.
	#[error("Provider `{provider}` does not support {operation}.")]
	UnsupportedOperation {
		/// Provider that refused the operation.
		provider: ProviderId,
		/// Operation label that was refused.
		operation: CallKind,
	},
	/// No provider owns the requested label code.
	#[error("No provider is mapped to label code `{label}`.")]
	NoProviderForLabel {
		/// Label code missing from the routing table.
		label: LabelCode,
	},
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Providers configuration payload could not be deserialized.
	#[error("Providers configuration is malformed.")]
	MalformedProviders {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A provider configuration payload could not be deserialized.
	#[error("Configuration for provider `{provider}` is malformed.")]
	MalformedProvider {
		/// Provider whose configuration failed to parse.
		provider: ProviderId,
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// No configuration document exists for the provider.
	#[error("No configuration found for provider `{provider}`.")]
	MissingProvider {
		/// Provider the source knows nothing about.
		provider: ProviderId,
	},
	/// An endpoint value could not be resolved into a URL.
	#[error("Endpoint `{key}` for provider `{provider}` is not a valid URL.")]
	InvalidEndpoint {
		/// Provider owning the endpoint map.
		provider: ProviderId,
		/// Endpoint key that failed to resolve.
		key: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A relative endpoint value has no base URL to join onto.
	#[error("Endpoint `{key}` for provider `{provider}` is relative but no baseUrl is configured.")]
	MissingBaseUrl {
		/// Provider owning the endpoint map.
		provider: ProviderId,
		/// Endpoint key that needed a base URL.
		key: String,
	},
}

/// Upstream and worker failures surfaced by provider calls.
#[derive(Debug, ThisError)]
pub enum ProviderError {
	/// The provider integration reported its upstream as unreachable or erroring.
	#[error("Provider `{provider}` is unavailable: {message}.")]
	Unavailable {
		/// Provider whose upstream failed.
		provider: ProviderId,
		/// Provider-supplied failure summary.
		message: String,
	},
	/// The provider rejected the request as invalid.
	#[error("Provider `{provider}` rejected the request: {message}.")]
	Rejected {
		/// Provider that rejected the request.
		provider: ProviderId,
		/// Provider-supplied rejection reason.
		message: String,
	},
	/// The worker task died before producing a result.
	#[error("Provider call worker failed: {message}.")]
	Worker {
		/// Runtime-supplied failure summary.
		message: String,
	},
	/// The timeout guard is shutting down and refused new work.
	#[error("Provider call worker pool is closed.")]
	WorkerPoolClosed,
}
