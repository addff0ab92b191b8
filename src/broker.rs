//! Label-code routing façade wrapping every provider call in the protected pipeline.
//!
//! The broker owns the registry handle, the rate limiter, and the timeout guard so
//! every routed operation composes the same way, in this fixed order: acquire a token
//! (reject fast) → run the operation on a deadline-guarded worker → record masked
//! request/response logs and call outcomes. A caller turned away by the limiter never
//! consumes a worker slot.

// std
use std::time::Instant;
// self
use crate::{
	_prelude::*,
	config::ConfigSource,
	guard::TimeoutGuard,
	limit::RateLimiter,
	log::SecureLog,
	obs::{self, CallKind, CallOutcome, CallSpan},
	payment::{
		CallbackEvent, InquiryRequest, InquiryResponse, LabelCode, PaymentMethod, PaymentRequest,
		PaymentResponse, PaymentStatus, ProviderId, WithdrawRequest, WithdrawResponse,
	},
	registry::{ProviderRecord, ProviderRegistry},
};

/// Deadline applied to providers that carry no merged timeout configuration.
const DEFAULT_DEADLINE: Duration = Duration::from_millis(30_000);

/// Coordinates payment operations against registered providers.
///
/// The broker resolves a provider by label code, then invokes the provider's
/// operation through the protected-execution pipeline. Budgets and deadlines are
/// installed per provider from the merged configuration during
/// [`initialize`](Self::initialize).
#[derive(Debug)]
pub struct Broker {
	/// Registry resolving label codes to provider records.
	registry: Arc<ProviderRegistry>,
	/// Per-provider token buckets consulted before every call.
	limiter: RateLimiter,
	/// Deadline enforcement for every call's worker task.
	guard: TimeoutGuard,
	/// Fallback deadline for records without merged configuration.
	default_deadline: Duration,
	/// Masked logger for request/response and failure records.
	log: SecureLog,
}
impl Broker {
	/// Creates a broker over the given registry with the standard default deadline.
	pub fn new(registry: Arc<ProviderRegistry>) -> Self {
		Self::with_default_deadline(registry, DEFAULT_DEADLINE)
	}

	/// Creates a broker with a custom fallback deadline.
	pub fn with_default_deadline(registry: Arc<ProviderRegistry>, deadline: Duration) -> Self {
		Self {
			registry,
			limiter: RateLimiter::new(),
			guard: TimeoutGuard::new(deadline),
			default_deadline: deadline,
			log: SecureLog::new("broker"),
		}
	}

	/// Initializes the registry, then installs per-provider budgets.
	pub async fn initialize(&self, source: &dyn ConfigSource) -> Result<()> {
		self.registry.initialize(source).await?;

		for record in self.registry.records() {
			let Some(config) = &record.config else {
				continue;
			};
			let rate = config.effective_rate_limit();

			self.limiter.configure(
				&record.provider.id(),
				rate.requests_per_second,
				rate.burst_size,
			);
		}

		Ok(())
	}

	/// Initiates a deposit, inferring the payment method from the label code.
	pub async fn initiate_payment(&self, request: PaymentRequest) -> Result<PaymentResponse> {
		let record = self.route(&request.label_code)?;
		let provider = record.provider.clone();
		let provider_id = provider.id();
		let method = infer_method(&request.label_code);
		let kind = match method {
			PaymentMethod::VirtualAccount => CallKind::CreateVirtualAccount,
			PaymentMethod::Qris => CallKind::CreateQris,
		};

		if !provider.supported_methods().contains(&method) {
			return Err(Error::UnsupportedOperation { provider: provider_id, operation: kind });
		}

		let payload = to_payload(&request);
		let deadline = self.deadline_for(&record);
		let operation = async move {
			match method {
				PaymentMethod::VirtualAccount => provider.create_virtual_account(request).await,
				PaymentMethod::Qris => provider.create_qris(request).await,
			}
		};

		self.protected(&provider_id, kind, payload, deadline, operation).await
	}

	/// Initiates a withdrawal/disbursement.
	pub async fn initiate_withdraw(&self, request: WithdrawRequest) -> Result<WithdrawResponse> {
		let record = self.route(&request.label_code)?;
		let provider = record.provider.clone();
		let provider_id = provider.id();
		let payload = to_payload(&request);
		let deadline = self.deadline_for(&record);
		let operation = async move { provider.process_withdraw(request).await };

		self.protected(&provider_id, CallKind::ProcessWithdraw, payload, deadline, operation).await
	}

	/// Verifies a provider callback's signature or verification token.
	pub async fn verify_payment(&self, callback: CallbackEvent) -> Result<bool> {
		let record = self.route(&callback.label_code)?;
		let provider = record.provider.clone();
		let provider_id = provider.id();
		let payload = to_payload(&callback);
		let deadline = self.deadline_for(&record);
		let operation = async move { provider.verify_callback(callback).await };

		self.protected(&provider_id, CallKind::VerifyCallback, payload, deadline, operation).await
	}

	/// Looks up the state of a previously created transaction.
	pub async fn check_status(
		&self,
		label: &LabelCode,
		external_reference: &str,
	) -> Result<PaymentStatus> {
		let record = self.route(label)?;
		let provider = record.provider.clone();
		let provider_id = provider.id();
		let payload = serde_json::json!({ "externalReference": external_reference });
		let deadline = self.deadline_for(&record);
		let reference = external_reference.to_owned();
		let operation = async move { provider.check_status(&reference).await };

		self.protected(&provider_id, CallKind::CheckStatus, payload, deadline, operation).await
	}

	/// Resolves a destination bank account through the routed provider.
	pub async fn inquiry(&self, request: InquiryRequest) -> Result<InquiryResponse> {
		let record = self.route(&request.label_code)?;
		let provider = record.provider.clone();
		let provider_id = provider.id();
		let payload = to_payload(&request);
		let deadline = self.deadline_for(&record);
		let operation = async move { provider.inquiry_account(request).await };

		self.protected(&provider_id, CallKind::InquiryAccount, payload, deadline, operation).await
	}

	/// Checks whether a label code currently routes to a provider.
	pub fn supports_label_code(&self, label: &LabelCode) -> bool {
		self.registry.supports_label_code(label)
	}

	/// Returns the providers whose upstreams currently respond.
	pub async fn healthy_providers(&self) -> Vec<ProviderId> {
		let mut healthy = Vec::new();

		for provider in self.registry.all_providers() {
			if provider.is_healthy().await.unwrap_or(false) {
				healthy.push(provider.id());
			}
		}

		healthy
	}

	/// Shuts down the registry, the worker pool, and every installed budget.
	pub async fn shutdown(&self) {
		self.log.info("shutting down broker");
		self.registry.shutdown().await;
		self.guard.shutdown().await;
		self.limiter.reset_all();
	}

	fn route(&self, label: &LabelCode) -> Result<ProviderRecord> {
		self.registry
			.record_for_label(label)
			.ok_or_else(|| Error::NoProviderForLabel { label: label.clone() })
	}

	fn deadline_for(&self, record: &ProviderRecord) -> Duration {
		record.config.as_ref().map_or(self.default_deadline, |config| config.read_timeout())
	}

	async fn protected<T, F>(
		&self,
		provider: &ProviderId,
		kind: CallKind,
		payload: serde_json::Value,
		deadline: Duration,
		operation: F,
	) -> Result<T>
	where
		T: 'static + Send + Serialize,
		F: 'static + Send + Future<Output = Result<T>>,
	{
		let span = CallSpan::new(provider, kind);

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				// Reject fast: a caller the limiter turns away never consumes a worker.
				self.limiter.acquire(provider)?;
				self.log.request(provider, kind, &payload);

				let started = Instant::now();
				let result = self.guard.run_with_deadline(operation, deadline).await;

				match &result {
					Ok(value) => self.log.response(
						provider,
						kind,
						&serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
						started.elapsed(),
					),
					Err(error) => self.log.error(format!("[{provider}] {kind} failed: {error}")),
				}

				result
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(kind, CallOutcome::Failure),
		}

		result
	}
}

/// Serializes a request for the masked request log.
fn to_payload<T>(request: &T) -> serde_json::Value
where
	T: Serialize,
{
	serde_json::to_value(request).unwrap_or(serde_json::Value::Null)
}

/// Infers the payment method encoded in a label code.
///
/// Codes mentioning QRIS route to QRIS; codes naming a bank or the VA channel route
/// to virtual accounts, which is also the fallback when nothing matches.
fn infer_method(label: &LabelCode) -> PaymentMethod {
	const VA_TOKENS: &[&str] = &["VA", "BCA", "BNI", "BRI", "MANDIRI", "BSI"];

	let upper = label.as_ref().to_uppercase();

	if upper.contains("QRIS") {
		return PaymentMethod::Qris;
	}
	if VA_TOKENS.iter().any(|token| upper.contains(token)) {
		return PaymentMethod::VirtualAccount;
	}

	PaymentMethod::VirtualAccount
}
