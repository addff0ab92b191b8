//! Provider capability contract implemented by concrete gateway integrations.
//!
//! The registry and broker depend on nothing but this trait: integrations own their
//! wire payload building, signature verification, and transport, and surface results
//! through the broker error taxonomy. Methods return boxed futures so providers stay
//! object-safe behind `Arc<dyn Provider>` and their calls can hop onto worker tasks.

// self
use crate::{
	_prelude::*,
	config::ProviderConfig,
	payment::{
		CallbackEvent, InquiryRequest, InquiryResponse, LabelCode, PaymentMethod, PaymentRequest,
		PaymentResponse, PaymentStatus, ProviderId, WithdrawRequest, WithdrawResponse,
	},
};

/// Boxed future returned by [`Provider`] operations.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Pluggable payment-gateway integration capability.
///
/// Implementations are registered with the
/// [`ProviderRegistry`](crate::registry::ProviderRegistry) by an external bootstrap;
/// the registry performs no discovery or dynamic loading. A provider that lacks a
/// capability (commonly disbursement) fails the corresponding operation with
/// [`Error::UnsupportedOperation`](crate::error::Error::UnsupportedOperation).
pub trait Provider
where
	Self: Send + Sync,
{
	/// Unique provider identifier; must match the provider's configuration document.
	fn id(&self) -> ProviderId;

	/// Human-readable provider name.
	fn display_name(&self) -> String;

	/// Payment methods this provider can issue.
	fn supported_methods(&self) -> HashSet<PaymentMethod>;

	/// Checks whether this provider handles the given label code.
	fn supports(&self, label: &LabelCode) -> bool;

	/// Attaches label codes this provider will handle.
	fn register_label_codes(&self, labels: &HashSet<LabelCode>);

	/// Initializes the provider with its merged configuration.
	fn initialize(&self, config: Arc<ProviderConfig>) -> ProviderFuture<'_, ()>;

	/// Creates a virtual account for a deposit.
	fn create_virtual_account(
		&self,
		request: PaymentRequest,
	) -> ProviderFuture<'_, PaymentResponse>;

	/// Creates a QRIS charge for a deposit.
	fn create_qris(&self, request: PaymentRequest) -> ProviderFuture<'_, PaymentResponse>;

	/// Processes a withdrawal/disbursement.
	fn process_withdraw(&self, request: WithdrawRequest) -> ProviderFuture<'_, WithdrawResponse>;

	/// Verifies a callback's signature or verification token.
	fn verify_callback(&self, callback: CallbackEvent) -> ProviderFuture<'_, bool>;

	/// Looks up the state of a previously created transaction.
	fn check_status<'a>(
		&'a self,
		external_reference: &'a str,
	) -> ProviderFuture<'a, PaymentStatus>;

	/// Resolves a destination bank account.
	fn inquiry_account(&self, request: InquiryRequest) -> ProviderFuture<'_, InquiryResponse>;

	/// Reports whether the provider's upstream currently responds.
	fn is_healthy(&self) -> ProviderFuture<'_, bool>;

	/// Releases provider-held resources.
	fn shutdown(&self) -> ProviderFuture<'_, ()>;
}
