//! Payment domain records exchanged between the broker, the registry, and providers.

pub mod id;
pub mod secret;

pub use id::*;
pub use secret::*;

// crates.io
use rust_decimal::Decimal;
// self
use crate::_prelude::*;

/// Payment instruments a provider can issue for deposits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
	/// Bank virtual-account transfer.
	VirtualAccount,
	/// QRIS dynamic QR payment.
	Qris,
}
impl PaymentMethod {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PaymentMethod::VirtualAccount => "virtual_account",
			PaymentMethod::Qris => "qris",
		}
	}
}
impl Display for PaymentMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Transaction states reported back to callers after provider status mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
	/// Accepted upstream; settlement has not completed.
	Processing,
	/// Settled successfully.
	Completed,
	/// Rejected, expired, or otherwise terminal without settlement.
	Failed,
}
impl PaymentStatus {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PaymentStatus::Processing => "processing",
			PaymentStatus::Completed => "completed",
			PaymentStatus::Failed => "failed",
		}
	}
}
impl Display for PaymentStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Deposit request routed to a provider by label code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
	/// Caller-side reference uniquely identifying the transaction.
	pub reference_id: String,
	/// Routing key selecting the provider and payment channel.
	pub label_code: LabelCode,
	/// Gross amount in the gateway's currency.
	pub amount: Decimal,
	/// Callback URL providers attach to the charge, when required.
	#[serde(default)]
	pub callback_url: Option<Url>,
	/// Free-form caller metadata forwarded to the provider.
	#[serde(default)]
	pub metadata: BTreeMap<String, String>,
}

/// Deposit response produced by a provider integration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
	/// Provider-side transaction identifier.
	pub transaction_id: String,
	/// External reference echoing the caller's reference id.
	pub external_reference: String,
	/// Payment instruction URL or QR payload, when the channel produces one.
	#[serde(default)]
	pub payment_url: Option<String>,
	/// Mapped transaction state.
	pub status: PaymentStatus,
	/// Channel details (virtual account number, bank, expiry, QR string).
	#[serde(default)]
	pub details: BTreeMap<String, String>,
}

/// Withdrawal/disbursement request routed to a provider by label code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
	/// Caller-side reference uniquely identifying the disbursement.
	pub reference_id: String,
	/// Routing key selecting the disbursing provider.
	pub label_code: LabelCode,
	/// Amount to disburse in the gateway's currency.
	pub amount: Decimal,
	/// Destination bank code.
	pub bank_code: String,
	/// Destination account number.
	pub account_number: String,
	/// Destination account holder name.
	pub account_holder: String,
}

/// Withdrawal/disbursement response produced by a provider integration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
	/// Provider-side disbursement identifier.
	pub transaction_id: String,
	/// External reference echoing the caller's reference id.
	pub external_reference: String,
	/// Mapped disbursement state.
	pub status: PaymentStatus,
	/// Raw provider payload retained for reconciliation.
	#[serde(default)]
	pub raw: serde_json::Value,
}

/// Asynchronous notification received from a provider's callback channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackEvent {
	/// Routing key identifying which provider issued the callback.
	pub label_code: LabelCode,
	/// Raw callback payload, including any signature material to verify.
	pub data: serde_json::Value,
}

/// Bank-account inquiry request routed to a provider by label code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
	/// Routing key selecting the inquiring provider.
	pub label_code: LabelCode,
	/// Bank code of the account to look up.
	pub bank_code: String,
	/// Account number to look up.
	pub account_number: String,
}

/// Bank-account inquiry response produced by a provider integration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
	/// Whether the account resolved successfully.
	pub success: bool,
	/// Resolved account holder name, when available.
	#[serde(default)]
	pub account_name: Option<String>,
	/// Resolved bank display name, when available.
	#[serde(default)]
	pub bank_name: Option<String>,
	/// Raw provider payload retained for audit.
	#[serde(default)]
	pub raw: serde_json::Value,
}
