//! Provider configuration records, defaults merging, and configuration sources.
//!
//! The broker consumes configuration; it never parses files. Embedding applications
//! hand documents over through a [`ConfigSource`] (typically [`MemoryConfigSource`]
//! seeded from whatever store they own), and the registry merges global defaults
//! into each provider's record exactly once at initialization.

pub mod memory;
pub use memory::MemoryConfigSource;

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	payment::{CredentialSecret, LabelCode, ProviderId},
};

/// Connect timeout installed when a provider omits its timeout block.
const DEFAULT_CONNECT_MS: u64 = 5_000;
/// Write timeout installed when a provider omits its timeout block.
const DEFAULT_WRITE_MS: u64 = 10_000;
/// Read timeout assumed when neither the provider nor the defaults supply one.
const FALLBACK_READ_MS: u64 = 30_000;
/// Steady-state rate assumed when neither the provider nor the defaults supply one.
const FALLBACK_RATE_PER_SECOND: u32 = 100;

/// Boxed future returned by [`ConfigSource`] operations.
pub type ConfigFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ConfigError>> + 'a + Send>>;

/// Source of configuration documents consumed at registry initialization.
pub trait ConfigSource
where
	Self: Send + Sync,
{
	/// Loads the ordered providers configuration.
	fn load_providers(&self) -> ConfigFuture<'_, ProvidersConfig>;

	/// Loads the configuration document for one provider.
	fn load_provider<'a>(&'a self, provider: &'a ProviderId) -> ConfigFuture<'a, ProviderConfig>;
}

/// Top-level providers configuration: ordered entries plus global defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersConfig {
	/// Ordered provider entries; initialization walks them in this order.
	pub providers: Vec<ProviderEntry>,
	/// Global defaults merged into providers that omit their own settings.
	#[serde(default)]
	pub defaults: Defaults,
}
impl ProvidersConfig {
	/// Deserializes a providers configuration from a JSON value.
	pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
		serde_path_to_error::deserialize(value)
			.map_err(|source| ConfigError::MalformedProviders { source })
	}
}

/// One entry in the ordered providers list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
	/// Provider the entry configures.
	pub id: ProviderId,
	/// Disabled entries are skipped entirely at initialization.
	pub enabled: bool,
	/// Label codes this provider will own in the routing table.
	#[serde(default)]
	pub label_codes: HashSet<LabelCode>,
	/// Relative priority; informational for the embedding application.
	#[serde(default)]
	pub priority: i32,
}

/// Global defaults applied to providers that omit timeout or rate-limit settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
	/// Default read timeout in milliseconds.
	pub timeout_ms: u64,
	/// Default retry budget; informational for the embedding application.
	pub max_retries: u32,
	/// Default steady-state requests per second.
	pub rate_limit_per_second: u32,
}
impl Default for Defaults {
	fn default() -> Self {
		Self {
			timeout_ms: FALLBACK_READ_MS,
			max_retries: 3,
			rate_limit_per_second: FALLBACK_RATE_PER_SECOND,
		}
	}
}

/// Immutable per-provider configuration installed at initialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
	/// Provider the document belongs to.
	pub provider_id: ProviderId,
	/// Human-readable provider name.
	pub display_name: String,
	/// Whether the provider runs against its sandbox environment.
	#[serde(default)]
	pub sandbox: bool,
	/// Credential map (API keys, signing secrets) keyed by credential name.
	#[serde(default)]
	pub credentials: BTreeMap<String, CredentialSecret>,
	/// Endpoint map; values without a URL scheme are joined onto `baseUrl`.
	#[serde(default)]
	pub endpoints: BTreeMap<String, String>,
	/// Per-payment-method settings, opaque to the broker core.
	#[serde(default)]
	pub payment_methods: BTreeMap<String, PaymentMethodSettings>,
	/// Callback verification settings, opaque to the broker core.
	#[serde(default)]
	pub callback: Option<CallbackSettings>,
	/// Token-bucket settings; merged from defaults when absent.
	#[serde(default)]
	pub rate_limit: Option<RateLimitSettings>,
	/// Timeout settings; merged from defaults when absent.
	#[serde(default)]
	pub timeout: Option<TimeoutSettings>,
}
impl ProviderConfig {
	/// Deserializes a provider configuration from a JSON value.
	pub fn from_value(
		provider: ProviderId,
		value: serde_json::Value,
	) -> Result<Self, ConfigError> {
		serde_path_to_error::deserialize(value)
			.map_err(|source| ConfigError::MalformedProvider { provider, source })
	}

	/// Returns the named credential, if configured.
	pub fn credential(&self, key: &str) -> Option<&CredentialSecret> {
		self.credentials.get(key)
	}

	/// Returns the provider's base URL, if configured.
	pub fn base_url(&self) -> Result<Option<Url>, ConfigError> {
		let Some(value) = self.endpoints.get("baseUrl") else {
			return Ok(None);
		};

		Url::parse(value).map(Some).map_err(|source| ConfigError::InvalidEndpoint {
			provider: self.provider_id.clone(),
			key: "baseUrl".into(),
			source,
		})
	}

	/// Resolves the named endpoint into an absolute URL.
	///
	/// Values that already carry an HTTP scheme are parsed as-is; anything else is
	/// treated as a suffix and joined onto the provider's `baseUrl`.
	pub fn endpoint(&self, key: &str) -> Result<Option<Url>, ConfigError> {
		let Some(value) = self.endpoints.get(key) else {
			return Ok(None);
		};

		if value.starts_with("http://") || value.starts_with("https://") {
			return Url::parse(value).map(Some).map_err(|source| {
				ConfigError::InvalidEndpoint {
					provider: self.provider_id.clone(),
					key: key.into(),
					source,
				}
			});
		}

		let Some(base) = self.base_url()? else {
			return Err(ConfigError::MissingBaseUrl {
				provider: self.provider_id.clone(),
				key: key.into(),
			});
		};

		base.join(value).map(Some).map_err(|source| ConfigError::InvalidEndpoint {
			provider: self.provider_id.clone(),
			key: key.into(),
			source,
		})
	}

	/// Merges global defaults into any absent timeout or rate-limit block.
	///
	/// Present provider-level settings are never overridden.
	pub fn with_defaults(mut self, defaults: &Defaults) -> Self {
		if self.timeout.is_none() {
			self.timeout = Some(TimeoutSettings {
				connect_ms: DEFAULT_CONNECT_MS,
				read_ms: defaults.timeout_ms,
				write_ms: DEFAULT_WRITE_MS,
			});
		}
		if self.rate_limit.is_none() {
			self.rate_limit = Some(RateLimitSettings {
				requests_per_second: defaults.rate_limit_per_second,
				burst_size: defaults.rate_limit_per_second * 2,
			});
		}

		self
	}

	/// Effective per-call deadline derived from the read timeout.
	pub fn read_timeout(&self) -> Duration {
		Duration::from_millis(self.timeout.as_ref().map_or(FALLBACK_READ_MS, |t| t.read_ms))
	}

	/// Effective token-bucket settings after defaults merging.
	pub fn effective_rate_limit(&self) -> RateLimitSettings {
		self.rate_limit.unwrap_or(RateLimitSettings {
			requests_per_second: FALLBACK_RATE_PER_SECOND,
			burst_size: FALLBACK_RATE_PER_SECOND * 2,
		})
	}
}

/// Per-payment-method settings carried for provider integrations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodSettings {
	/// Whether the method is offered at all.
	pub enabled: bool,
	/// Channel identifiers (bank codes, acquirer names) offered for the method.
	#[serde(default)]
	pub channels: Vec<String>,
	/// Minutes before an issued charge expires.
	#[serde(default)]
	pub expiry_minutes: u32,
	/// Acquirer hint for QR-style methods.
	#[serde(default)]
	pub acquirer: Option<String>,
	/// Provider-specific method type discriminator.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
}

/// Callback verification settings carried for provider integrations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackSettings {
	/// Shared signature key, when the provider signs callbacks.
	#[serde(default)]
	pub signature_key: Option<CredentialSecret>,
	/// Signature algorithm label (e.g. `sha512`).
	#[serde(default)]
	pub signature_algorithm: Option<String>,
	/// Static verification token, when the provider uses token matching.
	#[serde(default)]
	pub verification_token: Option<CredentialSecret>,
}

/// Token-bucket settings for one provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitSettings {
	/// Steady-state refill rate in requests per second.
	pub requests_per_second: u32,
	/// Burst capacity of the bucket.
	pub burst_size: u32,
}

/// Timeout settings for one provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutSettings {
	/// Connect-phase timeout in milliseconds.
	pub connect_ms: u64,
	/// Read timeout in milliseconds; the per-call deadline.
	pub read_ms: u64,
	/// Write-phase timeout in milliseconds.
	pub write_ms: u64,
}
