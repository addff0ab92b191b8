//! Thread-safe in-memory [`ConfigSource`] implementation for bootstraps and tests.

// self
use crate::{
	_prelude::*,
	config::{ConfigFuture, ConfigSource, ProviderConfig, ProvidersConfig},
	error::ConfigError,
	payment::ProviderId,
};

/// Configuration documents held by a [`MemoryConfigSource`].
#[derive(Debug)]
struct Documents {
	/// Providers configuration handed over at construction.
	providers: ProvidersConfig,
	/// Per-provider documents keyed by provider id.
	by_id: RwLock<HashMap<ProviderId, ProviderConfig>>,
}

/// In-process configuration source seeded by the embedding application.
#[derive(Clone, Debug)]
pub struct MemoryConfigSource(Arc<Documents>);
impl MemoryConfigSource {
	/// Creates a source holding the given providers configuration.
	pub fn new(providers: ProvidersConfig) -> Self {
		Self(Arc::new(Documents { providers, by_id: RwLock::new(HashMap::new()) }))
	}

	/// Installs (or replaces) one provider's configuration document.
	pub fn with_provider(self, config: ProviderConfig) -> Self {
		self.0.by_id.write().insert(config.provider_id.clone(), config);

		self
	}

	/// Installs a provider configuration from a raw JSON value.
	pub fn with_provider_value(
		self,
		provider: ProviderId,
		value: serde_json::Value,
	) -> Result<Self, ConfigError> {
		let config = ProviderConfig::from_value(provider, value)?;

		Ok(self.with_provider(config))
	}
}
impl ConfigSource for MemoryConfigSource {
	fn load_providers(&self) -> ConfigFuture<'_, ProvidersConfig> {
		let providers = self.0.providers.clone();

		Box::pin(async move { Ok(providers) })
	}

	fn load_provider<'a>(&'a self, provider: &'a ProviderId) -> ConfigFuture<'a, ProviderConfig> {
		let config = self.0.by_id.read().get(provider).cloned();

		Box::pin(async move {
			config.ok_or_else(|| ConfigError::MissingProvider { provider: provider.clone() })
		})
	}
}
