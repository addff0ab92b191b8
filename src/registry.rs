//! Provider registration, label-code routing state, and lifecycle management.
//!
//! The registry is an explicit instance owned by the embedding application; there
//! is no process-wide singleton and no reflection-style discovery. Bootstraps build
//! provider instances, call [`register`](ProviderRegistry::register) for each, then
//! run [`initialize`](ProviderRegistry::initialize) against a configuration source.
//! Lookups are plain reads over fine-grained locks and stay safe (best-effort
//! snapshots) at any time; `initialize` and `shutdown` serialize against each other
//! on an internal async mutex without ever blocking the read path.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	config::{ConfigSource, ProviderConfig, ProviderEntry, ProvidersConfig},
	log::SecureLog,
	payment::{LabelCode, ProviderId},
	provider::Provider,
};

/// Registry entry owning a provider handle and its routing state.
#[derive(Clone)]
pub struct ProviderRecord {
	/// Provider capability handle.
	pub provider: Arc<dyn Provider>,
	/// Merged configuration installed at initialization; absent before it.
	pub config: Option<Arc<ProviderConfig>>,
	/// Label codes owned by this provider.
	pub label_codes: HashSet<LabelCode>,
}
impl Debug for ProviderRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderRecord")
			.field("provider", &self.provider.id())
			.field("config_set", &self.config.is_some())
			.field("label_codes", &self.label_codes)
			.finish()
	}
}

/// Central orchestrator holding the provider and label-code maps.
pub struct ProviderRegistry {
	/// Registered providers keyed by their self-reported id.
	providers: RwLock<HashMap<ProviderId, ProviderRecord>>,
	/// Routing table; every value refers to a key in `providers`.
	labels: RwLock<HashMap<LabelCode, ProviderId>>,
	/// Set once initialization has walked the configuration entries.
	initialized: AtomicBool,
	/// Serializes `initialize` and `shutdown` against each other.
	admin: AsyncMutex<()>,
	/// Masked logger for lifecycle records.
	log: SecureLog,
}
impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			providers: RwLock::new(HashMap::new()),
			labels: RwLock::new(HashMap::new()),
			initialized: AtomicBool::new(false),
			admin: AsyncMutex::new(()),
			log: SecureLog::new("provider_registry"),
		}
	}

	/// Registers a provider instance, replacing any previous one with the same id.
	pub fn register(&self, provider: Arc<dyn Provider>) {
		let id = provider.id();
		let display_name = provider.display_name();
		let mut providers = self.providers.write();

		if providers.contains_key(&id) {
			self.log.warn(format!("provider `{id}` already registered, replacing"));
		}

		providers.insert(
			id.clone(),
			ProviderRecord { provider, config: None, label_codes: HashSet::new() },
		);
		self.log.info(format!("registered provider `{id}` ({display_name})"));
	}

	/// Initializes every enabled, registered provider from the configuration source.
	///
	/// Entries are walked in configuration order. Disabled entries are skipped;
	/// entries whose id has no registered provider are skipped with a warning; a
	/// provider whose own initialization fails is logged and left behind without
	/// aborting the remaining entries. A second call is a warn-only no-op.
	pub async fn initialize(&self, source: &dyn ConfigSource) -> Result<()> {
		let _admin = self.admin.lock().await;

		if self.initialized.load(Ordering::Acquire) {
			self.log.warn("registry already initialized");

			return Ok(());
		}

		let main = source.load_providers().await?;

		for entry in &main.providers {
			if !entry.enabled {
				self.log.info(format!("provider `{}` is disabled, skipping", entry.id));

				continue;
			}

			let provider = self.providers.read().get(&entry.id).map(|r| r.provider.clone());
			let Some(provider) = provider else {
				self.log.warn(format!("provider `{}` configured but not registered", entry.id));

				continue;
			};

			if let Err(error) = self.initialize_provider(source, &main, entry, provider).await {
				self.log
					.error(format!("failed to initialize provider `{}`: {error}", entry.id));
			}
		}

		self.initialized.store(true, Ordering::Release);
		self.log.info(format!(
			"registry initialized with {} providers, {} label codes",
			self.providers.read().len(),
			self.labels.read().len()
		));

		Ok(())
	}

	async fn initialize_provider(
		&self,
		source: &dyn ConfigSource,
		main: &ProvidersConfig,
		entry: &ProviderEntry,
		provider: Arc<dyn Provider>,
	) -> Result<()> {
		let config = Arc::new(source.load_provider(&entry.id).await?.with_defaults(&main.defaults));

		provider.register_label_codes(&entry.label_codes);

		{
			let mut providers = self.providers.write();

			if let Some(record) = providers.get_mut(&entry.id) {
				record.config = Some(config.clone());
				record.label_codes.extend(entry.label_codes.iter().cloned());
			}
		}
		{
			let mut labels = self.labels.write();

			// Last registration wins when two entries claim the same code.
			for code in &entry.label_codes {
				labels.insert(code.clone(), entry.id.clone());
			}
		}

		provider.initialize(config).await?;

		self.log.info(format!(
			"initialized provider `{}` with {} label codes",
			entry.id,
			entry.label_codes.len()
		));

		Ok(())
	}

	/// Returns the provider owning the given label code.
	pub fn provider_by_label_code(&self, label: &LabelCode) -> Option<Arc<dyn Provider>> {
		self.record_for_label(label).map(|record| record.provider)
	}

	/// Returns the full registry record owning the given label code.
	pub fn record_for_label(&self, label: &LabelCode) -> Option<ProviderRecord> {
		let id = self.labels.read().get(label).cloned()?;

		self.providers.read().get(&id).cloned()
	}

	/// Returns the provider registered under the given id.
	pub fn provider_by_id(&self, id: &ProviderId) -> Option<Arc<dyn Provider>> {
		self.providers.read().get(id).map(|record| record.provider.clone())
	}

	/// Returns a snapshot of every registered provider.
	pub fn all_providers(&self) -> Vec<Arc<dyn Provider>> {
		self.providers.read().values().map(|record| record.provider.clone()).collect()
	}

	/// Returns a snapshot of every registry record.
	pub fn records(&self) -> Vec<ProviderRecord> {
		self.providers.read().values().cloned().collect()
	}

	/// Returns a snapshot of every mapped label code.
	pub fn all_label_codes(&self) -> HashSet<LabelCode> {
		self.labels.read().keys().cloned().collect()
	}

	/// Checks whether a label code currently routes to a provider.
	pub fn supports_label_code(&self, label: &LabelCode) -> bool {
		self.labels.read().contains_key(label)
	}

	/// Reports whether initialization has completed since the last shutdown.
	pub fn is_initialized(&self) -> bool {
		self.initialized.load(Ordering::Acquire)
	}

	/// Shuts down every registered provider and clears all registry state.
	///
	/// Individual provider failures are logged, never propagated, so one stuck
	/// integration cannot block the rest from releasing. The registry is reusable
	/// afterwards once providers are re-registered.
	pub async fn shutdown(&self) {
		let _admin = self.admin.lock().await;

		self.log.info("shutting down registry");

		let providers = self.all_providers();

		for provider in providers {
			if let Err(error) = provider.shutdown().await {
				self.log
					.error(format!("error shutting down provider `{}`: {error}", provider.id()));
			}
		}

		self.providers.write().clear();
		self.labels.write().clear();
		self.initialized.store(false, Ordering::Release);
		self.log.info("registry shutdown complete");
	}
}
impl Default for ProviderRegistry {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for ProviderRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderRegistry")
			.field("providers", &self.providers.read().keys().cloned().collect::<Vec<_>>())
			.field("label_codes", &self.labels.read().len())
			.field("initialized", &self.is_initialized())
			.finish()
	}
}
