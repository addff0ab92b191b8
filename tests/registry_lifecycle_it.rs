// std
use std::{
	collections::{BTreeMap, HashSet},
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};
// self
use paygate_broker::{
	config::{Defaults, MemoryConfigSource, ProviderConfig, ProviderEntry, ProvidersConfig},
	error::ProviderError,
	payment::{
		CallbackEvent, InquiryRequest, InquiryResponse, LabelCode, PaymentMethod, PaymentRequest,
		PaymentResponse, PaymentStatus, ProviderId, WithdrawRequest, WithdrawResponse,
	},
	provider::{Provider, ProviderFuture},
	registry::ProviderRegistry,
};

fn provider_id(value: &str) -> ProviderId {
	ProviderId::new(value).expect("Failed to build provider identifier for lifecycle tests.")
}

fn label(value: &str) -> LabelCode {
	LabelCode::new(value).expect("Failed to build label code for lifecycle tests.")
}

fn entry(id: &str, enabled: bool, labels: &[&str]) -> ProviderEntry {
	ProviderEntry {
		id: provider_id(id),
		enabled,
		label_codes: labels.iter().map(|value| label(value)).collect(),
		priority: 0,
	}
}

fn config_for(id: &str) -> ProviderConfig {
	ProviderConfig {
		provider_id: provider_id(id),
		display_name: format!("{id} gateway"),
		sandbox: true,
		credentials: BTreeMap::new(),
		endpoints: BTreeMap::new(),
		payment_methods: BTreeMap::new(),
		callback: None,
		rate_limit: None,
		timeout: None,
	}
}

/// Counting mock provider; optionally fails its own initialization.
struct CountingProvider {
	id: ProviderId,
	display_name: String,
	labels: Mutex<HashSet<LabelCode>>,
	initializations: AtomicUsize,
	shutdowns: AtomicUsize,
	fail_initialize: bool,
}
impl CountingProvider {
	fn new(id: &str, display_name: &str) -> Arc<Self> {
		Arc::new(Self {
			id: provider_id(id),
			display_name: display_name.into(),
			labels: Mutex::new(HashSet::new()),
			initializations: AtomicUsize::new(0),
			shutdowns: AtomicUsize::new(0),
			fail_initialize: false,
		})
	}

	fn failing(id: &str) -> Arc<Self> {
		Arc::new(Self {
			id: provider_id(id),
			display_name: format!("{id} gateway"),
			labels: Mutex::new(HashSet::new()),
			initializations: AtomicUsize::new(0),
			shutdowns: AtomicUsize::new(0),
			fail_initialize: true,
		})
	}

	fn initializations(&self) -> usize {
		self.initializations.load(Ordering::SeqCst)
	}

	fn shutdowns(&self) -> usize {
		self.shutdowns.load(Ordering::SeqCst)
	}
}
impl Provider for CountingProvider {
	fn id(&self) -> ProviderId {
		self.id.clone()
	}

	fn display_name(&self) -> String {
		self.display_name.clone()
	}

	fn supported_methods(&self) -> HashSet<PaymentMethod> {
		HashSet::from_iter([PaymentMethod::VirtualAccount])
	}

	fn supports(&self, label: &LabelCode) -> bool {
		self.labels.lock().expect("Mock label lock should not be poisoned.").contains(label)
	}

	fn register_label_codes(&self, labels: &HashSet<LabelCode>) {
		self.labels
			.lock()
			.expect("Mock label lock should not be poisoned.")
			.extend(labels.iter().cloned());
	}

	fn initialize(&self, config: Arc<ProviderConfig>) -> ProviderFuture<'_, ()> {
		Box::pin(async move {
			let _ = config;

			if self.fail_initialize {
				return Err(ProviderError::Unavailable {
					provider: self.id.clone(),
					message: "credential check failed".into(),
				}
				.into());
			}

			self.initializations.fetch_add(1, Ordering::SeqCst);

			Ok(())
		})
	}

	fn create_virtual_account(
		&self,
		request: PaymentRequest,
	) -> ProviderFuture<'_, PaymentResponse> {
		Box::pin(async move {
			Ok(PaymentResponse {
				transaction_id: format!("VA-{}", request.reference_id),
				external_reference: request.reference_id,
				payment_url: None,
				status: PaymentStatus::Processing,
				details: BTreeMap::new(),
			})
		})
	}

	fn create_qris(&self, request: PaymentRequest) -> ProviderFuture<'_, PaymentResponse> {
		Box::pin(async move {
			let _ = request;

			Err(ProviderError::Rejected {
				provider: self.id.clone(),
				message: "qris is not offered".into(),
			}
			.into())
		})
	}

	fn process_withdraw(&self, request: WithdrawRequest) -> ProviderFuture<'_, WithdrawResponse> {
		Box::pin(async move {
			let _ = request;

			Err(ProviderError::Rejected {
				provider: self.id.clone(),
				message: "disbursement is not offered".into(),
			}
			.into())
		})
	}

	fn verify_callback(&self, callback: CallbackEvent) -> ProviderFuture<'_, bool> {
		Box::pin(async move {
			let _ = callback;

			Ok(false)
		})
	}

	fn check_status<'a>(
		&'a self,
		external_reference: &'a str,
	) -> ProviderFuture<'a, PaymentStatus> {
		Box::pin(async move {
			let _ = external_reference;

			Ok(PaymentStatus::Processing)
		})
	}

	fn inquiry_account(&self, request: InquiryRequest) -> ProviderFuture<'_, InquiryResponse> {
		Box::pin(async move {
			let _ = request;

			Ok(InquiryResponse {
				success: false,
				account_name: None,
				bank_name: None,
				raw: paygate_broker::serde_json::Value::Null,
			})
		})
	}

	fn is_healthy(&self) -> ProviderFuture<'_, bool> {
		Box::pin(async move { Ok(!self.fail_initialize) })
	}

	fn shutdown(&self) -> ProviderFuture<'_, ()> {
		Box::pin(async move {
			self.shutdowns.fetch_add(1, Ordering::SeqCst);

			Ok(())
		})
	}
}

fn source_for(entries: Vec<ProviderEntry>, configs: Vec<ProviderConfig>) -> MemoryConfigSource {
	let mut source = MemoryConfigSource::new(ProvidersConfig {
		providers: entries,
		defaults: Defaults::default(),
	});

	for config in configs {
		source = source.with_provider(config);
	}

	source
}

#[tokio::test]
async fn registering_the_same_id_twice_replaces_the_handler() {
	let registry = ProviderRegistry::new();

	registry.register(CountingProvider::new("midtrans", "First Instance"));
	registry.register(CountingProvider::new("midtrans", "Second Instance"));

	let resolved = registry
		.provider_by_id(&provider_id("midtrans"))
		.expect("The replaced id should still resolve.");

	assert_eq!(resolved.display_name(), "Second Instance");
	assert_eq!(registry.all_providers().len(), 1);
}

#[tokio::test]
async fn initialize_maps_labels_and_calls_providers_once() {
	let registry = ProviderRegistry::new();
	let provider = CountingProvider::new("midtrans", "Midtrans Payment Gateway");

	registry.register(provider.clone());

	let source = source_for(
		vec![entry("midtrans", true, &["DEPOSIT_BCA_VA", "DEPOSIT_QRIS"])],
		vec![config_for("midtrans")],
	);

	registry.initialize(&source).await.expect("Initialization should succeed.");

	assert!(registry.is_initialized());
	assert!(registry.supports_label_code(&label("DEPOSIT_BCA_VA")));
	assert!(registry.supports_label_code(&label("DEPOSIT_QRIS")));
	assert_eq!(registry.all_label_codes().len(), 2);
	assert_eq!(provider.initializations(), 1);
	assert!(provider.supports(&label("DEPOSIT_BCA_VA")));

	// A second initialize is a warn-only no-op: no side effects run again.
	registry.initialize(&source).await.expect("Repeated initialization should be a no-op.");

	assert_eq!(provider.initializations(), 1);
}

#[tokio::test]
async fn merged_defaults_land_in_the_registry_record() {
	let registry = ProviderRegistry::new();

	registry.register(CountingProvider::new("midtrans", "Midtrans Payment Gateway"));

	let source = source_for(
		vec![entry("midtrans", true, &["DEPOSIT_BCA_VA"])],
		vec![config_for("midtrans")],
	);

	registry.initialize(&source).await.expect("Initialization should succeed.");

	let record = registry
		.record_for_label(&label("DEPOSIT_BCA_VA"))
		.expect("Initialized label should resolve to a record.");
	let config = record.config.expect("The record should carry its merged configuration.");
	let rate = config.effective_rate_limit();

	assert_eq!(rate.requests_per_second, 100);
	assert_eq!(rate.burst_size, 200);
	assert_eq!(config.read_timeout().as_millis(), 30_000);
}

#[tokio::test]
async fn disabled_entries_never_reach_the_routing_table() {
	let registry = ProviderRegistry::new();
	let disabled = CountingProvider::new("midtrans", "Midtrans Payment Gateway");
	let enabled = CountingProvider::new("xendit", "Xendit Payment Gateway");

	registry.register(disabled.clone());
	registry.register(enabled.clone());

	let source = source_for(
		vec![
			entry("midtrans", false, &["DEPOSIT_BCA_VA"]),
			entry("xendit", true, &["WITHDRAW_BCA"]),
		],
		vec![config_for("midtrans"), config_for("xendit")],
	);

	registry.initialize(&source).await.expect("Initialization should succeed.");

	assert!(!registry.supports_label_code(&label("DEPOSIT_BCA_VA")));
	assert!(registry.supports_label_code(&label("WITHDRAW_BCA")));
	assert_eq!(disabled.initializations(), 0);
	assert_eq!(enabled.initializations(), 1);
}

#[tokio::test]
async fn unregistered_and_failing_entries_do_not_abort_the_rest() {
	let registry = ProviderRegistry::new();
	let failing = CountingProvider::failing("broken");
	let healthy = CountingProvider::new("xendit", "Xendit Payment Gateway");

	registry.register(failing.clone());
	registry.register(healthy.clone());

	let source = source_for(
		vec![
			entry("ghost", true, &["DEPOSIT_GHOST"]),
			entry("broken", true, &["DEPOSIT_BROKEN"]),
			entry("xendit", true, &["WITHDRAW_BCA"]),
		],
		vec![config_for("broken"), config_for("xendit")],
	);

	registry
		.initialize(&source)
		.await
		.expect("Initialization should recover from per-provider failures.");

	assert!(registry.is_initialized());
	assert!(!registry.supports_label_code(&label("DEPOSIT_GHOST")));
	assert_eq!(failing.initializations(), 0);
	assert_eq!(healthy.initializations(), 1);
	assert!(registry.supports_label_code(&label("WITHDRAW_BCA")));
	// Label codes attached before the failing initialize stay mapped; the failure
	// is logged and the provider is simply left uninitialized.
	assert!(registry.supports_label_code(&label("DEPOSIT_BROKEN")));
}

#[tokio::test]
async fn shutdown_clears_state_and_allows_reuse() {
	let registry = ProviderRegistry::new();
	let provider = CountingProvider::new("midtrans", "Midtrans Payment Gateway");

	registry.register(provider.clone());

	let source = source_for(
		vec![entry("midtrans", true, &["DEPOSIT_BCA_VA"])],
		vec![config_for("midtrans")],
	);

	registry.initialize(&source).await.expect("Initialization should succeed.");
	registry.shutdown().await;

	assert_eq!(provider.shutdowns(), 1);
	assert!(registry.all_providers().is_empty());
	assert!(registry.all_label_codes().is_empty());
	assert!(!registry.supports_label_code(&label("DEPOSIT_BCA_VA")));
	assert!(!registry.is_initialized());

	// Reusable after shutdown, provided providers are re-registered.
	registry.register(provider.clone());
	registry.initialize(&source).await.expect("Re-initialization should succeed.");

	assert!(registry.supports_label_code(&label("DEPOSIT_BCA_VA")));
	assert_eq!(provider.initializations(), 2);
}

#[tokio::test]
async fn lookup_misses_are_none_not_errors() {
	let registry = ProviderRegistry::new();

	assert!(registry.provider_by_id(&provider_id("nobody")).is_none());
	assert!(registry.provider_by_label_code(&label("NOWHERE")).is_none());
	assert!(registry.record_for_label(&label("NOWHERE")).is_none());
}
