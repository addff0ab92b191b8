//! Per-provider token-bucket rate limiting.
//!
//! Budgets are rejected fast and locally: the limiter answers before any worker is
//! consumed or any byte leaves the process. Providers without a configured bucket
//! are unlimited, which is an explicit default rather than an error.

// std
use std::time::Instant;
// self
use crate::{_prelude::*, log::SecureLog, payment::ProviderId};

/// Mutable bucket state; only touched while holding the bucket's lock.
#[derive(Debug)]
struct BucketState {
	/// Currently available tokens; never above capacity, never below zero.
	tokens: f64,
	/// Instant of the last whole-token refill.
	last_refill: Instant,
}

/// Deterministic token bucket refilled by elapsed wall-clock time.
#[derive(Debug)]
pub struct TokenBucket {
	/// Steady-state refill rate in tokens per second.
	refill_rate: u32,
	/// Maximum tokens the bucket can hold.
	capacity: u32,
	/// Locked mutable state, so check-and-decrement is atomic as a unit.
	state: Mutex<BucketState>,
}
impl TokenBucket {
	/// Creates a full bucket with the given refill rate and capacity.
	pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
		Self {
			refill_rate: requests_per_second,
			capacity: burst_size,
			state: Mutex::new(BucketState {
				tokens: f64::from(burst_size),
				last_refill: Instant::now(),
			}),
		}
	}

	/// Attempts to take one token, refilling from elapsed time first.
	pub fn try_acquire(&self) -> bool {
		let mut state = self.state.lock();
		let now = Instant::now();
		let elapsed = now.duration_since(state.last_refill);
		let refill = (elapsed.as_secs_f64() * f64::from(self.refill_rate)).floor();

		// Whole tokens only; advancing `last_refill` on fractional refills would
		// drift the timestamp under high call rates and starve the bucket.
		if refill >= 1.0 {
			state.tokens = (state.tokens + refill).min(f64::from(self.capacity));
			state.last_refill = now;
		}
		if state.tokens >= 1.0 {
			state.tokens -= 1.0;

			true
		} else {
			false
		}
	}
}

/// Per-provider rate limiter owning one token bucket per configured provider.
#[derive(Debug)]
pub struct RateLimiter {
	/// Provider → bucket mapping; buckets are independently synchronized.
	buckets: RwLock<HashMap<ProviderId, TokenBucket>>,
	/// Masked logger for configuration and rejection records.
	log: SecureLog,
}
impl RateLimiter {
	/// Creates an empty limiter; every provider is unlimited until configured.
	pub fn new() -> Self {
		Self { buckets: RwLock::new(HashMap::new()), log: SecureLog::new("rate_limiter") }
	}

	/// Installs or replaces the bucket for a provider.
	pub fn configure(&self, provider: &ProviderId, requests_per_second: u32, burst_size: u32) {
		self.buckets
			.write()
			.insert(provider.clone(), TokenBucket::new(requests_per_second, burst_size));
		self.log.info(format!(
			"rate limiter configured for `{provider}`: {requests_per_second} req/s, burst {burst_size}"
		));
	}

	/// Attempts to take a token; providers without a bucket always succeed.
	pub fn try_acquire(&self, provider: &ProviderId) -> bool {
		self.buckets.read().get(provider).is_none_or(TokenBucket::try_acquire)
	}

	/// Takes a token or fails with [`Error::RateLimitExceeded`].
	pub fn acquire(&self, provider: &ProviderId) -> Result<()> {
		if self.try_acquire(provider) {
			Ok(())
		} else {
			self.log.warn(format!("rate limit exceeded for provider `{provider}`"));

			Err(Error::RateLimitExceeded { provider: provider.clone() })
		}
	}

	/// Drops the bucket for a provider (used on reconfiguration or restart).
	pub fn reset(&self, provider: &ProviderId) {
		self.buckets.write().remove(provider);
	}

	/// Drops every bucket.
	pub fn reset_all(&self) {
		self.buckets.write().clear();
	}
}
impl Default for RateLimiter {
	fn default() -> Self {
		Self::new()
	}
}
