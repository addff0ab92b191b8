//! Deadline enforcement for provider calls running on detached worker tasks.
//!
//! Every guarded operation runs as its own tokio task so the caller is unblocked
//! the moment the deadline expires, even if the operation keeps running. Expired
//! workers are detached, never aborted: the underlying transport has no cheap
//! cooperative cancellation, so the task is left to finish on its own and its
//! result is discarded. This is accepted behavior, not a leak to fix.

// std
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
// self
use crate::{_prelude::*, error::ProviderError, log::SecureLog};

/// Runs operations on worker tasks and abandons them at a wall-clock deadline.
#[derive(Debug)]
pub struct TimeoutGuard {
	/// Deadline applied when the caller does not supply one.
	default_deadline: Duration,
	/// Cleared by [`shutdown`](Self::shutdown); new work is refused afterwards.
	accepting: AtomicBool,
	/// Workers spawned and not yet finished, including detached ones.
	in_flight: Arc<AtomicUsize>,
	/// Masked logger for timeout and shutdown records.
	log: SecureLog,
}
impl TimeoutGuard {
	/// Grace period [`shutdown`](Self::shutdown) waits for in-flight workers.
	const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
	/// Poll interval used while waiting out the grace period.
	const SHUTDOWN_POLL: Duration = Duration::from_millis(20);

	/// Creates a guard with the given default deadline.
	pub fn new(default_deadline: Duration) -> Self {
		Self {
			default_deadline,
			accepting: AtomicBool::new(true),
			in_flight: Arc::new(AtomicUsize::new(0)),
			log: SecureLog::new("timeout_guard"),
		}
	}

	/// Runs the operation against the configured default deadline.
	pub async fn run<T, F>(&self, operation: F) -> Result<T>
	where
		T: 'static + Send,
		F: 'static + Send + Future<Output = Result<T>>,
	{
		self.run_with_deadline(operation, self.default_deadline).await
	}

	/// Runs the operation on a worker task, failing with [`Error::ProviderTimeout`]
	/// once the deadline expires.
	///
	/// Errors raised by the operation before the deadline propagate unchanged.
	pub async fn run_with_deadline<T, F>(&self, operation: F, deadline: Duration) -> Result<T>
	where
		T: 'static + Send,
		F: 'static + Send + Future<Output = Result<T>>,
	{
		if !self.accepting.load(Ordering::Acquire) {
			return Err(ProviderError::WorkerPoolClosed.into());
		}

		let tracker = WorkerTracker::begin(self.in_flight.clone());
		let worker = tokio::spawn(async move {
			let _tracker = tracker;

			operation.await
		});

		match tokio::time::timeout(deadline, worker).await {
			Ok(Ok(result)) => result,
			Ok(Err(join_error)) =>
				Err(ProviderError::Worker { message: join_error.to_string() }.into()),
			Err(_) => {
				let deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);

				self.log.warn(format!("operation abandoned after {deadline_ms}ms deadline"));

				Err(Error::ProviderTimeout { deadline_ms })
			},
		}
	}

	/// Stops accepting work, waits a short grace period for in-flight workers, then
	/// returns regardless; remaining workers are discarded without cancellation.
	pub async fn shutdown(&self) {
		self.accepting.store(false, Ordering::Release);

		let grace_ends = tokio::time::Instant::now() + Self::SHUTDOWN_GRACE;

		while self.in_flight.load(Ordering::Acquire) > 0
			&& tokio::time::Instant::now() < grace_ends
		{
			tokio::time::sleep(Self::SHUTDOWN_POLL).await;
		}

		let remaining = self.in_flight.load(Ordering::Acquire);

		if remaining > 0 {
			self.log.warn(format!("discarding {remaining} workers still running after grace period"));
		}
	}
}

/// RAII in-flight counter entry held by each worker for its whole lifetime.
struct WorkerTracker(Arc<AtomicUsize>);
impl WorkerTracker {
	fn begin(counter: Arc<AtomicUsize>) -> Self {
		counter.fetch_add(1, Ordering::AcqRel);

		Self(counter)
	}
}
impl Drop for WorkerTracker {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::AcqRel);
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::future;
	// self
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn completing_operations_return_their_value() {
		let guard = TimeoutGuard::new(Duration::from_millis(200));
		let value = guard
			.run(async {
				tokio::time::sleep(Duration::from_millis(50)).await;

				Ok(42_u32)
			})
			.await
			.expect("An operation finishing inside the deadline should succeed.");

		assert_eq!(value, 42);
	}

	#[tokio::test(start_paused = true)]
	async fn deadline_expiry_raises_provider_timeout_on_time() {
		let guard = TimeoutGuard::new(Duration::from_secs(30));
		let started = tokio::time::Instant::now();
		let error = guard
			.run_with_deadline(future::pending::<Result<()>>(), Duration::from_millis(50))
			.await
			.expect_err("A never-completing operation should time out.");
		let elapsed = started.elapsed();

		assert!(matches!(error, Error::ProviderTimeout { deadline_ms: 50 }));
		assert!(
			elapsed >= Duration::from_millis(50) && elapsed < Duration::from_millis(100),
			"timeout should fire at the deadline, not before or long after"
		);
	}

	#[tokio::test(start_paused = true)]
	async fn operation_errors_propagate_unchanged() {
		let guard = TimeoutGuard::new(Duration::from_millis(200));
		let error = guard
			.run(async { Err::<(), _>(ProviderError::WorkerPoolClosed.into()) })
			.await
			.expect_err("The operation's own error should surface.");

		assert!(
			matches!(error, Error::Provider(ProviderError::WorkerPoolClosed)),
			"errors raised before the deadline must not be rewrapped as timeouts"
		);
	}

	#[tokio::test(start_paused = true)]
	async fn shutdown_refuses_new_work() {
		let guard = TimeoutGuard::new(Duration::from_millis(200));

		guard.shutdown().await;

		let error = guard
			.run(async { Ok(()) })
			.await
			.expect_err("A shut-down guard should refuse new work.");

		assert!(matches!(error, Error::Provider(ProviderError::WorkerPoolClosed)));
	}

	#[tokio::test(start_paused = true)]
	async fn shutdown_waits_for_in_flight_workers() {
		let guard = TimeoutGuard::new(Duration::from_secs(1));
		let worker = guard.run(async {
			tokio::time::sleep(Duration::from_millis(100)).await;

			Ok(7_u32)
		});
		let (result, ()) = tokio::join!(worker, guard.shutdown());

		assert_eq!(
			result.expect("A worker started before shutdown should finish inside the grace."),
			7
		);
	}
}
