/* src/lock.rs */

//!
//! Reentrant mutual exclusion for async tasks.
//!
//! Ownership is tracked per logical task through a tokio task-local holding
//! `lock id -> recursion depth`. A future running inside [`ReentrantLock::scope`]
//! may call `scope` on the same lock again and proceeds immediately; any
//! other task (including futures joined next to it but polled outside the
//! scope) waits until the outermost scope finishes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

static NEXT_LOCK_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
	static HELD: RefCell<HashMap<u64, usize>>;
}

/// An async lock that the owning logical task may re-acquire.
#[derive(Debug)]
pub struct ReentrantLock {
	id: u64,
	gate: Mutex<()>,
}

impl ReentrantLock {
	pub fn new() -> Self {
		Self {
			id: NEXT_LOCK_ID.fetch_add(1, Ordering::Relaxed),
			gate: Mutex::new(()),
		}
	}

	/// Runs `fut` while holding the lock.
	///
	/// Cancelling the returned future before the lock is acquired leaves
	/// nothing behind.
	///
	/// Futures polled concurrently inside one scope (e.g. joined) share its
	/// ownership and are not mutually excluded from each other.
	pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
		if HELD.try_with(|_| ()).is_ok() {
			self.enter(fut).await
		} else {
			HELD.scope(RefCell::new(HashMap::new()), self.enter(fut)).await
		}
	}

	/// Recursion depth of the current task on this lock, 0 when not held.
	pub fn hold_count(&self) -> usize {
		HELD.try_with(|held| held.borrow().get(&self.id).copied().unwrap_or(0))
			.unwrap_or(0)
	}

	/// Returns true if the current task holds this lock.
	pub fn is_held_by_current_task(&self) -> bool {
		self.hold_count() > 0
	}

	async fn enter<F: Future>(&self, fut: F) -> F::Output {
		if self.is_held_by_current_task() {
			let _depth = Depth::enter(self.id);
			return fut.await;
		}

		let _gate = match self.gate.try_lock() {
			Ok(guard) => guard,
			Err(_) => {
				tracing::trace!(lock = self.id, "waiting for store lock");
				self.gate.lock().await
			}
		};
		let _depth = Depth::enter(self.id);
		fut.await
	}
}

impl Default for ReentrantLock {
	fn default() -> Self {
		Self::new()
	}
}

/// Increments the task's depth for a lock, decrements on drop.
struct Depth {
	id: u64,
}

impl Depth {
	fn enter(id: u64) -> Self {
		let _ = HELD.try_with(|held| {
			*held.borrow_mut().entry(id).or_insert(0) += 1;
		});
		Self { id }
	}
}

impl Drop for Depth {
	fn drop(&mut self) {
		let _ = HELD.try_with(|held| {
			let mut held = held.borrow_mut();
			if let Some(depth) = held.get_mut(&self.id) {
				*depth -= 1;
				if *depth == 0 {
					held.remove(&self.id);
				}
			}
		});
	}
}
