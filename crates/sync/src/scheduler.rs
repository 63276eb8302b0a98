//! Deferred triggers.
//!
//! Passes never nest. Anything that wants a pass while one is in flight (a
//! listener reacting to the event, a host callback fired by a commit) queues
//! a [`Trigger`] through a [`Scheduler`] handle instead; the engine drains
//! the queue in FIFO order once the current pass has finished.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tether_primitives::ParamValue;
use tether_registry::BindingHandle;


/// A request for a convergence pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
	/// Re-run inbound reconciliation against the current entry.
	Navigation,
	/// Apply `changes` to a binding's working state, then run outbound.
	Assign {
		handle: BindingHandle,
		changes: Vec<(String, Option<ParamValue>)>,
	},
}

#[derive(Debug, Default)]
struct Shared {
	queue: VecDeque<Trigger>,
	in_flight: bool,
}

/// Cloneable handle to the engine's trigger queue.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
	shared: Arc<Mutex<Shared>>,
}

impl Scheduler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues `trigger` to run after the current pass.
	///
	/// A navigation trigger directly behind another navigation trigger is
	/// dropped; both would reconcile against the same entry.
	pub fn schedule(&self, trigger: Trigger) {
		let mut shared = self.shared.lock();
		if trigger == Trigger::Navigation && shared.queue.back() == Some(&Trigger::Navigation) {
			tracing::trace!("coalesced navigation trigger");
			return;
		}
		shared.queue.push_back(trigger);
	}

	pub fn navigation(&self) {
		self.schedule(Trigger::Navigation);
	}

	/// Queues a working-state change for `handle`.
	pub fn assign(&self, handle: BindingHandle, name: impl Into<String>, value: Option<ParamValue>) {
		self.schedule(Trigger::Assign {
			handle,
			changes: vec![(name.into(), value)],
		});
	}

	/// Number of queued triggers.
	pub fn pending(&self) -> usize {
		self.shared.lock().queue.len()
	}

	/// True while a convergence pass is running.
	pub fn is_in_flight(&self) -> bool {
		self.shared.lock().in_flight
	}

	pub(crate) fn pop(&self) -> Option<Trigger> {
		self.shared.lock().queue.pop_front()
	}

	/// Marks a pass in flight until the guard drops.
	pub(crate) fn begin_pass(&self) -> PassGuard {
		self.shared.lock().in_flight = true;
		PassGuard {
			shared: Arc::clone(&self.shared),
		}
	}
}

/// Clears the in-flight flag on drop, including on early error returns.
pub(crate) struct PassGuard {
	shared: Arc<Mutex<Shared>>,
}

impl Drop for PassGuard {
	fn drop(&mut self) {
		self.shared.lock().in_flight = false;
	}
}
