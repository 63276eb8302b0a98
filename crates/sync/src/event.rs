//! The synchronization event and its listeners.

use tether_primitives::Params;

/// What started a convergence pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
	/// A component was mounted.
	Mount,
	/// The host reported back/forward traversal, or a deferred navigation trigger ran.
	Navigation,
	/// A component's working state changed.
	StateChange,
}

/// Broadcast once per convergence pass, before the pass commits.
///
/// A listener that calls [`SyncEvent::prevent_default`] suppresses the
/// commit; working state and durable storage are already reconciled by then.
#[derive(Debug, Clone)]
pub struct SyncEvent {
	params: Params,
	history: bool,
	kind: TriggerKind,
	prevented: bool,
}

impl SyncEvent {
	pub(crate) fn new(kind: TriggerKind, params: Params, history: bool) -> Self {
		Self {
			params,
			history,
			kind,
			prevented: false,
		}
	}

	/// Snapshot of the parameters the pass is about to commit.
	pub fn params(&self) -> &Params {
		&self.params
	}

	/// True if the pass would push a new history entry.
	pub fn history_significant(&self) -> bool {
		self.history
	}

	pub fn kind(&self) -> TriggerKind {
		self.kind
	}

	pub fn prevent_default(&mut self) {
		self.prevented = true;
	}

	pub fn is_prevented(&self) -> bool {
		self.prevented
	}
}

/// Identifies a subscribed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&mut SyncEvent) + Send>;

/// Subscribed event listeners, called in subscription order.
#[derive(Default)]
pub(crate) struct Listeners {
	entries: Vec<(ListenerId, Listener)>,
	next: u64,
}

impl Listeners {
	pub(crate) fn add(&mut self, listener: Listener) -> ListenerId {
		self.next += 1;
		let id = ListenerId(self.next);
		self.entries.push((id, listener));
		id
	}

	pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
		let before = self.entries.len();
		self.entries.retain(|(existing, _)| *existing != id);
		self.entries.len() != before
	}

	pub(crate) fn dispatch(&mut self, event: &mut SyncEvent) {
		for (_, listener) in &mut self.entries {
			listener(&mut *event);
		}
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}
}

impl std::fmt::Debug for Listeners {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Listeners").field("len", &self.entries.len()).finish()
	}
}
