//! The convergence loop.
//!
//! [`SyncEngine`] owns the registry and the two storage collaborators. The
//! host drives it: [`SyncEngine::mount`] when a component appears,
//! [`SyncEngine::update`] when a component changes its working state,
//! [`SyncEngine::navigated`] on back/forward, and [`SyncEngine::unmount`] on
//! teardown. Every call runs exactly one pass and then drains deferred
//! triggers.
//!
//! A pass computes the whole next entry before touching history. An error
//! anywhere in the pass returns before the commit, so the committed entry is
//! never partially updated.

use std::sync::Arc;

use tether_primitives::{ParamValue, Params};
use tether_registry::{BindingHandle, ComponentId, PolicySet, Registry, WorkingState};
use tracing::debug_span;

use crate::error::Result;
use crate::event::{ListenerId, Listeners, SyncEvent, TriggerKind};
use crate::history::{CommitMode, EntryVersion, NavigationEntry, NavigationHistory};
use crate::inbound::pull_from_navigation;
use crate::outbound::push_to_navigation;
use crate::projection::project;
use crate::scheduler::{Scheduler, Trigger};
use crate::store::DurableStore;

#[cfg(test)]
mod invariants;

/// What one convergence pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
	pub trigger: TriggerKind,
	/// Inbound: parameters whose working value changed. Outbound: parameters
	/// written into the entry.
	pub changed: Vec<String>,
	/// Parameters written back into the entry by an inbound pass.
	pub amended: Vec<String>,
	/// How the entry was committed, if at all.
	pub commit: Option<CommitMode>,
	/// A listener suppressed the commit.
	pub prevented: bool,
	/// The query string shown after the pass.
	pub query: String,
}

/// Keeps working state, the navigation entry, the query string, and durable
/// storage in agreement.
#[derive(Debug)]
pub struct SyncEngine<H, S> {
	registry: Registry,
	history: H,
	store: S,
	listeners: Listeners,
	scheduler: Scheduler,
	/// Highest version this engine has stamped.
	issued: EntryVersion,
	/// Version of the engine's most recent commit.
	echo: Option<EntryVersion>,
}

impl<H: NavigationHistory, S: DurableStore> SyncEngine<H, S> {
	pub fn new(history: H, store: S) -> Self {
		let issued = history.current_entry().version;
		Self {
			registry: Registry::new(),
			history,
			store,
			listeners: Listeners::default(),
			scheduler: Scheduler::new(),
			issued,
			echo: None,
		}
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn history(&self) -> &H {
		&self.history
	}

	/// Mutable access for traversal. Call [`SyncEngine::navigated`] afterwards.
	pub fn history_mut(&mut self) -> &mut H {
		&mut self.history
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	/// Handle for queueing triggers from listeners and host callbacks.
	pub fn scheduler(&self) -> Scheduler {
		self.scheduler.clone()
	}

	/// Working state of a mounted component.
	pub fn state(&self, handle: BindingHandle) -> Option<&WorkingState> {
		self.registry.get(handle).map(|binding| binding.state())
	}

	/// Subscribes to the synchronization event.
	pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
	where
		F: FnMut(&mut SyncEvent) + Send + 'static,
	{
		self.listeners.add(Box::new(listener))
	}

	pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
		self.listeners.remove(id)
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Registers a component and reconciles every binding against the current
	/// entry.
	///
	/// Triggers queued during the mount pass run before this returns. The
	/// component stays mounted if one of them fails; the failure is logged and
	/// the remaining triggers stay queued for [`SyncEngine::run_deferred`].
	///
	/// # Errors
	///
	/// - [`SyncError::Registry`](crate::SyncError::Registry) if `id` is already mounted.
	/// - [`SyncError::MissingRequiredParameter`](crate::SyncError::MissingRequiredParameter) if a required parameter has
	///   no value. The component is unregistered and nothing is committed.
	pub fn mount(
		&mut self,
		id: ComponentId,
		policies: impl Into<Arc<PolicySet>>,
		initial: WorkingState,
		scope: impl Into<String>,
	) -> Result<BindingHandle> {
		let handle = self.registry.register(id, policies, initial, scope)?;
		match self.navigation_pass(TriggerKind::Mount) {
			Ok(report) => {
				tracing::debug!(%id, query = %report.query, "mounted");
				if let Err(error) = self.run_deferred() {
					tracing::warn!(%id, %error, "deferred trigger after mount failed");
				}
				Ok(handle)
			}
			Err(error) => {
				self.registry.unregister(handle);
				tracing::warn!(%id, %error, "mount failed");
				Err(error)
			}
		}
	}

	/// Removes a component. Returns false for an unknown or stale handle.
	pub fn unmount(&mut self, handle: BindingHandle) -> bool {
		self.registry.unregister(handle).is_some()
	}

	/// Reconciles every binding after the host moved through history.
	pub fn navigated(&mut self) -> Result<PassReport> {
		self.echo = None;
		let report = self.navigation_pass(TriggerKind::Navigation)?;
		self.run_deferred()?;
		Ok(report)
	}

	/// Mutates a component's working state and pushes the change outward.
	///
	/// # Errors
	///
	/// - [`SyncError::Registry`](crate::SyncError::Registry) for an unknown or stale handle.
	/// - [`SyncError::ReadOnlyViolation`](crate::SyncError::ReadOnlyViolation) if `mutate` changed a read-only
	///   parameter. The working state is rolled back and the entry, the URL
	///   and durable storage are untouched.
	pub fn update<F>(&mut self, handle: BindingHandle, mutate: F) -> Result<PassReport>
	where
		F: FnOnce(&mut WorkingState),
	{
		let report = self.state_pass(handle, mutate)?;
		self.run_deferred()?;
		Ok(report)
	}

	/// Sets one parameter. See [`SyncEngine::update`].
	pub fn set(
		&mut self,
		handle: BindingHandle,
		name: impl Into<String>,
		value: impl Into<ParamValue>,
	) -> Result<PassReport> {
		let name = name.into();
		let value = value.into();
		self.update(handle, move |state| {
			state.set(name, value);
		})
	}

	/// Makes one parameter undefined. See [`SyncEngine::update`].
	pub fn unset(&mut self, handle: BindingHandle, name: &str) -> Result<PassReport> {
		self.update(handle, |state| {
			state.unset(name);
		})
	}

	/// Runs queued triggers in FIFO order, returning how many ran.
	///
	/// Stops at the first failing trigger; later triggers stay queued.
	pub fn run_deferred(&mut self) -> Result<usize> {
		let mut ran = 0;
		while let Some(trigger) = self.scheduler.pop() {
			match trigger {
				Trigger::Navigation => {
					let current = self.history.current_entry().version;
					if self.echo == Some(current) {
						tracing::trace!(version = current.0, "suppressed self-echo");
						continue;
					}
					self.navigation_pass(TriggerKind::Navigation)?;
				}
				Trigger::Assign { handle, changes } => {
					self.state_pass(handle, move |state| {
						for (name, value) in changes {
							state.assign(name, value);
						}
					})?;
				}
			}
			ran += 1;
		}
		Ok(ran)
	}

	fn navigation_pass(&mut self, kind: TriggerKind) -> Result<PassReport> {
		let span = debug_span!("sync_pass", ?kind, bindings = self.registry.len());
		let _enter = span.enter();
		let _guard = self.scheduler.begin_pass();

		let base = self.history.current_entry();
		let outcomes = self
			.registry
			.iter()
			.map(|binding| pull_from_navigation(binding, &base, &self.store).map(|outcome| (binding.handle(), outcome)))
			.collect::<Result<Vec<_>>>()?;

		let mut changed = Vec::new();
		let mut amendments: Vec<(String, Option<ParamValue>)> = Vec::new();
		for (handle, outcome) in outcomes {
			if let Some(binding) = self.registry.get_mut(handle) {
				binding.replace_state(outcome.state);
			}
			changed.extend(outcome.changed);
			for (name, value) in outcome.amended {
				// first binding to declare a shared name decides its entry value
				if amendments.iter().all(|(existing, _)| *existing != name) {
					amendments.push((name, Some(value)));
				}
			}
		}
		let amended: Vec<String> = amendments.iter().map(|(name, _)| name.clone()).collect();

		let params = if amendments.is_empty() {
			base.params.clone()
		} else {
			base.params.merged(amendments)
		};
		let query = project(self.registry.iter(), &params);

		let mut event = SyncEvent::new(kind, params.clone(), false);
		self.listeners.dispatch(&mut event);

		let commit = if !amended.is_empty() || query != self.history.current_query() {
			self.commit(base, params, CommitMode::Replace, &query, &event)
		} else {
			None
		};

		Ok(PassReport {
			trigger: kind,
			changed,
			amended,
			commit,
			prevented: event.is_prevented(),
			query: self.history.current_query(),
		})
	}

	fn state_pass<F>(&mut self, handle: BindingHandle, mutate: F) -> Result<PassReport>
	where
		F: FnOnce(&mut WorkingState),
	{
		let span = debug_span!("sync_pass", kind = ?TriggerKind::StateChange, id = %handle.id());
		let _enter = span.enter();
		let _guard = self.scheduler.begin_pass();

		let binding = self.registry.binding_mut(handle)?;
		let snapshot = binding.state().clone();
		mutate(binding.state_mut());

		let base = self.history.current_entry();
		let outcome = match push_to_navigation(&*binding, &base.params, &mut self.store) {
			Ok(outcome) => outcome,
			Err(error) => {
				binding.replace_state(snapshot);
				tracing::warn!(%error, "state change rejected; working state restored");
				return Err(error);
			}
		};

		if outcome.is_empty() {
			return Ok(PassReport {
				trigger: TriggerKind::StateChange,
				changed: Vec::new(),
				amended: Vec::new(),
				commit: None,
				prevented: false,
				query: self.history.current_query(),
			});
		}

		let changed = outcome.changed_names();
		let mode = if outcome.history {
			CommitMode::Push
		} else {
			CommitMode::Replace
		};
		let params = base.params.merged(outcome.changes);
		let query = project(self.registry.iter(), &params);

		let mut event = SyncEvent::new(TriggerKind::StateChange, params.clone(), outcome.history);
		self.listeners.dispatch(&mut event);
		let commit = self.commit(base, params, mode, &query, &event);

		Ok(PassReport {
			trigger: TriggerKind::StateChange,
			changed,
			amended: Vec::new(),
			commit,
			prevented: event.is_prevented(),
			query: self.history.current_query(),
		})
	}

	/// Commits `params` over `base` in one call, unless `event` was prevented.
	fn commit(
		&mut self,
		base: NavigationEntry,
		params: Params,
		mode: CommitMode,
		query: &str,
		event: &SyncEvent,
	) -> Option<CommitMode> {
		if event.is_prevented() {
			tracing::debug!(?mode, "commit prevented by listener");
			return None;
		}
		self.issued = EntryVersion(self.issued.0.max(base.version.0) + 1);
		let entry = NavigationEntry {
			route: base.route,
			params,
			version: self.issued,
		};
		tracing::debug!(version = self.issued.0, ?mode, query, "commit");
		self.history.commit_entry(entry, mode, query);
		self.echo = Some(self.issued);
		Some(mode)
	}
}

impl<H: NavigationHistory, S: DurableStore + Default> SyncEngine<H, S> {
	/// Builds an engine over `history` with a default-constructed store.
	pub fn with_history(history: H) -> Self {
		Self::new(history, S::default())
	}
}
