use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use tether_primitives::ParamValue;
use tether_registry::{ComponentId, ParamPolicy, ParamType, PolicySet, RegistryError, WorkingState};

use crate::error::SyncError;
use crate::event::TriggerKind;
use crate::history::{CommitMode, MemoryHistory, NavigationHistory};
use crate::store::{DurableStore, MemoryStore};
use crate::SyncEngine;

type Engine = SyncEngine<MemoryHistory, MemoryStore>;

fn engine(query: &str) -> Engine {
	SyncEngine::new(MemoryHistory::from_url("/catalog", query), MemoryStore::new())
}

fn catalog() -> PolicySet {
	PolicySet::new()
		.with("page", ParamPolicy::new(ParamType::Number).with_default(1).url())
		.with("sort", ParamPolicy::new(ParamType::String).url().history())
		.with("owner", ParamPolicy::new(ParamType::String).read_only().url())
		.with("theme", ParamPolicy::new(ParamType::String).durable())
}

fn counter() -> (Arc<AtomicUsize>, impl FnMut(&mut crate::SyncEvent) + Send + 'static) {
	let count = Arc::new(AtomicUsize::new(0));
	let seen = Arc::clone(&count);
	(count, move |_: &mut crate::SyncEvent| {
		seen.fetch_add(1, Ordering::SeqCst);
	})
}

/// Must reject a changed read-only parameter and leave the committed entry untouched.
///
/// * Enforced in: `push_to_navigation`, `SyncEngine::state_pass`
/// * Failure symptom: a component overwrites a value it only observes, and the URL follows.
#[test]
fn test_read_only_change_leaves_entry_unchanged() {
	let mut engine = engine("?owner=alice");
	let handle = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();
	let before = engine.history().current_entry();
	let commits = engine.history().commits();

	let err = engine
		.update(handle, |state| {
			state.set("owner", "mallory");
			state.set("theme", "dark");
		})
		.unwrap_err();

	assert_eq!(
		err,
		SyncError::ReadOnlyViolation {
			scope: "catalog".into(),
			name: "owner".into(),
		}
	);
	assert_eq!(engine.history().current_entry(), before);
	assert_eq!(engine.history().commits(), commits);
	assert_eq!(engine.state(handle).unwrap().get("owner"), Some(&ParamValue::from("alice")));
	assert_eq!(engine.state(handle).unwrap().get("theme"), None);
	assert_eq!(engine.store().get("catalog:theme").unwrap(), None);
}

/// Must fail a mount whose required parameter resolves to nothing, before the
/// binding becomes observable.
///
/// * Enforced in: `pull_from_navigation`, `SyncEngine::mount`
/// * Failure symptom: a component renders with an undefined required value.
#[test]
fn test_required_missing_fails_mount() {
	let mut engine = engine("");
	let policies = PolicySet::new().with("id", ParamPolicy::new(ParamType::Number).required().url());

	let err = engine
		.mount(ComponentId(1), policies.clone(), WorkingState::new(), "detail")
		.unwrap_err();
	assert!(matches!(err, SyncError::MissingRequiredParameter { .. }));
	assert!(engine.registry().is_empty());
	assert_eq!(engine.history().commits(), 0);

	// the id is free again once the failed mount is rolled back
	engine.history_mut().commit_entry(
		crate::NavigationEntry::from_query("/detail", "?id=7"),
		CommitMode::Replace,
		"?id=7",
	);
	let handle = engine
		.mount(ComponentId(1), policies, WorkingState::new(), "detail")
		.unwrap();
	assert_eq!(engine.state(handle).unwrap().get("id"), Some(&ParamValue::Number(7.0)));
}

/// Must not commit again when a pass finds nothing to change.
///
/// * Enforced in: `SyncEngine::navigation_pass`, `SyncEngine::state_pass`
/// * Failure symptom: every trigger replaces the entry, flooding history observers.
#[test]
fn test_repeated_passes_are_idempotent() {
	let mut engine = engine("");
	let handle = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();
	assert_eq!(engine.history().commits(), 1);

	let report = engine.navigated().unwrap();
	assert_eq!(report.commit, None);
	assert!(report.amended.is_empty());
	assert_eq!(engine.history().commits(), 1);

	engine.set(handle, "page", 3).unwrap();
	let report = engine.set(handle, "page", 3).unwrap();
	assert_eq!(report.commit, None);
	assert_eq!(engine.history().commits(), 2);
}

/// Must not run a deferred navigation trigger that only observes the engine's
/// own commit.
///
/// * Enforced in: `SyncEngine::run_deferred`
/// * Failure symptom: each commit re-triggers inbound reconciliation, recursing.
#[test]
fn test_self_echo_is_suppressed() {
	let mut engine = engine("");
	let handle = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();

	let scheduler = engine.scheduler();
	let (count, mut listener) = counter();
	engine.subscribe(move |event| {
		listener(event);
		scheduler.navigation();
	});

	engine.set(handle, "page", 2).unwrap();
	assert_eq!(count.load(Ordering::SeqCst), 1);
	assert_eq!(engine.scheduler().pending(), 0);
}

/// Must never nest passes; triggers raised during a pass run after it, in order.
///
/// * Enforced in: `Scheduler::begin_pass`, `SyncEngine::run_deferred`
/// * Failure symptom: a listener observes a half-applied pass.
#[test]
fn test_listener_triggers_are_deferred() {
	let mut engine = engine("");
	let handle = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();

	let scheduler = engine.scheduler();
	let in_flight = Arc::new(AtomicUsize::new(0));
	let observed = Arc::clone(&in_flight);
	engine.subscribe(move |event| {
		if scheduler.is_in_flight() {
			observed.fetch_add(1, Ordering::SeqCst);
		}
		if event.params().get("page") == Some(&ParamValue::Number(2.0)) {
			scheduler.assign(handle, "sort", Some(ParamValue::from("name")));
		}
	});

	engine.set(handle, "page", 2).unwrap();
	assert_eq!(in_flight.load(Ordering::SeqCst), 2);
	assert_eq!(engine.history().current_query(), "?page=2&sort=name");
	assert_eq!(engine.history().len(), 2, "sort is history-significant");
}

/// Must run triggers queued during a mount pass before mount returns.
///
/// * Enforced in: `SyncEngine::mount`
/// * Failure symptom: a listener's assignment sits in the queue until some unrelated call.
#[test]
fn test_mount_drains_listener_triggers() {
	let mut engine = engine("");
	let list = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();

	let scheduler = engine.scheduler();
	engine.subscribe(move |event| {
		if event.kind() == TriggerKind::Mount {
			scheduler.assign(list, "sort", Some(ParamValue::from("name")));
		}
	});

	let detail = PolicySet::new().with("tab", ParamPolicy::new(ParamType::String).with_default("info").url());
	engine
		.mount(ComponentId(2), detail, WorkingState::new(), "detail")
		.unwrap();

	assert_eq!(engine.scheduler().pending(), 0);
	assert_eq!(engine.state(list).unwrap().get("sort"), Some(&ParamValue::from("name")));
	assert_eq!(engine.history().current_query(), "?page=1&sort=name&tab=info");
}

/// Must leave the committed entry and every other binding intact when any
/// binding fails during a pass.
///
/// * Enforced in: `SyncEngine::navigation_pass`
/// * Failure symptom: the entry holds amendments from a pass that errored.
#[test]
fn test_failed_pass_commits_nothing() {
	let mut engine = engine("");
	let list = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();
	let before = engine.history().current_entry();

	let detail = PolicySet::new()
		.with("tab", ParamPolicy::new(ParamType::String).with_default("info").url())
		.with("id", ParamPolicy::new(ParamType::Number).required());
	assert!(engine
		.mount(ComponentId(2), detail, WorkingState::new(), "detail")
		.is_err());

	assert_eq!(engine.history().current_entry(), before);
	assert_eq!(engine.history().current_query(), "?page=1");
	assert_eq!(engine.registry().len(), 1);
	assert_eq!(engine.state(list).unwrap().get("page"), Some(&ParamValue::Number(1.0)));
}

/// Must skip the commit when a listener prevents the event.
///
/// * Enforced in: `SyncEngine::commit`
/// * Failure symptom: a router that took over navigation sees a duplicate entry.
#[test]
fn test_prevented_event_skips_commit() {
	let mut engine = engine("");
	let handle = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();
	engine.subscribe(|event| {
		if event.kind() == TriggerKind::StateChange {
			event.prevent_default();
		}
	});

	let report = engine.set(handle, "sort", "name").unwrap();
	assert!(report.prevented);
	assert_eq!(report.commit, None);
	assert_eq!(engine.history().current_query(), "?page=1");
	assert_eq!(engine.history().len(), 1);
	assert_eq!(engine.state(handle).unwrap().get("sort"), Some(&ParamValue::from("name")));
}

/// Must refuse to act through a handle whose binding was unmounted.
///
/// * Enforced in: `Registry::binding_mut`, `Registry::unregister`
/// * Failure symptom: a torn-down component writes into a newer mount's state.
#[test]
fn test_stale_handle_is_rejected() {
	let mut engine = engine("");
	let old = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();
	assert!(engine.unmount(old));
	assert!(!engine.unmount(old));

	let new = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();
	assert_eq!(
		engine.set(old, "page", 9).unwrap_err(),
		SyncError::Registry(RegistryError::UnknownComponent { id: ComponentId(1) })
	);
	assert!(!engine.unmount(old));
	assert_eq!(engine.state(new).unwrap().get("page"), Some(&ParamValue::Number(1.0)));
}

/// Must stamp every commit with a strictly newer entry version.
///
/// * Enforced in: `SyncEngine::commit`
/// * Failure symptom: self-echo detection matches an entry the engine did not write.
#[test]
fn test_versions_increase() {
	let mut engine = engine("");
	let handle = engine
		.mount(ComponentId(1), catalog(), WorkingState::new(), "catalog")
		.unwrap();
	let first = engine.history().current_entry().version;
	engine.set(handle, "sort", "name").unwrap();
	let second = engine.history().current_entry().version;
	engine.set(handle, "page", 4).unwrap();
	let third = engine.history().current_entry().version;
	assert!(first < second && second < third);
}
