use pretty_assertions::assert_eq;
use tether_primitives::ParamValue;
use tether_registry::{ComponentId, ParamPolicy, ParamType, PolicySet, WorkingState};
use tether_sync::{DurableStore, JsonFileStore, MemoryStore, NavigationHistory, StoreError};

use crate::common;

#[test]
fn durable_value_outlives_the_session() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("params.json");

	{
		let mut engine = common::engine("", JsonFileStore::open(&path).unwrap());
		let handle = engine
			.mount(ComponentId(1), common::catalog(), WorkingState::new(), "catalog")
			.unwrap();
		engine.set(handle, "theme", "dark").unwrap();
	}

	let mut engine = common::engine("", JsonFileStore::open(&path).unwrap());
	let handle = engine
		.mount(ComponentId(1), common::catalog(), WorkingState::new(), "catalog")
		.unwrap();
	assert_eq!(engine.state(handle).unwrap().get("theme"), Some(&ParamValue::from("dark")));
	assert_eq!(
		engine.store().get("catalog:theme").unwrap().as_deref(),
		Some("dark")
	);
}

#[test]
fn durable_false_stays_false() {
	let policies = || PolicySet::new().with("dark", ParamPolicy::new(ParamType::Boolean).with_default(true).durable());

	let mut engine = common::engine("", MemoryStore::new());
	let handle = engine
		.mount(ComponentId(1), policies(), WorkingState::new(), "prefs")
		.unwrap();
	engine.set(handle, "dark", false).unwrap();
	let store = engine.store().clone();

	let mut fresh = common::engine("", store);
	let handle = fresh
		.mount(ComponentId(1), policies(), WorkingState::new(), "prefs")
		.unwrap();
	assert_eq!(fresh.state(handle).unwrap().get("dark"), Some(&ParamValue::Bool(false)));

	fresh.set(handle, "dark", true).unwrap();
	assert_eq!(fresh.store().get("prefs:dark").unwrap().as_deref(), Some("true"));
}

#[test]
fn navigation_value_beats_durable_value() {
	let mut store = MemoryStore::new();
	store.set("catalog:theme", "dark").unwrap();

	let mut engine = common::engine("?theme=contrast", store);
	let handle = engine
		.mount(ComponentId(1), common::catalog(), WorkingState::new(), "catalog")
		.unwrap();
	assert_eq!(engine.state(handle).unwrap().get("theme"), Some(&ParamValue::from("contrast")));
	// durable values are not part of the query
	assert_eq!(engine.history().current_query(), "?page=1");
}

#[test]
fn scopes_keep_durable_keys_apart() {
	let mut engine = common::engine("", MemoryStore::new());
	let left = engine
		.mount(ComponentId(1), common::catalog(), WorkingState::new(), "left")
		.unwrap();
	let _right = engine
		.mount(ComponentId(2), common::catalog(), WorkingState::new(), "right")
		.unwrap();
	engine.set(left, "theme", "dark").unwrap();

	assert_eq!(engine.store().get("left:theme").unwrap().as_deref(), Some("dark"));
	assert_eq!(engine.store().get("right:theme").unwrap(), None);
}

struct Unavailable;

impl DurableStore for Unavailable {
	fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
		Err(StoreError::Unavailable("quota exceeded".into()))
	}

	fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
		Err(StoreError::Unavailable("quota exceeded".into()))
	}

	fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
		Err(StoreError::Unavailable("quota exceeded".into()))
	}
}

#[test]
fn unavailable_storage_falls_back_to_defaults() {
	let mut engine = common::engine("", Unavailable);
	let handle = engine
		.mount(ComponentId(1), common::catalog(), WorkingState::new(), "catalog")
		.unwrap();
	assert_eq!(engine.state(handle).unwrap().get("theme"), Some(&ParamValue::from("light")));

	let report = engine.set(handle, "theme", "dark").unwrap();
	assert!(report.commit.is_some());
}
