//! Durable key/value storage for `durable` parameters.
//!
//! Keys are `scope:name`; values are written with [`encode_durable`]. Reconciliation never fails because of storage: a failed read
//! is a miss and a failed write is skipped, both logged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tether_primitives::ParamValue;
use thiserror::Error;


/// Durable storage failure.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The backing storage refuses access, e.g. disabled or over quota.
	#[error("durable storage unavailable: {0}")]
	Unavailable(String),

	#[error("durable storage I/O failed: {0}")]
	Io(#[from] std::io::Error),

	#[error("durable storage is corrupt: {0}")]
	Json(#[from] serde_json::Error),
}

/// The durable key/value primitive.
pub trait DurableStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

	fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

	fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// No durable storage: every read misses, every write is dropped.
impl DurableStore for () {
	fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
		Ok(None)
	}

	fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
		Ok(())
	}

	fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
		Ok(())
	}
}

impl<S: DurableStore + ?Sized> DurableStore for &mut S {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		(**self).get(key)
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
		(**self).set(key, value)
	}

	fn remove(&mut self, key: &str) -> Result<(), StoreError> {
		(**self).remove(key)
	}
}

/// Process-lifetime storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	values: FxHashMap<String, String>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl DurableStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.values.get(key).cloned())
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
		self.values.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&mut self, key: &str) -> Result<(), StoreError> {
		self.values.remove(key);
		Ok(())
	}
}

/// Storage persisted as one JSON object in a file.
///
/// The file is read once at open and rewritten after every change. Writes go
/// to a sibling temporary file first and are renamed into place.
#[derive(Debug)]
pub struct JsonFileStore {
	path: PathBuf,
	values: BTreeMap<String, String>,
}

impl JsonFileStore {
	/// Opens the store at `path`. A missing file is an empty store.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
		let path = path.as_ref().to_path_buf();
		let values = match std::fs::read_to_string(&path) {
			Ok(content) if content.trim().is_empty() => BTreeMap::new(),
			Ok(content) => serde_json::from_str(&content)?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
			Err(e) => return Err(e.into()),
		};
		Ok(Self { path, values })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Puts `key` back to what it held before a change that failed to persist,
	/// so the map never runs ahead of the file.
	fn restore(&mut self, key: &str, previous: Option<String>) {
		match previous {
			Some(value) => {
				self.values.insert(key.to_string(), value);
			}
			None => {
				self.values.remove(key);
			}
		}
	}

	fn persist(&self) -> Result<(), StoreError> {
		let tmp = self.path.with_extension("tmp");
		std::fs::write(&tmp, serde_json::to_vec_pretty(&self.values)?)?;
		std::fs::rename(&tmp, &self.path)?;
		Ok(())
	}
}

impl DurableStore for JsonFileStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.values.get(key).cloned())
	}

	fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
		if self.values.get(key).is_some_and(|v| v == value) {
			return Ok(());
		}
		let previous = self.values.insert(key.to_string(), value.to_string());
		self.persist().inspect_err(|_| self.restore(key, previous))
	}

	fn remove(&mut self, key: &str) -> Result<(), StoreError> {
		let Some(previous) = self.values.remove(key) else {
			return Ok(());
		};
		self.persist()
			.inspect_err(|_| self.restore(key, Some(previous)))
	}
}

/// Encodes `value` for durable storage.
///
/// This is the canonical rendering, except that `false` is stored as the empty
/// string: boolean coercion reads `"false"` as `true`, and `""` as `false`.
pub fn encode_durable(value: &ParamValue) -> String {
	match value {
		ParamValue::Bool(false) => String::new(),
		other => other.render(),
	}
}

/// Reads `key`, treating storage failure as a miss.
pub(crate) fn read_best_effort<S: DurableStore + ?Sized>(store: &S, key: &str) -> Option<String> {
	match store.get(key) {
		Ok(value) => value,
		Err(error) => {
			tracing::warn!(key, %error, "durable read failed; treating as absent");
			None
		}
	}
}

/// Writes or clears `key`, skipping on storage failure.
pub(crate) fn write_best_effort<S: DurableStore + ?Sized>(store: &mut S, key: &str, value: Option<&str>) {
	let result = match value {
		Some(value) => store.set(key, value),
		None => store.remove(key),
	};
	if let Err(error) = result {
		tracing::warn!(key, %error, "durable write failed; skipped");
	}
}
