//! Component bindings and working state.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tether_primitives::ParamValue;

use crate::policy::PolicySet;

/// Identity of a mounted component, chosen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "component#{}", self.0)
	}
}

impl From<u64> for ComponentId {
	fn from(id: u64) -> Self {
		ComponentId(id)
	}
}

/// Handle returned by registration.
///
/// The generation distinguishes successive registrations of the same
/// [`ComponentId`], so a handle kept past unmount never reaches a newer binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingHandle {
	pub(crate) id: ComponentId,
	pub(crate) generation: u64,
}

impl BindingHandle {
	pub fn id(&self) -> ComponentId {
		self.id
	}
}

/// A component's locally observed parameter values.
///
/// An absent name is undefined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingState {
	values: IndexMap<String, ParamValue>,
}

impl WorkingState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<&ParamValue> {
		self.values.get(name)
	}

	/// Sets a value, returning the previous one.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
		self.values.insert(name.into(), value.into())
	}

	/// Sets or clears a value.
	pub fn assign(&mut self, name: impl Into<String>, value: Option<ParamValue>) {
		let name = name.into();
		match value {
			Some(value) => {
				self.values.insert(name, value);
			}
			None => {
				self.values.shift_remove(&name);
			}
		}
	}

	/// Makes a value undefined, returning the previous one.
	pub fn unset(&mut self, name: &str) -> Option<ParamValue> {
		self.values.shift_remove(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl<S: Into<String>, V: Into<ParamValue>> FromIterator<(S, V)> for WorkingState {
	fn from_iter<T: IntoIterator<Item = (S, V)>>(iter: T) -> Self {
		Self {
			values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}
}

/// Registry record for one mounted component.
#[derive(Debug, Clone)]
pub struct ComponentBinding {
	handle: BindingHandle,
	scope: String,
	policies: Arc<PolicySet>,
	state: WorkingState,
}

impl ComponentBinding {
	pub(crate) fn new(
		handle: BindingHandle,
		scope: String,
		policies: Arc<PolicySet>,
		state: WorkingState,
	) -> Self {
		Self {
			handle,
			scope,
			policies,
			state,
		}
	}

	pub fn handle(&self) -> BindingHandle {
		self.handle
	}

	pub fn id(&self) -> ComponentId {
		self.handle.id
	}

	/// Scope used to namespace durable keys and error messages.
	pub fn scope(&self) -> &str {
		&self.scope
	}

	pub fn policies(&self) -> &PolicySet {
		&self.policies
	}

	pub fn state(&self) -> &WorkingState {
		&self.state
	}

	pub fn state_mut(&mut self) -> &mut WorkingState {
		&mut self.state
	}

	/// Installs a new working state, returning the old one.
	pub fn replace_state(&mut self, state: WorkingState) -> WorkingState {
		std::mem::replace(&mut self.state, state)
	}

	/// Durable storage key for `name`: `scope:name`.
	pub fn durable_key(&self, name: &str) -> String {
		format!("{}:{name}", self.scope)
	}
}
