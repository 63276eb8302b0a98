//! Side table of mounted components.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::binding::{BindingHandle, ComponentBinding, ComponentId, WorkingState};
use crate::error::RegistryError;
use crate::policy::PolicySet;


/// Maps each mounted component to its binding.
///
/// Iteration follows registration order. Callers must not depend on the
/// relative order of different components; within one component, parameters
/// are always visited in declaration order.
#[derive(Debug, Default)]
pub struct Registry {
	bindings: IndexMap<ComponentId, ComponentBinding, FxBuildHasher>,
	next_generation: u64,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds a component to its policies and initial working state.
	///
	/// # Errors
	///
	/// Returns [`RegistryError::DuplicateRegistration`] if `id` is already bound.
	pub fn register(
		&mut self,
		id: ComponentId,
		policies: impl Into<Arc<PolicySet>>,
		initial: WorkingState,
		scope: impl Into<String>,
	) -> Result<BindingHandle, RegistryError> {
		if self.bindings.contains_key(&id) {
			return Err(RegistryError::DuplicateRegistration { id });
		}
		self.next_generation += 1;
		let handle = BindingHandle {
			id,
			generation: self.next_generation,
		};
		let binding = ComponentBinding::new(handle, scope.into(), policies.into(), initial);
		tracing::debug!(
			%id,
			scope = binding.scope(),
			params = binding.policies().len(),
			"registered component"
		);
		self.bindings.insert(id, binding);
		Ok(handle)
	}

	/// Removes a binding. Stale or repeated calls are no-ops.
	pub fn unregister(&mut self, handle: BindingHandle) -> Option<ComponentBinding> {
		self.get(handle)?;
		let removed = self.bindings.shift_remove(&handle.id);
		tracing::debug!(id = %handle.id, "unregistered component");
		removed
	}

	/// Returns the live binding for `handle`.
	pub fn get(&self, handle: BindingHandle) -> Option<&ComponentBinding> {
		self.bindings
			.get(&handle.id)
			.filter(|b| b.handle().generation == handle.generation)
	}

	pub fn get_mut(&mut self, handle: BindingHandle) -> Option<&mut ComponentBinding> {
		self.bindings
			.get_mut(&handle.id)
			.filter(|b| b.handle().generation == handle.generation)
	}

	/// Like [`Registry::get_mut`] but reports a stale handle as an error.
	pub fn binding_mut(&mut self, handle: BindingHandle) -> Result<&mut ComponentBinding, RegistryError> {
		self.get_mut(handle)
			.ok_or(RegistryError::UnknownComponent { id: handle.id })
	}

	/// Looks a binding up by component identity.
	pub fn lookup(&self, id: ComponentId) -> Option<&ComponentBinding> {
		self.bindings.get(&id)
	}

	pub fn contains(&self, handle: BindingHandle) -> bool {
		self.get(handle).is_some()
	}

	pub fn iter(&self) -> impl Iterator<Item = &ComponentBinding> {
		self.bindings.values()
	}

	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}
}
