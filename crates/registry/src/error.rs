use thiserror::Error;

use crate::binding::ComponentId;

/// Registry error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	/// The component is already bound.
	#[error("{id} is already registered")]
	DuplicateRegistration { id: ComponentId },

	/// The handle does not refer to a live binding.
	#[error("{id} is not registered")]
	UnknownComponent { id: ComponentId },
}
