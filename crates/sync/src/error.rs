use tether_registry::RegistryError;
use thiserror::Error;

/// Errors surfaced by reconciliation and the convergence loop.
///
/// None are retried. Each propagates to the caller of the operation that
/// triggered it, which decides whether to recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
	/// No source yielded a usable value for a required parameter.
	///
	/// Fatal to the mount that hit it.
	#[error("{name} is a required parameter of '{scope}'")]
	MissingRequiredParameter { scope: String, name: String },

	/// The component changed a parameter it may only read.
	///
	/// Fatal to the outbound pass; the shared entry is left unchanged.
	#[error("{name} is read-only in '{scope}'")]
	ReadOnlyViolation { scope: String, name: String },

	#[error(transparent)]
	Registry(#[from] RegistryError),
}

/// Result type for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;
