//! Working state → navigation entry and durable storage.

use tether_primitives::{ParamValue, Params};
use tether_registry::ComponentBinding;

use crate::error::{Result, SyncError};
use crate::store::{DurableStore, encode_durable, write_best_effort};


/// Result of pushing one binding's working state outward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutboundOutcome {
	/// Entry changes in declaration order; `None` removes the name.
	pub changes: Vec<(String, Option<ParamValue>)>,
	/// True if any changed parameter is history-significant.
	pub history: bool,
}

impl OutboundOutcome {
	pub fn is_empty(&self) -> bool {
		self.changes.is_empty()
	}

	pub fn changed_names(&self) -> Vec<String> {
		self.changes.iter().map(|(name, _)| name.clone()).collect()
	}
}

/// Diffs `binding`'s working state against the entry's `params`.
///
/// Every declared parameter is compared. Durable parameters are then mirrored
/// into `store`, changed or not; an undefined working value removes the key.
///
/// # Errors
///
/// [`SyncError::ReadOnlyViolation`] if a read-only parameter differs from the
/// entry. Nothing is written to `store` in that case.
pub fn push_to_navigation<S>(binding: &ComponentBinding, params: &Params, store: &mut S) -> Result<OutboundOutcome>
where
	S: DurableStore + ?Sized,
{
	let state = binding.state();
	let mut outcome = OutboundOutcome::default();

	for (name, policy) in binding.policies().iter() {
		let value = state.get(name);
		if value == params.get(name) {
			continue;
		}
		if policy.read_only {
			return Err(SyncError::ReadOnlyViolation {
				scope: binding.scope().to_string(),
				name: name.to_string(),
			});
		}
		outcome.changes.push((name.to_string(), value.cloned()));
		outcome.history |= policy.history;
	}

	for (name, policy) in binding.policies().iter() {
		if !policy.durable {
			continue;
		}
		let encoded = state.get(name).map(encode_durable);
		write_best_effort(store, &binding.durable_key(name), encoded.as_deref());
	}

	if !outcome.is_empty() {
		tracing::debug!(
			scope = binding.scope(),
			changed = outcome.changes.len(),
			history = outcome.history,
			"outbound diff"
		);
	}
	Ok(outcome)
}
