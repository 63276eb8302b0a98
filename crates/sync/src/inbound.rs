//! Navigation → working state.

use tether_primitives::{ParamValue, coerce};
use tether_registry::{ComponentBinding, WorkingState};

use crate::error::{Result, SyncError};
use crate::history::NavigationEntry;
use crate::store::{DurableStore, read_best_effort};


/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
	Navigation,
	Durable,
	Default,
	Unset,
}

/// Result of pulling one binding's parameters from the navigation entry.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundOutcome {
	/// The binding's next working state.
	pub state: WorkingState,
	/// Parameters whose working value differs from the current one.
	pub changed: Vec<String>,
	/// Values the shared entry lacks, or holds in uncoerced form.
	///
	/// Writing these back makes first-mount defaults and durable values
	/// visible in the entry and the URL.
	pub amended: Vec<(String, ParamValue)>,
}

/// Resolves every declared parameter of `binding` against `entry`.
///
/// Precedence per parameter: navigation value, then the durable value (for
/// durable parameters only), then the policy default. The result is coerced
/// to the declared type.
///
/// The binding is not modified; the caller installs [`InboundOutcome::state`]
/// once every binding in the pass has resolved.
///
/// # Errors
///
/// [`SyncError::MissingRequiredParameter`] if a required parameter resolves
/// to nothing, `NaN`, or an invalid date.
pub fn pull_from_navigation<S>(
	binding: &ComponentBinding,
	entry: &NavigationEntry,
	store: &S,
) -> Result<InboundOutcome>
where
	S: DurableStore + ?Sized,
{
	let mut state = binding.state().clone();
	let mut changed = Vec::new();
	let mut amended = Vec::new();

	for (name, policy) in binding.policies().iter() {
		let nav = entry.params.get(name);
		let (raw, source) = match nav {
			Some(v) => (Some(v.clone()), Source::Navigation),
			None => {
				let durable = policy
					.durable
					.then(|| read_best_effort(store, &binding.durable_key(name)))
					.flatten();
				match (durable, &policy.default) {
					(Some(s), _) => (Some(ParamValue::String(s)), Source::Durable),
					(None, Some(d)) => (Some(d.clone()), Source::Default),
					(None, None) => (None, Source::Unset),
				}
			}
		};

		let value = coerce(raw.as_ref(), policy.ty);
		if policy.required && value.as_ref().is_none_or(ParamValue::is_invalid) {
			return Err(SyncError::MissingRequiredParameter {
				scope: binding.scope().to_string(),
				name: name.to_string(),
			});
		}

		tracing::trace!(
			scope = binding.scope(),
			param = name,
			?source,
			?value,
			"resolved inbound"
		);

		if state.get(name) != value.as_ref() {
			state.assign(name, value.clone());
			changed.push(name.to_string());
		}
		if let Some(value) = value
			&& nav != Some(&value)
		{
			amended.push((name.to_string(), value));
		}
	}

	Ok(InboundOutcome {
		state,
		changed,
		amended,
	})
}
