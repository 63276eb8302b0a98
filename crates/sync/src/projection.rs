//! Visible query string derived from the navigation entry.

use rustc_hash::FxHashSet;
use tether_primitives::{Params, encode_query};
use tether_registry::ComponentBinding;


/// Projects the url-visible parameters of `params` into a query string.
///
/// A name is url-visible if any binding declares it with `url`. Keys are
/// ordered by binding, then by declaration; a name shared by several bindings
/// appears once, at its first url-visible declaration. Undefined values are
/// omitted. Returns an empty string when nothing is visible.
pub fn project<'a, I>(bindings: I, params: &Params) -> String
where
	I: IntoIterator<Item = &'a ComponentBinding>,
{
	let mut seen = FxHashSet::default();
	let mut pairs = Vec::new();
	for binding in bindings {
		for (name, policy) in binding.policies().iter() {
			if !policy.url || !seen.insert(name) {
				continue;
			}
			if let Some(value) = params.get(name) {
				pairs.push((name, value));
			}
		}
	}
	encode_query(pairs)
}
