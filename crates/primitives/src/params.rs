use std::sync::Arc;

use indexmap::IndexMap;

use crate::ParamValue;


/// An immutable, cheaply cloned parameter map.
///
/// Updates go through [`Params::merged`], which produces a new map and leaves
/// every existing clone untouched. Insertion order is preserved.
#[derive(Debug, Clone, Default)]
pub struct Params(Arc<IndexMap<String, ParamValue>>);

impl Params {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<&ParamValue> {
		self.0.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Returns a new map with `changes` applied; `None` removes the name.
	///
	/// Existing names keep their position, new names are appended.
	pub fn merged<I>(&self, changes: I) -> Params
	where
		I: IntoIterator<Item = (String, Option<ParamValue>)>,
	{
		let mut next = (*self.0).clone();
		for (name, value) in changes {
			match value {
				Some(value) => {
					next.insert(name, value);
				}
				None => {
					next.shift_remove(&name);
				}
			}
		}
		Params(Arc::new(next))
	}

	/// Returns true if both maps share the same allocation.
	pub fn ptr_eq(&self, other: &Params) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl PartialEq for Params {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other) || self.0 == other.0
	}
}

impl FromIterator<(String, ParamValue)> for Params {
	fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
		Params(Arc::new(iter.into_iter().collect()))
	}
}

impl<'a> IntoIterator for &'a Params {
	type Item = (&'a String, &'a ParamValue);
	type IntoIter = indexmap::map::Iter<'a, String, ParamValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
