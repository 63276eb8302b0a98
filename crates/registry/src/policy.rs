//! Per-parameter synchronization policies.

use indexmap::IndexMap;
use tether_primitives::{ParamType, ParamValue, coerce_value};


/// How one parameter is synchronized.
///
/// Built with chained setters; the default is coerced to the declared type
/// as soon as it is set, so resolution never has to coerce it again.
///
/// ```
/// use tether_registry::{ParamPolicy, ParamType};
///
/// let page = ParamPolicy::new(ParamType::Number).with_default("1").url();
/// assert_eq!(page.default.as_ref().and_then(|v| v.as_number()), Some(1.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParamPolicy {
	/// Declared type; values are coerced into it on the way in.
	pub ty: ParamType,
	/// Fallback when neither the navigation entry nor durable storage has a value.
	pub default: Option<ParamValue>,
	/// Mounting fails if no source yields a usable value.
	pub required: bool,
	/// The component may not change the value; it only flows inbound.
	pub read_only: bool,
	/// Mirrored into durable storage under `scope:name`.
	pub durable: bool,
	/// Projected into the visible query string.
	pub url: bool,
	/// A change creates a new history entry instead of amending the current one.
	pub history: bool,
}

impl ParamPolicy {
	pub fn new(ty: ParamType) -> Self {
		Self {
			ty,
			default: None,
			required: false,
			read_only: false,
			durable: false,
			url: false,
			history: false,
		}
	}

	pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
		self.default = Some(coerce_value(&value.into(), self.ty));
		self
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn read_only(mut self) -> Self {
		self.read_only = true;
		self
	}

	pub fn durable(mut self) -> Self {
		self.durable = true;
		self
	}

	pub fn url(mut self) -> Self {
		self.url = true;
		self
	}

	pub fn history(mut self) -> Self {
		self.history = true;
		self
	}
}

/// The parameters one component declares, in declaration order.
///
/// Reconciliation walks parameters in this order, and URL projection emits
/// them in this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicySet {
	entries: IndexMap<String, ParamPolicy>,
}

impl PolicySet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a declaration; a replaced name keeps its position.
	pub fn with(mut self, name: impl Into<String>, policy: ParamPolicy) -> Self {
		self.insert(name, policy);
		self
	}

	/// Adds or replaces a declaration, returning the previous one.
	pub fn insert(&mut self, name: impl Into<String>, policy: ParamPolicy) -> Option<ParamPolicy> {
		let name = name.into();
		if policy.required && policy.default.is_some() {
			tracing::debug!(param = %name, "required parameter has a default and can never be missing");
		}
		self.entries.insert(name, policy)
	}

	pub fn get(&self, name: &str) -> Option<&ParamPolicy> {
		self.entries.get(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamPolicy)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<S: Into<String>> FromIterator<(S, ParamPolicy)> for PolicySet {
	fn from_iter<T: IntoIterator<Item = (S, ParamPolicy)>>(iter: T) -> Self {
		let mut set = PolicySet::new();
		for (name, policy) in iter {
			set.insert(name, policy);
		}
		set
	}
}
