//! Navigation entries and the history collaborator.

use tether_primitives::{Params, parse_query};


/// Monotonic stamp carried by every committed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntryVersion(pub u64);

/// Opaque route identity. Never read or changed by synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Route(pub String);

impl From<&str> for Route {
	fn from(route: &str) -> Self {
		Route(route.to_string())
	}
}

impl From<String> for Route {
	fn from(route: String) -> Self {
		Route(route)
	}
}

/// One navigation-history record.
///
/// `params` is a single namespace shared by every mounted component. Entries
/// are values: the convergence loop builds a new entry and commits it whole,
/// it never edits the current one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationEntry {
	pub route: Route,
	pub params: Params,
	pub version: EntryVersion,
}

impl NavigationEntry {
	pub fn new(route: impl Into<Route>, params: Params) -> Self {
		Self {
			route: route.into(),
			params,
			version: EntryVersion::default(),
		}
	}

	/// Builds the entry for a page loaded from a URL with `query`.
	///
	/// Values arrive as strings; the inbound pass coerces them.
	pub fn from_query(route: impl Into<Route>, query: &str) -> Self {
		Self::new(route, parse_query(query))
	}
}

/// Whether a commit creates a new history entry or amends the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitMode {
	Push,
	Replace,
}

/// The navigation-history primitive.
///
/// The host also signals back/forward traversal, by calling
/// [`SyncEngine::navigated`](crate::SyncEngine::navigated). Committing
/// an entry must not itself produce that signal.
pub trait NavigationHistory {
	/// Returns the current entry.
	fn current_entry(&self) -> NavigationEntry;

	/// Returns the query string currently shown, with its leading `?`.
	fn current_query(&self) -> String;

	/// Pushes or replaces the current entry, showing `query` in the URL.
	fn commit_entry(&mut self, entry: NavigationEntry, mode: CommitMode, query: &str);
}

/// In-process navigation history with back/forward traversal.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
	entries: Vec<(NavigationEntry, String)>,
	cursor: usize,
	commits: usize,
}

impl MemoryHistory {
	/// Starts a history whose only entry is `entry`, shown with `query`.
	pub fn new(entry: NavigationEntry, query: impl Into<String>) -> Self {
		Self {
			entries: vec![(entry, query.into())],
			cursor: 0,
			commits: 0,
		}
	}

	/// Starts a history as if the page had been loaded with `query`.
	pub fn from_url(route: impl Into<Route>, query: &str) -> Self {
		Self::new(NavigationEntry::from_query(route, query), query)
	}

	/// Moves one entry back. Returns false at the oldest entry.
	pub fn back(&mut self) -> bool {
		self.go(-1)
	}

	/// Moves one entry forward. Returns false at the newest entry.
	pub fn forward(&mut self) -> bool {
		self.go(1)
	}

	/// Moves `delta` entries; out-of-range moves do nothing.
	pub fn go(&mut self, delta: isize) -> bool {
		match self.cursor.checked_add_signed(delta) {
			Some(next) if next < self.entries.len() && delta != 0 => {
				self.cursor = next;
				true
			}
			_ => false,
		}
	}

	/// Number of entries, including forward entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Index of the current entry.
	pub fn position(&self) -> usize {
		self.cursor
	}

	/// Number of commits received, push or replace.
	pub fn commits(&self) -> usize {
		self.commits
	}
}

impl NavigationHistory for MemoryHistory {
	fn current_entry(&self) -> NavigationEntry {
		self.entries[self.cursor].0.clone()
	}

	fn current_query(&self) -> String {
		self.entries[self.cursor].1.clone()
	}

	fn commit_entry(&mut self, entry: NavigationEntry, mode: CommitMode, query: &str) {
		self.commits += 1;
		match mode {
			CommitMode::Push => {
				self.entries.truncate(self.cursor + 1);
				self.entries.push((entry, query.to_string()));
				self.cursor += 1;
			}
			CommitMode::Replace => {
				self.entries[self.cursor] = (entry, query.to_string());
			}
		}
	}
}
