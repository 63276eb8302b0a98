#![cfg_attr(test, allow(unused_crate_dependencies))]

//! Bidirectional parameter synchronization.
//!
//! A [`SyncEngine`] keeps four places in agreement for every parameter a
//! mounted component declares: the component's working state, the current
//! navigation-history entry, the visible query string, and durable storage.
//!
//! - Inbound ([`inbound`]): on mount and on back/forward, values flow from the
//!   entry (falling back to durable storage, then the policy default) into
//!   working state. Values the entry lacked are written back with a replace
//!   commit.
//! - Outbound ([`outbound`]): when a component changes its working state, the
//!   difference is committed to the entry, pushing a new history entry only
//!   for history-significant parameters. Durable parameters are mirrored.
//! - Projection ([`projection`]): the url-visible part of the entry becomes
//!   the query string.
//!
//! ```
//! use tether_registry::{ComponentId, ParamPolicy, ParamType, PolicySet, WorkingState};
//! use tether_sync::{CommitMode, MemoryHistory, NavigationHistory, SyncEngine};
//!
//! let mut engine = SyncEngine::new(MemoryHistory::from_url("/list", ""), ());
//! let policies = PolicySet::new().with("page", ParamPolicy::new(ParamType::Number).with_default(1).url());
//! let list = engine.mount(ComponentId(1), policies, WorkingState::new(), "list")?;
//! assert_eq!(engine.history().current_query(), "?page=1");
//!
//! let report = engine.set(list, "page", 2)?;
//! assert_eq!(report.commit, Some(CommitMode::Replace));
//! assert_eq!(engine.history().current_query(), "?page=2");
//! assert_eq!(engine.history().len(), 1);
//! # Ok::<(), tether_sync::SyncError>(())
//! ```

pub mod engine;
pub mod error;
pub mod event;
pub mod history;
pub mod inbound;
pub mod outbound;
pub mod projection;
pub mod scheduler;
pub mod store;

pub use engine::{PassReport, SyncEngine};
pub use error::{Result, SyncError};
pub use event::{ListenerId, SyncEvent, TriggerKind};
pub use history::{CommitMode, EntryVersion, MemoryHistory, NavigationEntry, NavigationHistory, Route};
pub use scheduler::{Scheduler, Trigger};
pub use store::{DurableStore, JsonFileStore, MemoryStore, StoreError, encode_durable};
