//! Value-level building blocks for parameter synchronization.
//!
//! A parameter lives in several places at once: a component's working state,
//! the current navigation entry, the visible query string, and optionally a
//! durable key/value store. This crate holds what all of those agree on:
//!
//! - [`ParamValue`] and [`ParamType`], the typed value model
//! - [`coerce`], the boundary conversion from raw values to declared types
//! - [`Params`], the copy-on-write parameter map carried by navigation entries
//! - [`encode_query`] / [`parse_query`], the query-string codec

/// Boundary conversion of raw values into declared types.
pub mod coerce;
/// Copy-on-write parameter map.
pub mod params;
/// Query-string encoding and decoding.
pub mod query;
/// Typed parameter values.
pub mod value;

pub use coerce::{coerce, coerce_value};
pub use params::Params;
pub use query::{encode_query, parse_query};
pub use value::{ParamType, ParamValue};
