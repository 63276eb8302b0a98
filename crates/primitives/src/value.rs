use core::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};


/// Rendering of a date that failed to parse.
pub const INVALID_DATE: &str = "Invalid Date";

/// The declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
	/// Floating point number.
	Number,
	/// Text, passed through.
	String,
	/// Truthiness of the raw value.
	#[serde(alias = "bool")]
	Boolean,
	/// Point in time, UTC.
	Date,
	/// No coercion; the value is kept as found.
	#[default]
	Raw,
}

impl ParamType {
	/// Returns the lowercase name used in declarations and diagnostics.
	pub fn name(self) -> &'static str {
		match self {
			ParamType::Number => "number",
			ParamType::String => "string",
			ParamType::Boolean => "boolean",
			ParamType::Date => "date",
			ParamType::Raw => "raw",
		}
	}
}

impl fmt::Display for ParamType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A parameter value.
///
/// Undefined is never a variant: maps hold no entry and APIs use `Option`.
///
/// Equality is "same value" equality. Two `NaN` numbers are equal, and two
/// invalid dates are equal, so change detection settles on degraded values
/// instead of reporting them as changed on every pass.
#[derive(Debug, Clone)]
pub enum ParamValue {
	/// A number, possibly `NaN` after a failed parse.
	Number(f64),
	/// A boolean.
	Bool(bool),
	/// A string.
	String(String),
	/// A date; `None` is an unparseable date.
	Date(Option<DateTime<Utc>>),
}

impl ParamValue {
	/// Returns the number if this is a `Number` variant.
	pub fn as_number(&self) -> Option<f64> {
		match self {
			ParamValue::Number(n) => Some(*n),
			_ => None,
		}
	}

	/// Returns the boolean if this is a `Bool` variant.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			ParamValue::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Returns the string if this is a `String` variant.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			ParamValue::String(s) => Some(s),
			_ => None,
		}
	}

	/// Returns true for `NaN` numbers and invalid dates.
	///
	/// Such values are what coercion produces for malformed input, and count
	/// as unset when checking required parameters.
	pub fn is_invalid(&self) -> bool {
		match self {
			ParamValue::Number(n) => n.is_nan(),
			ParamValue::Date(d) => d.is_none(),
			_ => false,
		}
	}

	/// Renders the canonical string form used in query strings.
	///
	/// Coercing the rendered string back to this value's type yields an equal
	/// value, except for `false` which coerces back to `true`.
	pub fn render(&self) -> String {
		self.to_string()
	}
}

impl PartialEq for ParamValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(ParamValue::Number(a), ParamValue::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
			(ParamValue::Bool(a), ParamValue::Bool(b)) => a == b,
			(ParamValue::String(a), ParamValue::String(b)) => a == b,
			(ParamValue::Date(a), ParamValue::Date(b)) => a == b,
			_ => false,
		}
	}
}

impl fmt::Display for ParamValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ParamValue::Number(n) => write_number(f, *n),
			ParamValue::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
			ParamValue::String(s) => f.write_str(s),
			ParamValue::Date(Some(d)) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true)),
			ParamValue::Date(None) => f.write_str(INVALID_DATE),
		}
	}
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
	if n.is_nan() {
		f.write_str("NaN")
	} else if n.is_infinite() {
		f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
	} else if n == 0.0 {
		// -0 renders as 0
		f.write_str("0")
	} else {
		write!(f, "{n}")
	}
}

impl From<f64> for ParamValue {
	fn from(v: f64) -> Self {
		ParamValue::Number(v)
	}
}

impl From<i64> for ParamValue {
	fn from(v: i64) -> Self {
		ParamValue::Number(v as f64)
	}
}

impl From<i32> for ParamValue {
	fn from(v: i32) -> Self {
		ParamValue::Number(f64::from(v))
	}
}

impl From<u32> for ParamValue {
	fn from(v: u32) -> Self {
		ParamValue::Number(f64::from(v))
	}
}

impl From<bool> for ParamValue {
	fn from(v: bool) -> Self {
		ParamValue::Bool(v)
	}
}

impl From<String> for ParamValue {
	fn from(v: String) -> Self {
		ParamValue::String(v)
	}
}

impl From<&str> for ParamValue {
	fn from(v: &str) -> Self {
		ParamValue::String(v.to_string())
	}
}

impl From<DateTime<Utc>> for ParamValue {
	fn from(v: DateTime<Utc>) -> Self {
		ParamValue::Date(Some(v))
	}
}
