//! Coercion of raw values into declared parameter types.
//!
//! Coercion never fails. Malformed input degrades to `NaN` or an invalid
//! date, which callers treat as unset where it matters (required checks).
//! A hand-edited query string therefore cannot abort a reconciliation pass.
//!
//! Booleans use truthiness: only the empty string, `0`, `NaN` and `false`
//! are false. In particular the string `"false"` coerces to `true`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{ParamType, ParamValue};


/// Coerces an optional value; undefined passes through unchanged.
pub fn coerce(value: Option<&ParamValue>, ty: ParamType) -> Option<ParamValue> {
	value.map(|v| coerce_value(v, ty))
}

/// Coerces a value into `ty`.
pub fn coerce_value(value: &ParamValue, ty: ParamType) -> ParamValue {
	match ty {
		ParamType::Number => ParamValue::Number(to_number(value)),
		ParamType::Boolean => ParamValue::Bool(to_bool(value)),
		ParamType::String => ParamValue::String(to_text(value)),
		ParamType::Date => ParamValue::Date(to_date(value)),
		ParamType::Raw => value.clone(),
	}
}

fn to_number(value: &ParamValue) -> f64 {
	match value {
		ParamValue::Number(n) => *n,
		ParamValue::Bool(b) => f64::from(u8::from(*b)),
		ParamValue::String(s) => parse_number(s),
		ParamValue::Date(Some(d)) => d.timestamp_millis() as f64,
		ParamValue::Date(None) => f64::NAN,
	}
}

fn to_bool(value: &ParamValue) -> bool {
	match value {
		ParamValue::Number(n) => *n != 0.0 && !n.is_nan(),
		ParamValue::Bool(b) => *b,
		ParamValue::String(s) => !s.is_empty(),
		ParamValue::Date(_) => true,
	}
}

fn to_text(value: &ParamValue) -> String {
	match value {
		ParamValue::String(s) => s.clone(),
		other => other.render(),
	}
}

fn to_date(value: &ParamValue) -> Option<DateTime<Utc>> {
	match value {
		ParamValue::Date(d) => *d,
		ParamValue::Number(n) => from_millis(*n),
		ParamValue::Bool(b) => DateTime::from_timestamp_millis(i64::from(*b)),
		ParamValue::String(s) => parse_date(s),
	}
}

/// Parses a number the way query-string values are read.
///
/// Surrounding whitespace is ignored and an empty string is `0`. Integer
/// literals with `0x`, `0o` and `0b` prefixes are accepted. Anything else
/// that is not a decimal literal or `Infinity` is `NaN`.
pub fn parse_number(input: &str) -> f64 {
	let s = input.trim();
	if s.is_empty() {
		return 0.0;
	}
	match s {
		"Infinity" | "+Infinity" => return f64::INFINITY,
		"-Infinity" => return f64::NEG_INFINITY,
		_ => {}
	}
	for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
		if let Some(digits) = s.strip_prefix(prefix) {
			return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
		}
	}
	// f64's parser also takes "inf" and "nan", which are not number literals here.
	if s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
		return f64::NAN;
	}
	s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Parses a date from RFC 3339, `YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM[:SS[.fff]]`.
///
/// Forms without an offset are read as UTC. Years outside `0000..=9999`
/// carry a sign, as in `+10000-01-01T00:00:00.000Z`.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
	let s = input.trim();
	if let Ok(d) = DateTime::parse_from_rfc3339(s) {
		return Some(d.with_timezone(&Utc));
	}
	if let Ok(d) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%:z") {
		return Some(d.with_timezone(&Utc));
	}
	let s = s.strip_suffix('Z').unwrap_or(s);
	if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
		return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
	}
	["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
		.iter()
		.find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
		.map(|dt| dt.and_utc())
}

fn from_millis(n: f64) -> Option<DateTime<Utc>> {
	if !n.is_finite() {
		return None;
	}
	DateTime::from_timestamp_millis(n.trunc() as i64)
}
