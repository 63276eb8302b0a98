//! Query-string codec.
//!
//! Values are rendered with [`ParamValue::render`] and percent-encoded with
//! `application/x-www-form-urlencoded` rules, so separators inside values
//! survive a round trip.

use url::form_urlencoded;

use crate::{ParamValue, Params};


/// Encodes `pairs` as a query string with a leading `?`.
///
/// Returns an empty string when there is nothing to encode.
pub fn encode_query<'a, I>(pairs: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a ParamValue)>,
{
	let mut serializer = form_urlencoded::Serializer::new(String::new());
	let mut any = false;
	for (name, value) in pairs {
		serializer.append_pair(name, &value.render());
		any = true;
	}
	if !any {
		return String::new();
	}
	format!("?{}", serializer.finish())
}

/// Decodes a query string into string-valued parameters.
///
/// A leading `?` is optional. When a name repeats, the first occurrence wins.
pub fn parse_query(query: &str) -> Params {
	let query = query.strip_prefix('?').unwrap_or(query);
	let mut pairs: Vec<(String, ParamValue)> = Vec::new();
	for (name, value) in form_urlencoded::parse(query.as_bytes()) {
		if pairs.iter().any(|(existing, _)| *existing == name) {
			continue;
		}
		pairs.push((name.into_owned(), ParamValue::String(value.into_owned())));
	}
	pairs.into_iter().collect()
}
