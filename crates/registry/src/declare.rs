//! TOML policy declarations.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tether_primitives::{ParamType, ParamValue};
use thiserror::Error;

use crate::policy::{ParamPolicy, PolicySet};


/// Errors that can occur when reading policy declarations.
#[derive(Debug, Error)]
pub enum PolicyConfigError {
	/// The document is not valid TOML or does not match the schema.
	#[error("invalid policy declarations: {0}")]
	Toml(#[from] toml::de::Error),

	/// A declaration file could not be read.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A default value has no parameter representation.
	#[error("unsupported default for '{name}': {kind} values cannot be parameters")]
	UnsupportedDefault {
		/// Parameter name.
		name: String,
		/// TOML type of the rejected value.
		kind: &'static str,
	},
}

/// Result type for declaration parsing.
pub type Result<T> = std::result::Result<T, PolicyConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclFile {
	scope: Option<String>,
	#[serde(default)]
	params: IndexMap<String, ParamDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ParamDecl {
	#[serde(rename = "type", default)]
	ty: ParamType,
	default: Option<toml::Value>,
	#[serde(default)]
	required: bool,
	#[serde(default)]
	read_only: bool,
	#[serde(default)]
	durable: bool,
	#[serde(default)]
	url: bool,
	#[serde(default)]
	history: bool,
}

/// A parsed declaration document: an optional scope and its policies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDeclarations {
	/// Scope named by the document, if any.
	pub scope: Option<String>,
	/// Declared policies in document order.
	pub policies: PolicySet,
}

impl PolicyDeclarations {
	/// Parses a TOML declaration document.
	pub fn parse(input: &str) -> Result<Self> {
		let file: DeclFile = toml::from_str(input)?;
		let mut policies = PolicySet::new();
		for (name, decl) in file.params {
			let policy = decl.into_policy(&name)?;
			policies.insert(name, policy);
		}
		Ok(Self {
			scope: file.scope,
			policies,
		})
	}

	/// Loads a TOML declaration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|error| PolicyConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&content)
	}
}

impl ParamDecl {
	fn into_policy(self, name: &str) -> Result<ParamPolicy> {
		let mut policy = ParamPolicy::new(self.ty);
		if let Some(raw) = self.default {
			policy = policy.with_default(toml_to_value(name, raw)?);
		}
		policy.required = self.required;
		policy.read_only = self.read_only;
		policy.durable = self.durable;
		policy.url = self.url;
		policy.history = self.history;
		Ok(policy)
	}
}

fn toml_to_value(name: &str, raw: toml::Value) -> Result<ParamValue> {
	match raw {
		toml::Value::Boolean(b) => Ok(ParamValue::Bool(b)),
		toml::Value::Integer(i) => Ok(ParamValue::Number(i as f64)),
		toml::Value::Float(f) => Ok(ParamValue::Number(f)),
		toml::Value::String(s) => Ok(ParamValue::String(s)),
		// Coerced by the policy; offset datetimes and local dates both parse.
		toml::Value::Datetime(dt) => Ok(ParamValue::String(dt.to_string())),
		other => Err(PolicyConfigError::UnsupportedDefault {
			name: name.to_string(),
			kind: other.type_str(),
		}),
	}
}
