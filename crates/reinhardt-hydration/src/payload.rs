//! Props payload decoding.
//!
//! A payload is the JSON text the template engine wrote into the island's
//! script child or `data-rh-props` attribute. When the page was served
//! without running the engine, the text still holds Liquid syntax.

use crate::registry::Props;
use serde_json::Value;
use thiserror::Error;

/// Why a payload could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PayloadError {
	/// The payload still contains `{{` or `{%`.
	#[error("props payload contains unrendered template syntax")]
	Unresolved,
	/// The payload is not JSON.
	#[error("invalid props JSON: {0}")]
	InvalidJson(String),
	/// The payload is JSON but not an object.
	#[error("props payload is {0}, expected an object")]
	NotAnObject(&'static str),
}

/// Parses a payload into props. Blank text is an empty object.
pub fn parse_props(text: &str) -> Result<Props, PayloadError> {
	let text = text.trim();
	if text.is_empty() {
		return Ok(Props::new());
	}
	match serde_json::from_str::<Value>(text) {
		Ok(Value::Object(props)) => Ok(props),
		Ok(other) => Err(PayloadError::NotAnObject(kind(&other))),
		Err(_) if text.contains("{{") || text.contains("{%") => Err(PayloadError::Unresolved),
		Err(error) => Err(PayloadError::InvalidJson(error.to_string())),
	}
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
