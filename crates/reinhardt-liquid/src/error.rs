//! Compile-time errors.

use thiserror::Error;

/// Errors raised while lowering a view tree to Liquid or HTML.
///
/// The renderer refuses to produce output from invalid names rather than
/// emitting a template the engine would reject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CompileError {
	/// A loop binding, prop key or component name is not a valid identifier.
	#[error("invalid {kind} '{name}'")]
	InvalidIdentifier {
		/// What the name was used for.
		kind: &'static str,
		/// The offending name.
		name: String,
	},

	/// A variable path cannot be written into a Liquid tag.
	#[error("invalid variable path '{0}'")]
	InvalidPath(String),

	/// A compile unit has no component to render.
	#[error("unit '{0}' does not export a component")]
	MissingExport(String),

	/// A declarative prop mapping could not be read.
	#[error("invalid prop mapping: {0}")]
	InvalidMapping(String),
}

/// Result alias for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;
