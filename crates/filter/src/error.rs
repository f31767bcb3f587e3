//! Error types for predicate construction.

use std::sync::Arc;

use thiserror::Error;

use crate::TypeKind;

/// Errors raised while building a predicate. Evaluation itself never fails.
#[derive(Debug, Error)]
pub enum FilterError {
	/// The regular expression did not compile.
	#[error("invalid pattern {pattern:?}: {error}")]
	InvalidPattern {
		/// Pattern text as supplied by the caller.
		pattern: Arc<str>,
		/// Compiler diagnostic.
		#[source]
		error: regex::Error,
	},

	/// A reflective predicate was pointed at a type of the wrong kind, or at a
	/// type the introspector does not know.
	#[error("invalid filter target {target:?}: expected {expected}, found {}", found_label(.found))]
	InvalidFilterTarget {
		/// Name of the rejected target type.
		target: Arc<str>,
		/// Kind the predicate requires.
		expected: TypeKind,
		/// Kind the target actually has, if it resolved at all.
		found: Option<TypeKind>,
	},
}

fn found_label(found: &Option<TypeKind>) -> &'static str {
	found.map_or("an unresolvable type", TypeKind::as_str)
}
