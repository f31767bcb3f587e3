//! Whole-name regular expressions.

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::FilterError;

bitflags::bitflags! {
	/// Compilation flags for [`NamePattern`].
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct RegexFlags: u32 {
		/// Match letters without regard to case.
		const CASE_INSENSITIVE = 1 << 0;
		/// `^` and `$` match at line boundaries inside the pattern.
		const MULTI_LINE = 1 << 1;
		/// `.` also matches `\n`.
		const DOT_MATCHES_NEW_LINE = 1 << 2;
		/// Whitespace and `#` comments in the pattern are ignored.
		const IGNORE_WHITESPACE = 1 << 3;
		/// Treat the pattern as a literal string. Every other flag except
		/// `CASE_INSENSITIVE` is ignored.
		const LITERAL = 1 << 4;
	}
}

/// A regular expression compiled once and matched against the whole name.
///
/// `NamePattern::new("a\\..*", RegexFlags::empty())` matches `a.B` but not
/// `xa.B`: the pattern is anchored at both ends regardless of flags.
#[derive(Debug, Clone)]
pub struct NamePattern {
	source: Arc<str>,
	flags: RegexFlags,
	regex: Regex,
}

impl NamePattern {
	/// Compiles `pattern` with `flags`.
	pub fn new(pattern: &str, flags: RegexFlags) -> Result<Self, FilterError> {
		let literal = flags.contains(RegexFlags::LITERAL);
		let mut builder = if literal {
			RegexBuilder::new(&format!("\\A(?:{})\\z", regex::escape(pattern)))
		} else if flags.contains(RegexFlags::IGNORE_WHITESPACE) {
			// A trailing `#` comment would swallow the closing anchor in verbose mode.
			RegexBuilder::new(&format!("\\A(?:{pattern}\n)\\z"))
		} else {
			RegexBuilder::new(&format!("\\A(?:{pattern})\\z"))
		};
		builder.case_insensitive(flags.contains(RegexFlags::CASE_INSENSITIVE));
		if !literal {
			builder
				.multi_line(flags.contains(RegexFlags::MULTI_LINE))
				.dot_matches_new_line(flags.contains(RegexFlags::DOT_MATCHES_NEW_LINE))
				.ignore_whitespace(flags.contains(RegexFlags::IGNORE_WHITESPACE));
		}

		let regex = builder
			.build()
			.map_err(|error| FilterError::InvalidPattern {
				pattern: pattern.into(),
				error,
			})?;

		Ok(Self {
			source: pattern.into(),
			flags,
			regex,
		})
	}

	/// Returns true if the pattern matches all of `name`.
	#[inline]
	pub fn matches(&self, name: &str) -> bool {
		self.regex.is_match(name)
	}

	/// Returns the pattern text as supplied.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// Returns the compilation flags.
	pub fn flags(&self) -> RegexFlags {
		self.flags
	}
}

impl fmt::Display for NamePattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.flags.is_empty() {
			write!(f, "regex({:?})", self.source)
		} else {
			write!(f, "regex({:?}, {:?})", self.source, self.flags)
		}
	}
}
