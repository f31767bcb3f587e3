//! The predicate enum, its constructors, combinators and evaluation.

use std::fmt;
use std::sync::Arc;

use crate::{FilterError, NamePattern, RegexFlags, TypeDescriptor, TypeIntrospector, TypeKind};

/// A pure boolean test over an artifact name.
///
/// Leaves own their data; composites share their operands through `Arc`. Once
/// built, a predicate is never modified: combinators return new predicates.
#[derive(Debug, Clone)]
pub enum Predicate {
	/// Full equality with the literal.
	Exact(Arc<str>),
	/// The name starts with the literal.
	Prefix(Arc<str>),
	/// The name ends with the literal.
	Suffix(Arc<str>),
	/// The literal occurs somewhere in the name.
	Contains(Arc<str>),
	/// Whole-name regular expression.
	Regex(NamePattern),
	/// Attribute or supertype query against the resolved type.
	Reflective(Reflective),
	/// Always true.
	All,
	/// Always false.
	Nothing,
	/// Both operands hold; short-circuits left to right.
	And(Arc<Predicate>, Arc<Predicate>),
	/// Either operand holds; short-circuits left to right.
	Or(Arc<Predicate>, Arc<Predicate>),
	/// The operand does not hold.
	Not(Arc<Predicate>),
}

impl Predicate {
	pub fn exact(name: impl Into<Arc<str>>) -> Self {
		Self::Exact(name.into())
	}

	pub fn prefix(prefix: impl Into<Arc<str>>) -> Self {
		Self::Prefix(prefix.into())
	}

	pub fn suffix(suffix: impl Into<Arc<str>>) -> Self {
		Self::Suffix(suffix.into())
	}

	pub fn contains(needle: impl Into<Arc<str>>) -> Self {
		Self::Contains(needle.into())
	}

	/// Compiles a whole-name regular expression with no flags.
	pub fn regex(pattern: &str) -> Result<Self, FilterError> {
		Self::regex_with(pattern, RegexFlags::empty())
	}

	/// Compiles a whole-name regular expression.
	pub fn regex_with(pattern: &str, flags: RegexFlags) -> Result<Self, FilterError> {
		NamePattern::new(pattern, flags).map(Self::Regex)
	}

	pub fn all() -> Self {
		Self::All
	}

	pub fn none() -> Self {
		Self::Nothing
	}

	/// Matches types carrying `attribute`.
	pub fn has_attribute(types: &Arc<dyn TypeIntrospector>, attribute: impl Into<Arc<str>>) -> Self {
		Self::Reflective(Reflective {
			query: ReflectiveQuery::HasAttribute(attribute.into()),
			expect: true,
			types: types.clone(),
		})
	}

	/// Matches resolvable types that do not carry `attribute`.
	pub fn lacks_attribute(types: &Arc<dyn TypeIntrospector>, attribute: impl Into<Arc<str>>) -> Self {
		Self::Reflective(Reflective {
			query: ReflectiveQuery::HasAttribute(attribute.into()),
			expect: false,
			types: types.clone(),
		})
	}

	/// Matches types assignable to the interface `target` (including `target` itself).
	pub fn implements(types: &Arc<dyn TypeIntrospector>, target: &str) -> Result<Self, FilterError> {
		let target = resolve_target(types.as_ref(), target, TypeKind::Interface)?;
		Ok(Self::Reflective(Reflective {
			query: ReflectiveQuery::Implements(target),
			expect: true,
			types: types.clone(),
		}))
	}

	/// Matches resolvable types not assignable to the interface `target`.
	pub fn does_not_implement(types: &Arc<dyn TypeIntrospector>, target: &str) -> Result<Self, FilterError> {
		let target = resolve_target(types.as_ref(), target, TypeKind::Interface)?;
		Ok(Self::Reflective(Reflective {
			query: ReflectiveQuery::Implements(target),
			expect: false,
			types: types.clone(),
		}))
	}

	/// Matches strict subclasses of the class `target`.
	pub fn extends(types: &Arc<dyn TypeIntrospector>, target: &str) -> Result<Self, FilterError> {
		let target = resolve_target(types.as_ref(), target, TypeKind::Class)?;
		Ok(Self::Reflective(Reflective {
			query: ReflectiveQuery::Extends(target),
			expect: true,
			types: types.clone(),
		}))
	}

	/// Matches resolvable types, other than `target` itself, that do not extend `target`.
	pub fn does_not_extend(types: &Arc<dyn TypeIntrospector>, target: &str) -> Result<Self, FilterError> {
		let target = resolve_target(types.as_ref(), target, TypeKind::Class)?;
		Ok(Self::Reflective(Reflective {
			query: ReflectiveQuery::Extends(target),
			expect: false,
			types: types.clone(),
		}))
	}

	/// Returns `self AND other`.
	pub fn and(self, other: Predicate) -> Self {
		Self::And(Arc::new(self), Arc::new(other))
	}

	/// Returns `self OR other`.
	pub fn or(self, other: Predicate) -> Self {
		Self::Or(Arc::new(self), Arc::new(other))
	}

	/// Returns `NOT self`.
	pub fn negate(self) -> Self {
		Self::Not(Arc::new(self))
	}

	/// Left fold with `or`. An empty iterator yields [`Predicate::Nothing`].
	pub fn any_of(preds: impl IntoIterator<Item = Predicate>) -> Self {
		preds
			.into_iter()
			.reduce(Predicate::or)
			.unwrap_or(Predicate::Nothing)
	}

	/// Left fold with `and`. An empty iterator yields [`Predicate::All`].
	pub fn all_of(preds: impl IntoIterator<Item = Predicate>) -> Self {
		preds
			.into_iter()
			.reduce(Predicate::and)
			.unwrap_or(Predicate::All)
	}

	/// Evaluates the predicate against `name`. Total and side-effect free.
	pub fn evaluate(&self, name: &str) -> bool {
		match self {
			Self::Exact(lit) => name == &**lit,
			Self::Prefix(lit) => name.starts_with(&**lit),
			Self::Suffix(lit) => name.ends_with(&**lit),
			Self::Contains(lit) => name.contains(&**lit),
			Self::Regex(pattern) => pattern.matches(name),
			Self::Reflective(test) => test.evaluate(name),
			Self::All => true,
			Self::Nothing => false,
			Self::And(lhs, rhs) => lhs.evaluate(name) && rhs.evaluate(name),
			Self::Or(lhs, rhs) => lhs.evaluate(name) || rhs.evaluate(name),
			Self::Not(inner) => !inner.evaluate(name),
		}
	}
}

fn resolve_target(
	types: &dyn TypeIntrospector,
	target: &str,
	expected: TypeKind,
) -> Result<TypeDescriptor, FilterError> {
	match types.resolve_type(target) {
		Some(desc) if desc.kind() == expected => Ok(desc),
		other => Err(FilterError::InvalidFilterTarget {
			target: target.into(),
			expected,
			found: other.map(|d| d.kind()),
		}),
	}
}

/// The query a reflective predicate runs against a resolved candidate.
#[derive(Debug, Clone)]
pub enum ReflectiveQuery {
	HasAttribute(Arc<str>),
	Implements(TypeDescriptor),
	Extends(TypeDescriptor),
}

/// A predicate that resolves the candidate name through a [`TypeIntrospector`].
#[derive(Clone)]
pub struct Reflective {
	query: ReflectiveQuery,
	/// Result required of the query; `false` for the `lacks`/`does_not` forms.
	expect: bool,
	types: Arc<dyn TypeIntrospector>,
}

impl Reflective {
	pub fn query(&self) -> &ReflectiveQuery {
		&self.query
	}

	/// Returns false for the negated forms (`lacks_attribute`, `does_not_*`).
	pub fn expects_match(&self) -> bool {
		self.expect
	}

	fn evaluate(&self, name: &str) -> bool {
		let Some(candidate) = self.types.resolve_type(name) else {
			return false;
		};
		let holds = match &self.query {
			ReflectiveQuery::HasAttribute(attr) => candidate.has_attribute(attr),
			ReflectiveQuery::Implements(target) => target.is_supertype_of(&candidate),
			ReflectiveQuery::Extends(target) => {
				// A type does not extend itself, in either polarity.
				if candidate.name() == target.name() {
					return false;
				}
				target.is_supertype_of(&candidate)
			}
		};
		holds == self.expect
	}
}

impl fmt::Debug for Reflective {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Reflective")
			.field("query", &self.query)
			.field("expect", &self.expect)
			.finish_non_exhaustive()
	}
}

impl fmt::Display for Reflective {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let (verb, target) = match (&self.query, self.expect) {
			(ReflectiveQuery::HasAttribute(attr), true) => ("has_attribute", &**attr),
			(ReflectiveQuery::HasAttribute(attr), false) => ("lacks_attribute", &**attr),
			(ReflectiveQuery::Implements(t), true) => ("implements", t.name()),
			(ReflectiveQuery::Implements(t), false) => ("does_not_implement", t.name()),
			(ReflectiveQuery::Extends(t), true) => ("extends", t.name()),
			(ReflectiveQuery::Extends(t), false) => ("does_not_extend", t.name()),
		};
		write!(f, "{verb}({target:?})")
	}
}

impl fmt::Display for Predicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Exact(lit) => write!(f, "exact({lit:?})"),
			Self::Prefix(lit) => write!(f, "prefix({lit:?})"),
			Self::Suffix(lit) => write!(f, "suffix({lit:?})"),
			Self::Contains(lit) => write!(f, "contains({lit:?})"),
			Self::Regex(pattern) => fmt::Display::fmt(pattern, f),
			Self::Reflective(test) => fmt::Display::fmt(test, f),
			Self::All => f.write_str("all"),
			Self::Nothing => f.write_str("none"),
			Self::And(lhs, rhs) => write!(f, "({lhs} and {rhs})"),
			Self::Or(lhs, rhs) => write!(f, "({lhs} or {rhs})"),
			Self::Not(inner) => write!(f, "not({inner})"),
		}
	}
}
