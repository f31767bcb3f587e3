//! Type introspection collaborator for reflective predicates.
//!
//! The pipeline never inspects artifact bytes itself. When a predicate needs to
//! know what an artifact *is* (its attributes, interfaces or superclasses) it
//! asks a [`TypeIntrospector`] to resolve the name into a [`TypeDescriptor`].
//! Hosts supply their own introspector; [`InMemoryTypes`] covers hosts that can
//! describe their type graph up front, and tests.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

/// Kind of a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
	/// Concrete or abstract class; the only valid `Extends` target.
	Class,
	/// Interface; the only valid `Implements` target.
	Interface,
	/// Attribute (annotation) type.
	Attribute,
}

impl TypeKind {
	/// Returns a lowercase label for diagnostics.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Class => "class",
			Self::Interface => "interface",
			Self::Attribute => "attribute",
		}
	}
}

impl fmt::Display for TypeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A resolved type: its name, kind, transitive supertypes and direct attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
	name: Arc<str>,
	kind: TypeKind,
	/// Every superclass and interface reachable from this type, excluding itself.
	supertypes: Arc<[Arc<str>]>,
	attributes: Arc<[Arc<str>]>,
}

impl TypeDescriptor {
	/// Creates a descriptor. `supertypes` must already be transitively closed.
	pub fn new<S, A>(name: impl Into<Arc<str>>, kind: TypeKind, supertypes: S, attributes: A) -> Self
	where
		S: IntoIterator,
		S::Item: Into<Arc<str>>,
		A: IntoIterator,
		A::Item: Into<Arc<str>>,
	{
		Self {
			name: name.into(),
			kind,
			supertypes: supertypes.into_iter().map(Into::into).collect(),
			attributes: attributes.into_iter().map(Into::into).collect(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	/// Returns true if the type carries `attribute` directly.
	pub fn has_attribute(&self, attribute: &str) -> bool {
		self.attributes.iter().any(|a| &**a == attribute)
	}

	/// Returns true if `interface` is among the type's transitive supertypes.
	pub fn implements(&self, interface: &str) -> bool {
		self.supertypes.iter().any(|s| &**s == interface)
	}

	/// Returns true if a value of type `other` is assignable to `self`.
	///
	/// Reflexive: every type is a supertype of itself.
	pub fn is_supertype_of(&self, other: &TypeDescriptor) -> bool {
		self.name == other.name || other.supertypes.iter().any(|s| *s == self.name)
	}
}

/// Resolves artifact names to live type descriptors.
pub trait TypeIntrospector: Send + Sync {
	/// Returns the descriptor for `name`, or `None` if it cannot be resolved.
	fn resolve_type(&self, name: &str) -> Option<TypeDescriptor>;
}

impl<F> TypeIntrospector for F
where
	F: Fn(&str) -> Option<TypeDescriptor> + Send + Sync,
{
	fn resolve_type(&self, name: &str) -> Option<TypeDescriptor> {
		self(name)
	}
}

/// Declaration of a single type for [`InMemoryTypes`].
#[derive(Debug, Clone)]
pub struct TypeDecl {
	name: Arc<str>,
	kind: TypeKind,
	superclass: Option<Arc<str>>,
	interfaces: Vec<Arc<str>>,
	attributes: Vec<Arc<str>>,
}

impl TypeDecl {
	fn new(name: impl Into<Arc<str>>, kind: TypeKind) -> Self {
		Self {
			name: name.into(),
			kind,
			superclass: None,
			interfaces: Vec::new(),
			attributes: Vec::new(),
		}
	}

	pub fn class(name: impl Into<Arc<str>>) -> Self {
		Self::new(name, TypeKind::Class)
	}

	pub fn interface(name: impl Into<Arc<str>>) -> Self {
		Self::new(name, TypeKind::Interface)
	}

	pub fn attribute(name: impl Into<Arc<str>>) -> Self {
		Self::new(name, TypeKind::Attribute)
	}

	/// Sets the direct superclass.
	pub fn extends(mut self, superclass: impl Into<Arc<str>>) -> Self {
		self.superclass = Some(superclass.into());
		self
	}

	/// Adds a directly implemented (or, for interfaces, extended) interface.
	pub fn implements(mut self, interface: impl Into<Arc<str>>) -> Self {
		self.interfaces.push(interface.into());
		self
	}

	/// Adds a direct attribute.
	pub fn with_attribute(mut self, attribute: impl Into<Arc<str>>) -> Self {
		self.attributes.push(attribute.into());
		self
	}
}

/// A [`TypeIntrospector`] over a fixed set of declared types.
///
/// Supertypes that were never declared still count as supertypes by name, but
/// their own ancestry is unknown and not followed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTypes {
	decls: FxHashMap<Arc<str>, TypeDecl>,
}

impl InMemoryTypes {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a declaration.
	pub fn declare(&mut self, decl: TypeDecl) -> &mut Self {
		self.decls.insert(decl.name.clone(), decl);
		self
	}

	/// Builder-style [`Self::declare`].
	pub fn with(mut self, decl: TypeDecl) -> Self {
		self.declare(decl);
		self
	}

	pub fn len(&self) -> usize {
		self.decls.len()
	}

	pub fn is_empty(&self) -> bool {
		self.decls.is_empty()
	}

	fn direct_supertypes(decl: &TypeDecl) -> impl Iterator<Item = &Arc<str>> {
		decl.superclass.iter().chain(decl.interfaces.iter())
	}
}

impl TypeIntrospector for InMemoryTypes {
	fn resolve_type(&self, name: &str) -> Option<TypeDescriptor> {
		let decl = self.decls.get(name)?;

		let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
		let mut supertypes = Vec::new();
		let mut queue: VecDeque<&Arc<str>> = Self::direct_supertypes(decl).collect();

		while let Some(next) = queue.pop_front() {
			// Cyclic declarations must not loop or list the type as its own supertype.
			if **next == *decl.name || !seen.insert(next.clone()) {
				continue;
			}
			supertypes.push(next.clone());
			if let Some(parent) = self.decls.get(next) {
				queue.extend(Self::direct_supertypes(parent));
			}
		}

		Some(TypeDescriptor {
			name: decl.name.clone(),
			kind: decl.kind,
			supertypes: supertypes.into(),
			attributes: decl.attributes.iter().cloned().collect(),
		})
	}
}
