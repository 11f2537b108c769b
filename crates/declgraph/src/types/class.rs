//! Declaration identities.
//!
//! A [`ClassRef`] plays the role a class object plays in a decorator-driven
//! system: it is the registry key every piece of metadata hangs off, it knows
//! its single parent, and instances created from it remember which class
//! produced them. An [`EnumDef`] is the equivalent identity for native
//! enumerations.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_graphql::Value;

use crate::value::Instance;

static NEXT_KEY: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(u32);

impl TypeKey {
    pub(crate) fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A class-like declaration.
///
/// Cloning is cheap and clones compare equal. Two `ClassRef`s created with the
/// same name are still distinct declarations.
#[derive(Clone)]
pub struct ClassRef(Arc<ClassIdentity>);

struct ClassIdentity {
    key: TypeKey,
    name: String,
    parent: Option<ClassRef>,
}

impl ClassRef {
    /// Declares a new class without a parent.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(ClassIdentity {
            key: TypeKey::next(),
            name: name.into(),
            parent: None,
        }))
    }

    /// Declares a new class inheriting from `parent`.
    #[must_use]
    pub fn extends(name: impl Into<String>, parent: &ClassRef) -> Self {
        Self(Arc::new(ClassIdentity {
            key: TypeKey::next(),
            name: name.into(),
            parent: Some(parent.clone()),
        }))
    }

    pub fn key(&self) -> TypeKey {
        self.0.key
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&ClassRef> {
        self.0.parent.as_ref()
    }

    /// The class followed by its ancestors, nearest first.
    pub fn lineage(&self) -> Vec<ClassRef> {
        let mut chain = vec![self.clone()];
        let mut current = self.parent();
        while let Some(parent) = current {
            chain.push(parent.clone());
            current = parent.parent();
        }
        chain
    }

    /// The root ancestor first, this class last.
    pub fn ancestors_oldest_first(&self) -> Vec<ClassRef> {
        let mut chain = self.lineage();
        chain.reverse();
        chain
    }

    /// Whether `key` is this class or one of its ancestors.
    pub fn is_a(&self, key: TypeKey) -> bool {
        self.key() == key || self.parent().is_some_and(|parent| parent.is_a(key))
    }

    /// Creates an empty instance of this class.
    #[must_use]
    pub fn instance(&self) -> Instance {
        Instance::new(self)
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ClassRef {}

impl std::hash::Hash for ClassRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassRef({}{})", self.name(), self.key())
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One member of a native enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: Value,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl EnumMember {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: None,
            deprecation_reason: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }
}

/// A native enumeration: an ordered list of named values with an identity.
#[derive(Clone)]
pub struct EnumDef(Arc<EnumDefInner>);

struct EnumDefInner {
    key: TypeKey,
    members: Vec<EnumMember>,
}

impl EnumDef {
    #[must_use]
    pub fn new(members: impl IntoIterator<Item = EnumMember>) -> Self {
        Self(Arc::new(EnumDefInner {
            key: TypeKey::next(),
            members: members.into_iter().collect(),
        }))
    }

    /// Members numbered from zero in declaration order.
    #[must_use]
    pub fn numeric<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            names
                .into_iter()
                .enumerate()
                .map(|(index, name)| EnumMember::new(name, index as i32)),
        )
    }

    /// Members carrying explicit string values.
    #[must_use]
    pub fn strings<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(name, value)| EnumMember::new(name, value)),
        )
    }

    pub fn key(&self) -> TypeKey {
        self.0.key
    }

    pub fn members(&self) -> &[EnumMember] {
        &self.0.members
    }
}

impl PartialEq for EnumDef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Debug for EnumDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDef")
            .field("key", &self.key())
            .field("members", &self.members().len())
            .finish()
    }
}
