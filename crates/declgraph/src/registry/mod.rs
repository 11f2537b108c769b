//! Metadata registries.
//!
//! Plain keyed storage for everything the registration API records. No
//! compilation happens here; lookups against an owner that registered
//! nothing return empty results so lineage walks can skip it.

mod decl;

use std::hash::Hash;

use dashmap::DashMap;
use indexmap::{Equivalent, IndexMap};

pub use decl::{
    ArgDecl, EnumOptions, FieldDecl, InputFieldDecl, InputObjectTypeOptions, InterfaceTypeOptions,
    ObjectTypeOptions, Param, RootCategory, SchemaRootOptions, TypeList, UnionOptions,
};

use crate::resolver::{AfterHook, Hook, Injector};
use crate::types::{ClassRef, EnumDef, TypeKey};

/// Two-level storage: owner, then an ordered map of keys.
pub struct DeepRegistry<K, V> {
    entries: DashMap<TypeKey, IndexMap<K, V>>,
}

impl<K, V> Default for DeepRegistry<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K, V> DeepRegistry<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, owner: TypeKey, key: K, value: V) {
        self.entries.entry(owner).or_default().insert(key, value);
    }

    pub fn get<Q>(&self, owner: TypeKey, key: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries
            .get(&owner)
            .and_then(|map| map.get(key).cloned())
    }

    /// Every entry of `owner` in registration order.
    pub fn get_all(&self, owner: TypeKey) -> IndexMap<K, V> {
        self.entries
            .get(&owner)
            .map(|map| map.clone())
            .unwrap_or_default()
    }

    pub fn has<Q>(&self, owner: TypeKey, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries
            .get(&owner)
            .is_some_and(|map| map.contains_key(key))
    }

    pub fn is_empty(&self, owner: TypeKey) -> bool {
        self.entries.get(&owner).is_none_or(|map| map.is_empty())
    }

    /// Runs `f` on the owner's map while holding its entry.
    pub(crate) fn update<R>(&self, owner: TypeKey, f: impl FnOnce(&mut IndexMap<K, V>) -> R) -> R {
        let mut entry = self.entries.entry(owner).or_default();
        f(entry.value_mut())
    }
}

/// Argument-level key: property name and parameter index.
pub type ParamKey = (String, usize);

/// All registries of one session.
#[derive(Default)]
pub struct Registries {
    pub(crate) object_types: DashMap<TypeKey, ObjectTypeOptions>,
    pub(crate) input_types: DashMap<TypeKey, InputObjectTypeOptions>,
    pub(crate) fields: DeepRegistry<String, FieldDecl>,
    pub(crate) input_fields: DeepRegistry<String, InputFieldDecl>,
    pub(crate) args: DeepRegistry<ParamKey, ArgDecl>,
    pub(crate) injectors: DeepRegistry<ParamKey, Injector>,
    pub(crate) before_hooks: DeepRegistry<String, Vec<Hook>>,
    pub(crate) after_hooks: DeepRegistry<String, Vec<AfterHook>>,
    pub(crate) enums: DashMap<TypeKey, (EnumDef, EnumOptions)>,
    pub(crate) unions: DashMap<TypeKey, UnionOptions>,
    pub(crate) interfaces: DashMap<TypeKey, InterfaceTypeOptions>,
    pub(crate) implementors: DashMap<TypeKey, Vec<ClassRef>>,
    pub(crate) schema_roots: DashMap<TypeKey, SchemaRootOptions>,
}

impl Registries {
    pub fn fields(&self) -> &DeepRegistry<String, FieldDecl> {
        &self.fields
    }

    pub fn input_fields(&self) -> &DeepRegistry<String, InputFieldDecl> {
        &self.input_fields
    }

    pub fn args(&self) -> &DeepRegistry<ParamKey, ArgDecl> {
        &self.args
    }

    pub(crate) fn object_options(&self, key: TypeKey) -> Option<ObjectTypeOptions> {
        self.object_types.get(&key).map(|o| o.clone())
    }

    pub(crate) fn input_options(&self, key: TypeKey) -> Option<InputObjectTypeOptions> {
        self.input_types.get(&key).map(|o| o.clone())
    }

    pub(crate) fn union_options(&self, key: TypeKey) -> Option<UnionOptions> {
        self.unions.get(&key).map(|o| o.clone())
    }

    pub(crate) fn interface_options(&self, key: TypeKey) -> Option<InterfaceTypeOptions> {
        self.interfaces.get(&key).map(|o| o.clone())
    }

    pub(crate) fn enum_options(&self, key: TypeKey) -> Option<EnumOptions> {
        self.enums.get(&key).map(|entry| entry.1.clone())
    }

    pub(crate) fn root_options(&self, key: TypeKey) -> Option<SchemaRootOptions> {
        self.schema_roots.get(&key).map(|o| o.clone())
    }

    pub(crate) fn before_hooks(&self, owner: TypeKey, property: &str) -> Vec<Hook> {
        self.before_hooks.get(owner, property).unwrap_or_default()
    }

    pub(crate) fn after_hooks(&self, owner: TypeKey, property: &str) -> Vec<AfterHook> {
        self.after_hooks.get(owner, property).unwrap_or_default()
    }
}
