//! Compilation sessions and the registration API.
//!
//! A [`Session`] owns the registries and the compiled-node caches. All
//! declarations are registered through it, and every compilation entry point
//! is a method on it. Sessions are independent of each other; dropping one
//! drops everything it compiled.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use crate::config::CompilerConfig;
use crate::error::{CompileError, RegistrationError, Result};
use crate::graph::{EnumNode, InputNode, InterfaceNode, ObjectNode, UnionNode};
use crate::registry::{
    ArgDecl, EnumOptions, FieldDecl, InputFieldDecl, InputObjectTypeOptions, InterfaceTypeOptions,
    ObjectTypeOptions, Registries, RootCategory, SchemaRootOptions, UnionOptions,
};
use crate::resolver::{AfterHook, Hook, Injector};
use crate::types::{ClassRef, EnumDef, TypeKey};

/// Compiled nodes, one per originating declaration.
#[derive(Default)]
pub(crate) struct NodeCache {
    pub(crate) objects: DashMap<TypeKey, Arc<ObjectNode>>,
    pub(crate) inputs: DashMap<TypeKey, Arc<InputNode>>,
    pub(crate) enums: DashMap<TypeKey, Arc<EnumNode>>,
    pub(crate) unions: DashMap<TypeKey, Arc<UnionNode>>,
    pub(crate) interfaces: DashMap<TypeKey, Arc<InterfaceNode>>,
}

// Evaluated field maps are released once the last owner of the cache is
// gone: the session, a compiled schema, or an executable schema built from it.
impl Drop for NodeCache {
    fn drop(&mut self) {
        for node in self.objects.iter() {
            node.fields.release();
        }
        for node in self.interfaces.iter() {
            node.fields.release();
        }
        for node in self.inputs.iter() {
            node.fields.release();
        }
    }
}

pub(crate) struct SessionInner {
    registries: Registries,
    cache: Arc<NodeCache>,
    config: CompilerConfig,
}

/// A compilation context: registries plus compiled-node caches.
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

/// A non-owning handle held by lazily compiled nodes.
#[derive(Clone)]
pub(crate) struct WeakSession(Weak<SessionInner>);

impl WeakSession {
    pub(crate) fn upgrade(&self) -> Result<Session> {
        self.0
            .upgrade()
            .map(|inner| Session { inner })
            .ok_or(CompileError::SessionDropped)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CompilerConfig::default())
    }

    #[must_use]
    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                registries: Registries::default(),
                cache: Arc::default(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.inner.config
    }

    pub fn registries(&self) -> &Registries {
        &self.inner.registries
    }

    pub(crate) fn cache(&self) -> &NodeCache {
        &self.inner.cache
    }

    /// A shared handle keeping compiled nodes alive past the session.
    pub(crate) fn cache_handle(&self) -> Arc<NodeCache> {
        self.inner.cache.clone()
    }

    pub(crate) fn downgrade(&self) -> WeakSession {
        WeakSession(Arc::downgrade(&self.inner))
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Registers `class` as an output object type.
    pub fn object_type(&self, class: &ClassRef, options: ObjectTypeOptions) {
        for interface in &options.implements {
            let mut implementors = self
                .inner
                .registries
                .implementors
                .entry(interface.key())
                .or_default();
            if !implementors.contains(class) {
                implementors.push(class.clone());
            }
        }
        trace!(class = %class, "registered object type");
        self.inner
            .registries
            .object_types
            .insert(class.key(), options);
    }

    /// Registers `class` as an input object type.
    pub fn input_object_type(&self, class: &ClassRef, options: InputObjectTypeOptions) {
        trace!(class = %class, "registered input type");
        self.inner
            .registries
            .input_types
            .insert(class.key(), options);
    }

    /// Registers `class` both as an object type and as an input type named
    /// `<name>Input`.
    pub fn duplex_object_type(&self, class: &ClassRef, options: ObjectTypeOptions) {
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| class.name().to_string());
        let input = InputObjectTypeOptions {
            name: Some(format!("{name}Input")),
            description: options.description.clone(),
        };
        self.object_type(class, options);
        self.input_object_type(class, input);
    }

    pub fn interface_type(&self, class: &ClassRef, options: InterfaceTypeOptions) {
        trace!(class = %class, "registered interface type");
        self.inner
            .registries
            .interfaces
            .insert(class.key(), options);
    }

    /// Declares `class` as a union over the members in `options`.
    pub fn union_type(&self, class: &ClassRef, options: UnionOptions) {
        trace!(class = %class, "registered union type");
        self.inner.registries.unions.insert(class.key(), options);
    }

    /// Registers a native enumeration.
    ///
    /// # Errors
    ///
    /// Returns an error if `def` is already registered in this session.
    pub fn register_enum(&self, def: &EnumDef, options: impl Into<EnumOptions>) -> Result<()> {
        let options = options.into();
        match self.inner.registries.enums.entry(def.key()) {
            Entry::Occupied(existing) => Err(RegistrationError::DuplicateEnum {
                name: existing.get().1.name.clone(),
            }
            .into()),
            Entry::Vacant(slot) => {
                trace!(name = %options.name, "registered enum");
                slot.insert((def.clone(), options));
                Ok(())
            }
        }
    }

    pub fn schema_root(&self, class: &ClassRef, options: SchemaRootOptions) {
        trace!(class = %class, "registered schema root");
        self.inner
            .registries
            .schema_roots
            .insert(class.key(), options);
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    /// Registers an output field on `class`.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is already registered, unless one
    /// registration is a query and the other a mutation.
    pub fn field(&self, class: &ClassRef, field: FieldDecl) -> Result<()> {
        let property = field.property.clone();
        self.inner
            .registries
            .fields
            .update(class.key(), |fields| -> Result<()> {
                if let Some(existing) = fields.get_mut(&property) {
                    let merged = RootCategory::merge(existing.root_category, field.root_category)
                        .ok_or_else(|| RegistrationError::DuplicateField {
                            class: class.name().to_string(),
                            field: property.clone(),
                        })?;
                    existing.root_category = Some(merged);
                    return Ok(());
                }
                fields.insert(property.clone(), field);
                Ok(())
            })?;
        trace!(class = %class, field = %property, "registered field");
        Ok(())
    }

    /// Registers a field of an input type.
    pub fn input_field(&self, class: &ClassRef, field: InputFieldDecl) {
        trace!(class = %class, field = %field.property, "registered input field");
        self.inner
            .registries
            .input_fields
            .set(class.key(), field.property.clone(), field);
    }

    /// Registers a field on both the output and input side of a duplex type.
    /// Both sides are nullable unless `nullable` was set.
    ///
    /// # Errors
    ///
    /// Returns an error if the output field is already registered.
    pub fn duplex_field(&self, class: &ClassRef, mut field: FieldDecl) -> Result<()> {
        field.nullable = Some(field.nullable.unwrap_or(true));
        self.input_field(class, InputFieldDecl::from(&field));
        self.field(class, field)
    }

    /// Registers a query field on a schema root.
    ///
    /// # Errors
    ///
    /// Returns an error if the field has no method implementation or is
    /// already registered as a query.
    pub fn query(&self, root: &ClassRef, field: FieldDecl) -> Result<()> {
        self.root_field(root, field, RootCategory::Query)
    }

    /// Registers a mutation field on a schema root.
    ///
    /// # Errors
    ///
    /// Returns an error if the field has no method implementation or is
    /// already registered as a mutation.
    pub fn mutation(&self, root: &ClassRef, field: FieldDecl) -> Result<()> {
        self.root_field(root, field, RootCategory::Mutation)
    }

    /// Registers a field exposed under both roots.
    ///
    /// # Errors
    ///
    /// Returns an error if the field has no method implementation or is
    /// already registered.
    pub fn query_and_mutation(&self, root: &ClassRef, field: FieldDecl) -> Result<()> {
        self.root_field(root, field, RootCategory::Both)
    }

    fn root_field(&self, root: &ClassRef, mut field: FieldDecl, category: RootCategory) -> Result<()> {
        if field.implementation.is_none() {
            return Err(RegistrationError::RootFieldNotMethod {
                class: root.name().to_string(),
                field: field.property,
            }
            .into());
        }
        field.root_category = Some(category);
        self.field(root, field)
    }

    /// Attaches argument metadata to parameter `index` of `field`.
    pub fn arg(&self, class: &ClassRef, field: &str, index: usize, arg: ArgDecl) {
        self.inner
            .registries
            .args
            .set(class.key(), (field.to_string(), index), arg);
    }

    /// Supplies parameter `index` of `field` from an injector instead of the caller.
    pub fn inject(&self, class: &ClassRef, field: &str, index: usize, injector: Injector) {
        self.inner
            .registries
            .injectors
            .set(class.key(), (field.to_string(), index), injector);
    }

    pub fn before(&self, class: &ClassRef, field: &str, hook: Hook) {
        self.inner
            .registries
            .before_hooks
            .update(class.key(), |hooks| {
                hooks.entry(field.to_string()).or_default().push(hook);
            });
    }

    pub fn after(&self, class: &ClassRef, field: &str, hook: AfterHook) {
        self.inner
            .registries
            .after_hooks
            .update(class.key(), |hooks| {
                hooks.entry(field.to_string()).or_default().push(hook);
            });
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn is_object_type(&self, key: TypeKey) -> bool {
        self.inner.registries.object_types.contains_key(&key)
    }

    pub fn is_input_type(&self, key: TypeKey) -> bool {
        self.inner.registries.input_types.contains_key(&key)
    }

    pub fn is_union(&self, key: TypeKey) -> bool {
        self.inner.registries.unions.contains_key(&key)
    }

    pub fn is_interface(&self, key: TypeKey) -> bool {
        self.inner.registries.interfaces.contains_key(&key)
    }

    pub fn is_schema_root(&self, key: TypeKey) -> bool {
        self.inner.registries.schema_roots.contains_key(&key)
    }

    /// Registered implementors of an interface, in registration order.
    pub fn implementors_of(&self, interface: &ClassRef) -> Vec<ClassRef> {
        self.inner
            .registries
            .implementors
            .get(&interface.key())
            .map(|classes| classes.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Method;
    use crate::value::RuntimeValue;

    fn noop() -> Method {
        Method::sync(|_, _| Ok(RuntimeValue::Null))
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let session = Session::new();
        let foo = ClassRef::new("Foo");
        session.field(&foo, FieldDecl::property("bar")).unwrap();

        let err = session.field(&foo, FieldDecl::property("bar")).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Registration(RegistrationError::DuplicateField { .. })
        ));
        assert_eq!(err.to_string(), "Field Foo.bar is already registered");
    }

    #[test]
    fn test_query_then_mutation_is_dual() {
        let session = Session::new();
        let root = ClassRef::new("Root");
        session.query(&root, FieldDecl::method("ping", noop())).unwrap();
        session.mutation(&root, FieldDecl::method("ping", noop())).unwrap();

        let field = session.registries().fields().get(root.key(), "ping").unwrap();
        assert_eq!(field.root_category, Some(RootCategory::Both));

        assert!(session.query(&root, FieldDecl::method("ping", noop())).is_err());
    }

    #[test]
    fn test_same_category_twice_rejected() {
        let session = Session::new();
        let root = ClassRef::new("Root");
        session.query(&root, FieldDecl::method("ping", noop())).unwrap();
        assert!(session.query(&root, FieldDecl::method("ping", noop())).is_err());
    }

    #[test]
    fn test_root_field_requires_method() {
        let session = Session::new();
        let root = ClassRef::new("Root");
        let err = session.query(&root, FieldDecl::property("ping")).unwrap_err();
        assert!(err.to_string().starts_with("Every root schema field must be a method"));
    }

    #[test]
    fn test_enum_registered_once() {
        let session = Session::new();
        let def = EnumDef::numeric(["A", "B"]);
        session.register_enum(&def, "Letter").unwrap();
        assert!(session.register_enum(&def, "Letter").is_err());

        // A separate session has its own registries.
        assert!(Session::new().register_enum(&def, "Letter").is_ok());
    }

    #[test]
    fn test_implementors_recorded() {
        let session = Session::new();
        let node = ClassRef::new("Node");
        let user = ClassRef::new("User");
        session.interface_type(&node, InterfaceTypeOptions::new());
        session.object_type(&user, ObjectTypeOptions::new().implements(&node));
        session.object_type(&user, ObjectTypeOptions::new().implements(&node));

        assert_eq!(session.implementors_of(&node), vec![user]);
    }

    #[test]
    fn test_duplex_type_names() {
        let session = Session::new();
        let point = ClassRef::new("Point");
        session.duplex_object_type(&point, ObjectTypeOptions::new());
        session
            .duplex_field(&point, FieldDecl::property("x").ty(crate::types::RuntimeType::int()))
            .unwrap();

        let input = session.registries().input_options(point.key()).unwrap();
        assert_eq!(input.name.as_deref(), Some("PointInput"));
        let field = session.registries().input_fields().get(point.key(), "x").unwrap();
        assert_eq!(field.nullable, Some(true));
    }
}
