//! Declaration records stored in the registries.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;

use crate::resolver::{DiscriminateFn, Method, RequestContext, ResolveInfo};
use crate::types::{ClassRef, RuntimeType, TypeSignature};
use crate::value::{Instance, RuntimeValue};

/// Which root operation a field is exposed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootCategory {
    Query,
    Mutation,
    Both,
}

impl RootCategory {
    /// Combines a new registration with an existing one. Only a query and a
    /// mutation registration combine; anything else is a duplicate.
    pub fn merge(existing: Option<Self>, incoming: Option<Self>) -> Option<Self> {
        match (existing, incoming) {
            (Some(Self::Query), Some(Self::Mutation)) | (Some(Self::Mutation), Some(Self::Query)) => {
                Some(Self::Both)
            }
            _ => None,
        }
    }

    pub fn is_query(self) -> bool {
        matches!(self, Self::Query | Self::Both)
    }

    pub fn is_mutation(self) -> bool {
        matches!(self, Self::Mutation | Self::Both)
    }
}

/// A method parameter as declared.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub signature: Option<TypeSignature>,
}

/// An output field declaration.
#[derive(Clone)]
pub struct FieldDecl {
    pub property: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub ty: Option<RuntimeType>,
    pub nullable: Option<bool>,
    pub item_nullable: bool,
    pub deprecation_reason: Option<String>,
    pub root_category: Option<RootCategory>,
    pub only_decorated_args: bool,
    pub params: Vec<Param>,
    pub returns: Option<TypeSignature>,
    pub implementation: Option<Method>,
}

impl FieldDecl {
    /// A field read from a property of the source value.
    #[must_use]
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            property: name.into(),
            name: None,
            description: None,
            ty: None,
            nullable: None,
            item_nullable: false,
            deprecation_reason: None,
            root_category: None,
            only_decorated_args: false,
            params: Vec::new(),
            returns: None,
            implementation: None,
        }
    }

    /// A field computed by a method.
    #[must_use]
    pub fn method(name: impl Into<String>, implementation: Method) -> Self {
        Self {
            implementation: Some(implementation),
            ..Self::property(name)
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, signature: TypeSignature) -> Self {
        self.params.push(Param {
            name: name.into(),
            signature: Some(signature),
        });
        self
    }

    /// A parameter without a static signature; it needs explicit arg metadata.
    #[must_use]
    pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            signature: None,
        });
        self
    }

    /// The static type of the property, or the method's return type.
    #[must_use]
    pub fn returns(mut self, signature: TypeSignature) -> Self {
        self.returns = Some(signature);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn ty(mut self, ty: impl Into<RuntimeType>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    #[must_use]
    pub fn item_nullable(mut self) -> Self {
        self.item_nullable = true;
        self
    }

    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    /// Only parameters with registered arg metadata become arguments.
    #[must_use]
    pub fn only_decorated_args(mut self) -> Self {
        self.only_decorated_args = true;
        self
    }

    pub fn exposed_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.property)
    }
}

impl fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("property", &self.property)
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("nullable", &self.nullable)
            .field("root_category", &self.root_category)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Metadata for one method parameter.
#[derive(Debug, Clone, Default)]
pub struct ArgDecl {
    /// Exposed name; defaults to the parameter name.
    pub name: Option<String>,
    pub ty: Option<RuntimeType>,
    pub nullable: bool,
    pub description: Option<String>,
    pub default_value: Option<Value>,
}

impl ArgDecl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn ty(mut self, ty: impl Into<RuntimeType>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// A field of an input object type.
#[derive(Debug, Clone)]
pub struct InputFieldDecl {
    pub property: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub ty: Option<RuntimeType>,
    pub nullable: Option<bool>,
    pub item_nullable: bool,
    pub signature: Option<TypeSignature>,
    pub default_value: Option<Value>,
    pub deprecation_reason: Option<String>,
}

impl InputFieldDecl {
    #[must_use]
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            name: None,
            description: None,
            ty: None,
            nullable: None,
            item_nullable: false,
            signature: None,
            default_value: None,
            deprecation_reason: None,
        }
    }

    #[must_use]
    pub fn signature(mut self, signature: TypeSignature) -> Self {
        self.signature = Some(signature);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn ty(mut self, ty: impl Into<RuntimeType>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    #[must_use]
    pub fn item_nullable(mut self) -> Self {
        self.item_nullable = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    pub fn exposed_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.property)
    }
}

impl From<&FieldDecl> for InputFieldDecl {
    fn from(field: &FieldDecl) -> Self {
        Self {
            property: field.property.clone(),
            name: field.name.clone(),
            description: field.description.clone(),
            ty: field.ty.clone(),
            nullable: field.nullable,
            item_nullable: field.item_nullable,
            signature: field.returns.clone(),
            default_value: None,
            deprecation_reason: field.deprecation_reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectTypeOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Classes whose fields are merged in, without any identity relationship.
    pub mixins: Vec<ClassRef>,
    pub implements: Vec<ClassRef>,
}

impl ObjectTypeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn mixin(mut self, class: &ClassRef) -> Self {
        self.mixins.push(class.clone());
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: &ClassRef) -> Self {
        self.implements.push(interface.clone());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputObjectTypeOptions {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl InputObjectTypeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Union members, possibly deferred.
#[derive(Clone)]
pub enum TypeList {
    Classes(Vec<ClassRef>),
    Thunk(Arc<dyn Fn() -> Vec<ClassRef> + Send + Sync>),
}

impl TypeList {
    pub fn resolve(&self) -> Vec<ClassRef> {
        match self {
            Self::Classes(classes) => classes.clone(),
            Self::Thunk(f) => f(),
        }
    }
}

impl Default for TypeList {
    fn default() -> Self {
        Self::Classes(Vec::new())
    }
}

impl fmt::Debug for TypeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classes(classes) => f.debug_list().entries(classes).finish(),
            Self::Thunk(_) => f.write_str("<thunk>"),
        }
    }
}

#[derive(Clone, Default)]
pub struct UnionOptions {
    pub types: TypeList,
    pub name: Option<String>,
    pub description: Option<String>,
    pub resolve_type: Option<DiscriminateFn>,
}

impl UnionOptions {
    #[must_use]
    pub fn new(types: impl IntoIterator<Item = ClassRef>) -> Self {
        Self {
            types: TypeList::Classes(types.into_iter().collect()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn deferred(types: impl Fn() -> Vec<ClassRef> + Send + Sync + 'static) -> Self {
        Self {
            types: TypeList::Thunk(Arc::new(types)),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&RuntimeValue, Option<&RequestContext>, &ResolveInfo) -> Option<RuntimeType>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for UnionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionOptions")
            .field("types", &self.types)
            .field("name", &self.name)
            .field("custom_resolver", &self.resolve_type.is_some())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct InterfaceTypeOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub resolve_type: Option<DiscriminateFn>,
}

impl InterfaceTypeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn resolve_type(
        mut self,
        f: impl Fn(&RuntimeValue, Option<&RequestContext>, &ResolveInfo) -> Option<RuntimeType>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.resolve_type = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for InterfaceTypeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceTypeOptions")
            .field("name", &self.name)
            .field("custom_resolver", &self.resolve_type.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct EnumOptions {
    pub name: String,
    pub description: Option<String>,
}

impl EnumOptions {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&str> for EnumOptions {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Options of a schema root.
#[derive(Clone, Default)]
pub struct SchemaRootOptions {
    /// Builds the root singleton; an empty instance is used without one.
    pub constructor: Option<Arc<dyn Fn() -> Instance + Send + Sync>>,
}

impl SchemaRootOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn constructor(mut self, f: impl Fn() -> Instance + Send + Sync + 'static) -> Self {
        self.constructor = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for SchemaRootOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRootOptions")
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_category_merge() {
        use RootCategory::*;

        assert_eq!(RootCategory::merge(Some(Query), Some(Mutation)), Some(Both));
        assert_eq!(RootCategory::merge(Some(Mutation), Some(Query)), Some(Both));
        assert_eq!(RootCategory::merge(Some(Query), Some(Query)), None);
        assert_eq!(RootCategory::merge(None, None), None);
        assert_eq!(RootCategory::merge(Some(Both), Some(Query)), None);
    }

    #[test]
    fn test_exposed_name() {
        let field = FieldDecl::property("first_name");
        assert_eq!(field.exposed_name(), "first_name");
        assert_eq!(field.name("firstName").exposed_name(), "firstName");
    }
}
