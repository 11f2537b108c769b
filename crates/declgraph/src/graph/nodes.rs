use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_graphql::Value;
use indexmap::IndexMap;

use super::{Discriminator, GraphType};
use crate::error::{CompileError, Result};
use crate::resolver::{FieldResolver, RequestContext, ResolveInfo};
use crate::session::WeakSession;
use crate::types::{ClassRef, EnumDef};
use crate::value::RuntimeValue;

type FieldInit<F> = Box<dyn Fn() -> Result<IndexMap<String, F>> + Send + Sync>;

/// A field map computed on first access and memoized.
///
/// A failed computation is not cached; the next access retries it. Maps of
/// cached nodes are released when the session's node cache is dropped, which
/// breaks the reference cycles between mutually recursive nodes.
pub struct LazyFields<F> {
    cell: ArcSwapOption<IndexMap<String, F>>,
    init: Option<FieldInit<F>>,
}

impl<F> LazyFields<F> {
    pub(crate) fn new(init: impl Fn() -> Result<IndexMap<String, F>> + Send + Sync + 'static) -> Self {
        Self {
            cell: ArcSwapOption::empty(),
            init: Some(Box::new(init)),
        }
    }

    /// An already evaluated map with nothing to recompute.
    pub(crate) fn ready(fields: IndexMap<String, F>) -> Self {
        Self {
            cell: ArcSwapOption::from_pointee(fields),
            init: None,
        }
    }

    /// # Errors
    ///
    /// Returns the compilation error of the field map, or
    /// [`CompileError::SessionDropped`] once the map was released.
    pub fn get(&self) -> Result<Arc<IndexMap<String, F>>> {
        if let Some(fields) = self.cell.load_full() {
            return Ok(fields);
        }
        let init = self.init.as_ref().ok_or(CompileError::SessionDropped)?;
        let fields = Arc::new(init()?);
        // Concurrent first accesses keep whichever map was stored first.
        self.cell
            .rcu(|current| current.clone().or_else(|| Some(fields.clone())));
        Ok(self.cell.load_full().unwrap_or(fields))
    }

    pub fn is_evaluated(&self) -> bool {
        self.cell.load().is_some()
    }

    /// Drops the evaluated map so it no longer keeps other nodes alive.
    pub(crate) fn release(&self) {
        self.cell.store(None);
    }
}

/// An output field with its synthesized resolver.
#[derive(Clone)]
pub struct ResolvedField {
    pub name: String,
    pub property: String,
    pub ty: GraphType,
    pub args: IndexMap<String, ResolvedArg>,
    pub resolver: Arc<FieldResolver>,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl fmt::Debug for ResolvedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedField")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .field("args", &self.args.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedArg {
    pub name: String,
    pub ty: GraphType,
    pub description: Option<String>,
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ResolvedInputField {
    pub name: String,
    pub property: String,
    pub ty: GraphType,
    pub description: Option<String>,
    pub default_value: Option<Value>,
    pub deprecation_reason: Option<String>,
}

/// An object type. Roots carry no class.
pub struct ObjectNode {
    pub name: String,
    pub description: Option<String>,
    pub class: Option<ClassRef>,
    pub interfaces: Vec<Arc<InterfaceNode>>,
    pub(crate) fields: LazyFields<ResolvedField>,
}

impl ObjectNode {
    pub fn fields(&self) -> Result<Arc<IndexMap<String, ResolvedField>>> {
        self.fields.get()
    }

    pub fn field(&self, name: &str) -> Result<Option<ResolvedField>> {
        Ok(self.fields()?.get(name).cloned())
    }
}

impl fmt::Debug for ObjectNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectNode")
            .field("name", &self.name)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

pub struct InputNode {
    pub name: String,
    pub description: Option<String>,
    pub class: ClassRef,
    pub(crate) fields: LazyFields<ResolvedInputField>,
}

impl InputNode {
    pub fn fields(&self) -> Result<Arc<IndexMap<String, ResolvedInputField>>> {
        self.fields.get()
    }
}

impl fmt::Debug for InputNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputNode")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueNode {
    pub name: String,
    pub value: Value,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug)]
pub struct EnumNode {
    pub name: String,
    pub description: Option<String>,
    pub def: EnumDef,
    pub values: Vec<EnumValueNode>,
}

impl EnumNode {
    /// The item name carrying an internal value.
    pub fn name_of(&self, value: &Value) -> Option<&str> {
        self.values
            .iter()
            .find(|item| &item.value == value)
            .map(|item| item.name.as_str())
    }

    /// The internal value of an item.
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.value)
    }
}

pub struct UnionNode {
    pub name: String,
    pub description: Option<String>,
    pub class: ClassRef,
    pub members: Vec<Arc<ObjectNode>>,
    pub(crate) discriminator: Discriminator,
}

impl UnionNode {
    /// Name of the member type `value` belongs to.
    pub fn resolve_type(
        &self,
        value: &RuntimeValue,
        context: Option<&RequestContext>,
        info: &ResolveInfo,
    ) -> Option<String> {
        self.discriminator.discriminate(&self.name, value, context, info)
    }
}

impl fmt::Debug for UnionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionNode")
            .field("name", &self.name)
            .field(
                "members",
                &self.members.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

pub struct InterfaceNode {
    pub name: String,
    pub description: Option<String>,
    pub class: ClassRef,
    pub(crate) fields: LazyFields<ResolvedField>,
    pub(crate) discriminator: Discriminator,
    pub(crate) session: WeakSession,
}

impl InterfaceNode {
    pub fn fields(&self) -> Result<Arc<IndexMap<String, ResolvedField>>> {
        self.fields.get()
    }

    /// Compiled object types of every registered implementor.
    pub fn implementations(&self) -> Result<Vec<Arc<ObjectNode>>> {
        let session = self.session.upgrade()?;
        session
            .implementors_of(&self.class)
            .iter()
            .map(|class| session.compile_object(class))
            .collect()
    }

    /// Name of the implementing type `value` belongs to.
    pub fn resolve_type(
        &self,
        value: &RuntimeValue,
        context: Option<&RequestContext>,
        info: &ResolveInfo,
    ) -> Option<String> {
        self.discriminator.discriminate(&self.name, value, context, info)
    }
}

impl fmt::Debug for InterfaceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceNode")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
