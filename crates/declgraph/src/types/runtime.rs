//! Runtime type references.
//!
//! A [`RuntimeType`] is what a declaration points at before compilation: a
//! native scalar, a class, an enum, an already built graph node, a list of one
//! of those, or a thunk that produces one later.

use std::fmt;
use std::sync::Arc;

use super::class::{ClassRef, EnumDef};
use crate::graph::{GraphNode, scalars};

/// Scalars every declaration may use without registering anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeScalar {
    String,
    Number,
    Boolean,
    Date,
    Int,
    Id,
}

impl NativeScalar {
    /// Name of the graph scalar this native type maps to.
    pub fn graph_name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Float",
            Self::Boolean => "Boolean",
            Self::Date => "DateTime",
            Self::Int => "Int",
            Self::Id => "ID",
        }
    }

    /// The shared scalar node for this type.
    pub fn node(self) -> GraphNode {
        let node = match self {
            Self::String => scalars::STRING.clone(),
            Self::Number => scalars::FLOAT.clone(),
            Self::Boolean => scalars::BOOLEAN.clone(),
            Self::Date => scalars::DATE_TIME.clone(),
            Self::Int => scalars::INT.clone(),
            Self::Id => scalars::ID.clone(),
        };
        GraphNode::Scalar(node)
    }
}

/// A deferred type reference.
#[derive(Clone)]
pub struct Thunk(Arc<dyn Fn() -> RuntimeType + Send + Sync>);

impl Thunk {
    pub fn new(f: impl Fn() -> RuntimeType + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) -> RuntimeType {
        (self.0)()
    }
}

/// A type reference as written at a declaration site.
#[derive(Clone)]
pub enum RuntimeType {
    /// A graph node supplied directly, usually a custom scalar.
    Node(GraphNode),
    Scalar(NativeScalar),
    /// A class registered as an object, input, union or interface.
    Class(ClassRef),
    Enum(EnumDef),
    /// A list type. Valid references carry exactly one item type.
    Array(Vec<RuntimeType>),
    Thunk(Thunk),
}

impl RuntimeType {
    #[must_use]
    pub fn list(item: impl Into<RuntimeType>) -> Self {
        Self::Array(vec![item.into()])
    }

    #[must_use]
    pub fn thunk(f: impl Fn() -> RuntimeType + Send + Sync + 'static) -> Self {
        Self::Thunk(Thunk::new(f))
    }

    /// A thunk returning `class`, for references to classes declared later.
    #[must_use]
    pub fn lazy(class: &ClassRef) -> Self {
        let class = class.clone();
        Self::thunk(move || Self::Class(class.clone()))
    }

    pub fn string() -> Self {
        Self::Scalar(NativeScalar::String)
    }

    pub fn number() -> Self {
        Self::Scalar(NativeScalar::Number)
    }

    pub fn boolean() -> Self {
        Self::Scalar(NativeScalar::Boolean)
    }

    pub fn date() -> Self {
        Self::Scalar(NativeScalar::Date)
    }

    pub fn int() -> Self {
        Self::Scalar(NativeScalar::Int)
    }

    pub fn id() -> Self {
        Self::Scalar(NativeScalar::Id)
    }
}

impl From<NativeScalar> for RuntimeType {
    fn from(scalar: NativeScalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<ClassRef> for RuntimeType {
    fn from(class: ClassRef) -> Self {
        Self::Class(class)
    }
}

impl From<&ClassRef> for RuntimeType {
    fn from(class: &ClassRef) -> Self {
        Self::Class(class.clone())
    }
}

impl From<EnumDef> for RuntimeType {
    fn from(def: EnumDef) -> Self {
        Self::Enum(def)
    }
}

impl From<&EnumDef> for RuntimeType {
    fn from(def: &EnumDef) -> Self {
        Self::Enum(def.clone())
    }
}

impl From<GraphNode> for RuntimeType {
    fn from(node: GraphNode) -> Self {
        Self::Node(node)
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => f.write_str(node.name()),
            Self::Scalar(scalar) => f.write_str(scalar.graph_name()),
            Self::Class(class) => f.write_str(class.name()),
            Self::Enum(def) => write!(f, "enum{}", def.key()),
            Self::Array(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Thunk(_) => f.write_str("<thunk>"),
        }
    }
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuntimeType({self})")
    }
}
