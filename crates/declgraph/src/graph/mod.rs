//! The compiled type graph.
//!
//! Every named type is a [`GraphNode`] behind an `Arc`; field types wrap
//! nodes in [`GraphType`] to express non-null and list modifiers. Object and
//! interface field maps are computed on first access so that types may refer
//! to themselves and to each other.

mod discriminator;
mod nodes;
pub mod scalars;

use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::TypeRef;

pub(crate) use discriminator::Discriminator;
pub use nodes::{
    EnumNode, EnumValueNode, InputNode, InterfaceNode, LazyFields, ObjectNode, ResolvedArg,
    ResolvedField, ResolvedInputField, UnionNode,
};
pub use scalars::ScalarNode;

/// A named type in the compiled graph.
#[derive(Clone)]
pub enum GraphNode {
    Scalar(Arc<ScalarNode>),
    Object(Arc<ObjectNode>),
    Input(Arc<InputNode>),
    Enum(Arc<EnumNode>),
    Union(Arc<UnionNode>),
    Interface(Arc<InterfaceNode>),
}

impl GraphNode {
    /// Wraps a custom scalar so it can be used as a type reference.
    pub fn scalar(node: ScalarNode) -> Self {
        Self::Scalar(Arc::new(node))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(node) => node.name(),
            Self::Object(node) => &node.name,
            Self::Input(node) => &node.name,
            Self::Enum(node) => &node.name,
            Self::Union(node) => &node.name,
            Self::Interface(node) => &node.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Scalar(node) => node.description_text(),
            Self::Object(node) => node.description.as_deref(),
            Self::Input(node) => node.description.as_deref(),
            Self::Enum(node) => node.description.as_deref(),
            Self::Union(node) => node.description.as_deref(),
            Self::Interface(node) => node.description.as_deref(),
        }
    }

    pub fn is_output_type(&self) -> bool {
        !matches!(self, Self::Input(_))
    }

    pub fn is_input_type(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::Input(_))
    }

    /// Whether both handles point at the same compiled node.
    pub fn ptr_eq(&self, other: &GraphNode) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Input(a), Self::Input(b)) => Arc::ptr_eq(a, b),
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b),
            (Self::Union(a), Self::Union(b)) => Arc::ptr_eq(a, b),
            (Self::Interface(a), Self::Interface(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<ObjectNode>> {
        match self {
            Self::Object(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_input(&self) -> Option<&Arc<InputNode>> {
        match self {
            Self::Input(node) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Object(_) => "object",
            Self::Input(_) => "input",
            Self::Enum(_) => "enum",
            Self::Union(_) => "union",
            Self::Interface(_) => "interface",
        }
    }
}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.name())
    }
}

/// A field or argument type: a node plus its wrapping.
#[derive(Clone, Debug)]
pub enum GraphType {
    Named(GraphNode),
    NonNull(Box<GraphType>),
    List(Box<GraphType>),
}

impl GraphType {
    #[must_use]
    pub fn non_null(self) -> Self {
        match self {
            Self::NonNull(_) => self,
            other => Self::NonNull(Box::new(other)),
        }
    }

    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// The node at the bottom of the wrapping.
    pub fn named_node(&self) -> &GraphNode {
        match self {
            Self::Named(node) => node,
            Self::NonNull(inner) | Self::List(inner) => inner.named_node(),
        }
    }

    pub fn to_type_ref(&self) -> TypeRef {
        match self {
            Self::Named(node) => TypeRef::Named(node.name().to_string().into()),
            Self::NonNull(inner) => TypeRef::NonNull(Box::new(inner.to_type_ref())),
            Self::List(inner) => TypeRef::List(Box::new(inner.to_type_ref())),
        }
    }
}

impl fmt::Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(node) => f.write_str(node.name()),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}
