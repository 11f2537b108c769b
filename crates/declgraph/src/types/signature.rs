//! Static type signatures.
//!
//! Declarations describe the static shape of a property, return value or
//! parameter with a [`TypeSignature`]. Inference reads these to derive a
//! runtime type and a nullability default when no explicit type is given.

use super::class::{ClassRef, EnumDef};
use super::runtime::NativeScalar;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    String(String),
    Number(f64),
}

impl Literal {
    pub fn scalar(&self) -> NativeScalar {
        match self {
            Self::Bool(_) => NativeScalar::Boolean,
            Self::String(_) => NativeScalar::String,
            Self::Number(_) => NativeScalar::Number,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSignature {
    Scalar(NativeScalar),
    Literal(Literal),
    Null,
    Undefined,
    Class(ClassRef),
    Enum(EnumDef),
    Array(Box<TypeSignature>),
    Union(Vec<TypeSignature>),
    /// A generic wrapper such as `Promise<T>`.
    Generic {
        wrapper: String,
        params: Vec<TypeSignature>,
    },
    /// An empty object or `any`.
    Object,
    /// An array without an element type.
    BareArray,
    /// A promise without a result type.
    BarePromise,
}

impl TypeSignature {
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

    pub fn class(class: &ClassRef) -> Self {
        Self::Class(class.clone())
    }

    pub fn enumeration(def: &EnumDef) -> Self {
        Self::Enum(def.clone())
    }

    pub fn array(item: TypeSignature) -> Self {
        Self::Array(Box::new(item))
    }

    pub fn promise(inner: TypeSignature) -> Self {
        Self::Generic {
            wrapper: "Promise".into(),
            params: vec![inner],
        }
    }

    pub fn union(members: impl IntoIterator<Item = TypeSignature>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    /// `T | null`
    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Union(vec![self, Self::Null])
    }

    /// `T | undefined`
    #[must_use]
    pub fn optional(self) -> Self {
        Self::Union(vec![self, Self::Undefined])
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }
}
