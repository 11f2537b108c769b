//! Values flowing through synthesized resolvers.
//!
//! Resolvers receive and return [`RuntimeValue`]s. Plain data is either a
//! scalar [`Value`] or an ordered map; class instances carry their
//! [`ClassRef`] so unions and interfaces can discriminate them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_graphql::{Name, Value};
use indexmap::IndexMap;

use crate::resolver::Method;
use crate::types::{ClassRef, TypeKey};

#[derive(Clone, Default)]
pub enum RuntimeValue {
    #[default]
    Undefined,
    Null,
    Scalar(Value),
    List(Vec<RuntimeValue>),
    /// A plain object that is not an instance of any class.
    Object(IndexMap<String, RuntimeValue>),
    Instance(Instance),
    /// Host data passed through untouched, such as the request context.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl RuntimeValue {
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, RuntimeValue)>) -> Self {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::Opaque(Arc::new(value))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null | Self::Scalar(Value::Null))
    }

    /// Property lookup on plain objects and instances.
    pub fn get(&self, key: &str) -> Option<&RuntimeValue> {
        match self {
            Self::Object(map) => map.get(key),
            Self::Instance(instance) => instance.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Scalar(Value::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Scalar(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Value::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RuntimeValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Opaque(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Converts to a wire value. Opaque data and `undefined` become null.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Undefined | Self::Null | Self::Opaque(_) => Value::Null,
            Self::Scalar(value) => value.clone(),
            Self::List(items) => Value::List(items.iter().map(Self::to_value).collect()),
            Self::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (Name::new(k), v.to_value()))
                    .collect(),
            ),
            Self::Instance(instance) => Value::Object(
                instance
                    .props()
                    .iter()
                    .map(|(k, v)| (Name::new(k), v.to_value()))
                    .collect(),
            ),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Scalar(_) => "scalar",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            Self::Instance(_) => "instance",
            Self::Opaque(_) => "opaque",
        }
    }
}

impl From<Value> for RuntimeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::List(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k.to_string(), Self::from(v)))
                    .collect(),
            ),
            other => Self::Scalar(other),
        }
    }
}

impl From<serde_json::Value> for RuntimeValue {
    fn from(value: serde_json::Value) -> Self {
        match Value::from_json(value) {
            Ok(value) => Self::from(value),
            Err(_) => Self::Null,
        }
    }
}

impl From<&str> for RuntimeValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for RuntimeValue {
    fn from(s: String) -> Self {
        Self::Scalar(Value::String(s))
    }
}

impl From<bool> for RuntimeValue {
    fn from(b: bool) -> Self {
        Self::Scalar(Value::Boolean(b))
    }
}

impl From<i32> for RuntimeValue {
    fn from(n: i32) -> Self {
        Self::Scalar(Value::from(n))
    }
}

impl From<i64> for RuntimeValue {
    fn from(n: i64) -> Self {
        Self::Scalar(Value::from(n))
    }
}

impl From<f64> for RuntimeValue {
    fn from(n: f64) -> Self {
        Self::Scalar(Value::from(n))
    }
}

impl From<Vec<RuntimeValue>> for RuntimeValue {
    fn from(items: Vec<RuntimeValue>) -> Self {
        Self::List(items)
    }
}

impl From<Instance> for RuntimeValue {
    fn from(instance: Instance) -> Self {
        Self::Instance(instance)
    }
}

impl<T: Into<RuntimeValue>> From<Option<T>> for RuntimeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl PartialEq for RuntimeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Instance(a), Self::Instance(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Scalar(value) => write!(f, "Scalar({value})"),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Object(map) => f.debug_map().entries(map).finish(),
            Self::Instance(instance) => instance.fmt(f),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

/// An object created from a class.
///
/// Properties are copy-on-write; cloning an instance shares its storage until
/// one side is modified.
#[derive(Clone)]
pub struct Instance(Arc<InstanceInner>);

#[derive(Clone)]
struct InstanceInner {
    class: ClassRef,
    props: IndexMap<String, RuntimeValue>,
    methods: IndexMap<String, Method>,
}

impl Instance {
    pub fn new(class: &ClassRef) -> Self {
        Self::from_props(class, IndexMap::new())
    }

    pub fn from_props(class: &ClassRef, props: IndexMap<String, RuntimeValue>) -> Self {
        Self(Arc::new(InstanceInner {
            class: class.clone(),
            props,
            methods: IndexMap::new(),
        }))
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RuntimeValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Overrides a declared method on this instance only.
    #[must_use]
    pub fn with_method(mut self, name: impl Into<String>, method: Method) -> Self {
        Arc::make_mut(&mut self.0).methods.insert(name.into(), method);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<RuntimeValue>) {
        Arc::make_mut(&mut self.0)
            .props
            .insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&RuntimeValue> {
        self.0.props.get(key)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.0.methods.get(name)
    }

    pub fn props(&self) -> &IndexMap<String, RuntimeValue> {
        &self.0.props
    }

    pub fn class(&self) -> &ClassRef {
        &self.0.class
    }

    /// Whether the instance's class is `key` or inherits from it.
    pub fn is_instance_of(&self, key: TypeKey) -> bool {
        self.0.class.is_a(key)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.class == other.0.class && self.0.props == other.0.props)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.0.class.name())
            .field("props", &self.0.props)
            .finish()
    }
}
