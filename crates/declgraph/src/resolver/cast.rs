//! Casting resolved values to the class their field declares.

use crate::error::CastError;
use crate::session::Session;
use crate::types::{ClassRef, RuntimeType};
use crate::value::{Instance, RuntimeValue};

/// How a value is cast before it leaves a resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum CastPlan {
    /// Scalars, enums, unions and interfaces are returned as they are.
    Passthrough,
    /// Plain objects become instances of the class.
    Instance(ClassRef),
    /// Every element is cast with the inner plan.
    List(Box<CastPlan>),
}

impl CastPlan {
    /// Casts `value`. Nullish values and values that already carry a class
    /// are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a list plan meets a non-list value, or if a list
    /// element is itself a list the plan does not expect.
    pub fn apply(&self, field: &str, value: RuntimeValue) -> Result<RuntimeValue, CastError> {
        if value.is_nullish() {
            return Ok(value);
        }
        match self {
            Self::Passthrough => Ok(value),
            Self::Instance(class) => match value {
                RuntimeValue::Object(props) => Ok(Instance::from_props(class, props).into()),
                other => Ok(other),
            },
            Self::List(inner) => {
                let RuntimeValue::List(items) = value else {
                    return Err(CastError::NotAList {
                        field: field.to_string(),
                        found: value.kind(),
                    });
                };
                items
                    .into_iter()
                    .map(|item| match (&item, inner.as_ref()) {
                        (RuntimeValue::List(_), plan) if !matches!(plan, Self::List(_)) => {
                            Err(CastError::NestedList {
                                field: field.to_string(),
                            })
                        }
                        _ => inner.apply(field, item),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(RuntimeValue::List)
            }
        }
    }
}

impl Session {
    /// Derives the cast plan for a declared runtime type.
    pub fn cast_plan(&self, runtime_type: &RuntimeType) -> CastPlan {
        match runtime_type {
            RuntimeType::Class(class) => {
                let key = class.key();
                if self.is_union(key) || self.is_interface(key) {
                    CastPlan::Passthrough
                } else {
                    CastPlan::Instance(class.clone())
                }
            }
            RuntimeType::Array(items) => match items.as_slice() {
                [RuntimeType::Class(class)] if self.is_interface(class.key()) => CastPlan::Passthrough,
                [item] => CastPlan::List(Box::new(self.cast_plan(item))),
                _ => CastPlan::Passthrough,
            },
            RuntimeType::Thunk(thunk) => match thunk.call() {
                RuntimeType::Thunk(_) => CastPlan::Passthrough,
                inner => self.cast_plan(&inner),
            },
            RuntimeType::Node(_) | RuntimeType::Scalar(_) | RuntimeType::Enum(_) => {
                CastPlan::Passthrough
            }
        }
    }
}
