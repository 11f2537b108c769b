//! Lowering into an executable `async_graphql` dynamic schema.
//!
//! Values cross the engine boundary as [`RuntimeValue`]s wrapped in
//! `FieldValue::owned_any`. Arguments are converted by their compiled type:
//! enum names become internal values and input objects become instances of
//! their class.

use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Interface,
    InterfaceField, Object, ResolverContext, Scalar, Schema, SchemaBuilder, Union,
};
use async_graphql::{Name, Value};
use indexmap::IndexMap;
use tracing::debug;

use super::CompiledSchema;
use crate::error::{AssemblyError, CastError, Result, ResolverError};
use crate::graph::{
    EnumNode, GraphNode, GraphType, InputNode, InterfaceNode, ObjectNode, ResolvedArg,
    ResolvedField, ScalarNode, UnionNode,
};
use crate::resolver::{RequestContext, ResolveInfo};
use crate::value::{Instance, RuntimeValue};

impl CompiledSchema {
    /// Builds the executable schema, applying the configured limits.
    ///
    /// # Errors
    ///
    /// Returns an error if a lazy field map fails to compile or the engine
    /// rejects the lowered types.
    pub fn executable(&self) -> Result<Schema> {
        let mutation = self.mutation.as_ref().map(|m| m.name.as_str());
        let mut builder = Schema::build(self.query.name.as_str(), mutation, None);

        for node in &self.types {
            builder = register(builder, node)?;
        }

        builder = builder
            .data(self.graph.clone())
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);
        if !self.config.introspection {
            builder = builder.disable_introspection();
        }

        let schema = builder
            .finish()
            .map_err(|e| AssemblyError::Engine(e.to_string()))?;
        debug!(types = self.types.len(), "built executable schema");
        Ok(schema)
    }

    /// The schema in SDL form.
    ///
    /// # Errors
    ///
    /// Fails where [`CompiledSchema::executable`] fails.
    pub fn sdl(&self) -> Result<String> {
        Ok(self.executable()?.sdl())
    }
}

fn register(builder: SchemaBuilder, node: &GraphNode) -> Result<SchemaBuilder> {
    Ok(match node {
        GraphNode::Scalar(scalar) if scalar.is_builtin() => builder,
        GraphNode::Scalar(scalar) => builder.register(lower_scalar(scalar)),
        GraphNode::Object(object) => builder.register(lower_object(object)?),
        GraphNode::Input(input) => builder.register(lower_input(input)?),
        GraphNode::Enum(node) => builder.register(lower_enum(node)),
        GraphNode::Union(union) => builder.register(lower_union(union)),
        GraphNode::Interface(interface) => builder.register(lower_interface(interface)?),
    })
}

fn lower_scalar(node: &ScalarNode) -> Scalar {
    let mut scalar = Scalar::new(node.name());
    if let Some(description) = node.description_text() {
        scalar = scalar.description(description);
    }
    if let Some(validator) = node.validator_fn() {
        scalar = scalar.validator(move |value| validator(value));
    }
    scalar
}

fn lower_object(node: &ObjectNode) -> Result<Object> {
    let mut object = Object::new(node.name.as_str());
    if let Some(description) = &node.description {
        object = object.description(description.as_str());
    }
    for interface in &node.interfaces {
        object = object.implement(interface.name.as_str());
    }
    for field in node.fields()?.values() {
        object = object.field(lower_field(&node.name, field));
    }
    Ok(object)
}

fn lower_field(parent_type: &str, field: &ResolvedField) -> Field {
    let resolved = field.clone();
    let info = ResolveInfo {
        parent_type: parent_type.to_string(),
        field_name: field.name.clone(),
        return_type: field.ty.to_string(),
    };

    let mut lowered = Field::new(field.name.as_str(), field.ty.to_type_ref(), move |ctx| {
        let field = resolved.clone();
        let info = info.clone();
        FieldFuture::new(async move {
            let source = ctx
                .parent_value
                .try_downcast_ref::<RuntimeValue>()
                .ok()
                .cloned()
                .unwrap_or_default();
            let args = read_args(&ctx, &field.args)?;
            let context = ctx.ctx.data_opt::<RequestContext>().cloned();

            let value = field
                .resolver
                .call(source, args, context.clone(), info.clone())
                .await?;
            Ok(to_field_value(&field.ty, value, context.as_ref(), &info)?)
        })
    });

    if let Some(description) = &field.description {
        lowered = lowered.description(description.as_str());
    }
    if field.deprecation_reason.is_some() {
        lowered = lowered.deprecation(field.deprecation_reason.as_deref());
    }
    for arg in field.args.values() {
        lowered = lowered.argument(lower_arg(arg));
    }
    lowered
}

fn lower_arg(arg: &ResolvedArg) -> InputValue {
    let mut input = InputValue::new(arg.name.as_str(), arg.ty.to_type_ref());
    if let Some(description) = &arg.description {
        input = input.description(description.as_str());
    }
    if let Some(default) = &arg.default_value {
        input = input.default_value(default.clone());
    }
    input
}

fn lower_input(node: &InputNode) -> Result<InputObject> {
    let mut object = InputObject::new(node.name.as_str());
    if let Some(description) = &node.description {
        object = object.description(description.as_str());
    }
    for field in node.fields()?.values() {
        let mut input = InputValue::new(field.name.as_str(), field.ty.to_type_ref());
        if let Some(description) = &field.description {
            input = input.description(description.as_str());
        }
        if let Some(default) = &field.default_value {
            input = input.default_value(default.clone());
        }
        object = object.field(input);
    }
    Ok(object)
}

fn lower_enum(node: &EnumNode) -> Enum {
    let mut lowered = Enum::new(node.name.as_str());
    if let Some(description) = &node.description {
        lowered = lowered.description(description.as_str());
    }
    for value in &node.values {
        let mut item = EnumItem::new(value.name.as_str());
        if let Some(description) = &value.description {
            item = item.description(description.as_str());
        }
        if value.deprecation_reason.is_some() {
            item = item.deprecation(value.deprecation_reason.as_deref());
        }
        lowered = lowered.item(item);
    }
    lowered
}

fn lower_union(node: &UnionNode) -> Union {
    let mut union = Union::new(node.name.as_str());
    if let Some(description) = &node.description {
        union = union.description(description.as_str());
    }
    for member in &node.members {
        union = union.possible_type(member.name.as_str());
    }
    union
}

fn lower_interface(node: &InterfaceNode) -> Result<Interface> {
    let mut interface = Interface::new(node.name.as_str());
    if let Some(description) = &node.description {
        interface = interface.description(description.as_str());
    }
    for field in node.fields()?.values() {
        let mut lowered = InterfaceField::new(field.name.as_str(), field.ty.to_type_ref());
        if let Some(description) = &field.description {
            lowered = lowered.description(description.as_str());
        }
        if field.deprecation_reason.is_some() {
            lowered = lowered.deprecation(field.deprecation_reason.as_deref());
        }
        for arg in field.args.values() {
            lowered = lowered.argument(lower_arg(arg));
        }
        interface = interface.field(lowered);
    }
    Ok(interface)
}

fn read_args(
    ctx: &ResolverContext<'_>,
    args: &IndexMap<String, ResolvedArg>,
) -> Result<IndexMap<String, RuntimeValue>, ResolverError> {
    let mut values = IndexMap::with_capacity(args.len());
    for (name, arg) in args {
        if let Some(value) = ctx.args.get(name) {
            values.insert(name.clone(), from_input(&arg.ty, value.as_value())?);
        } else if let Some(default) = &arg.default_value {
            values.insert(name.clone(), from_input(&arg.ty, default)?);
        }
    }
    Ok(values)
}

/// Converts an argument value by its compiled input type.
fn from_input(ty: &GraphType, value: &Value) -> Result<RuntimeValue, ResolverError> {
    if matches!(value, Value::Null) {
        return Ok(RuntimeValue::Null);
    }
    match ty {
        GraphType::NonNull(inner) => from_input(inner, value),
        GraphType::List(inner) => match value {
            Value::List(items) => items
                .iter()
                .map(|item| from_input(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(RuntimeValue::List),
            single => Ok(RuntimeValue::List(vec![from_input(inner, single)?])),
        },
        GraphType::Named(GraphNode::Enum(node)) => {
            let name = match value {
                Value::Enum(name) => name.as_str(),
                Value::String(name) => name.as_str(),
                _ => "",
            };
            node.value_of(name)
                .map(|internal| RuntimeValue::from(internal.clone()))
                .ok_or_else(|| ResolverError::InvalidEnumValue {
                    enum_type: node.name.clone(),
                    value: value.to_string(),
                })
        }
        GraphType::Named(GraphNode::Input(node)) => input_instance(node, value),
        GraphType::Named(_) => Ok(RuntimeValue::from(value.clone())),
    }
}

fn input_instance(node: &InputNode, value: &Value) -> Result<RuntimeValue, ResolverError> {
    let Value::Object(supplied) = value else {
        return Ok(RuntimeValue::from(value.clone()));
    };

    let mut props = IndexMap::new();
    for (name, field) in node.fields()?.iter() {
        let raw = supplied
            .get(name.as_str())
            .or(field.default_value.as_ref());
        if let Some(raw) = raw {
            props.insert(field.property.clone(), from_input(&field.ty, raw)?);
        }
    }
    Ok(Instance::from_props(&node.class, props).into())
}

/// Converts a resolved value into what the engine expects for `ty`.
fn to_field_value<'a>(
    ty: &GraphType,
    value: RuntimeValue,
    context: Option<&RequestContext>,
    info: &ResolveInfo,
) -> Result<Option<FieldValue<'a>>, ResolverError> {
    if value.is_nullish() {
        return Ok(None);
    }
    match ty {
        GraphType::NonNull(inner) => to_field_value(inner, value, context, info),
        GraphType::List(inner) => {
            let RuntimeValue::List(items) = value else {
                return Err(CastError::NotAList {
                    field: info.field_name.clone(),
                    found: value.kind(),
                }
                .into());
            };
            let items = items
                .into_iter()
                .map(|item| {
                    Ok(to_field_value(inner, item, context, info)?.unwrap_or(FieldValue::NULL))
                })
                .collect::<Result<Vec<_>, ResolverError>>()?;
            Ok(Some(FieldValue::list(items)))
        }
        GraphType::Named(node) => match node {
            GraphNode::Scalar(_) | GraphNode::Input(_) => Ok(Some(FieldValue::value(value.to_value()))),
            GraphNode::Enum(node) => {
                let internal = value.to_value();
                let name = node.name_of(&internal).ok_or_else(|| ResolverError::InvalidEnumValue {
                    enum_type: node.name.clone(),
                    value: internal.to_string(),
                })?;
                Ok(Some(FieldValue::value(Value::Enum(Name::new(name)))))
            }
            GraphNode::Object(_) => Ok(Some(FieldValue::owned_any(value))),
            GraphNode::Union(union) => {
                let concrete = union.resolve_type(&value, context, info).ok_or_else(|| {
                    ResolverError::Discrimination {
                        abstract_type: union.name.clone(),
                    }
                })?;
                Ok(Some(FieldValue::owned_any(value).with_type(concrete)))
            }
            GraphNode::Interface(interface) => {
                let concrete = interface.resolve_type(&value, context, info).ok_or_else(|| {
                    ResolverError::Discrimination {
                        abstract_type: interface.name.clone(),
                    }
                })?;
                Ok(Some(FieldValue::owned_any(value).with_type(concrete)))
            }
        },
    }
}
