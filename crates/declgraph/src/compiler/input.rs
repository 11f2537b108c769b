use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::{in_field, inference_error};
use crate::error::{ObjectTypeError, Result};
use crate::graph::{InputNode, LazyFields, ResolvedInputField};
use crate::inference::infer_type;
use crate::resolve::ResolveOptions;
use crate::session::Session;
use crate::types::ClassRef;

impl Session {
    /// Compiles a registered input type into its node.
    ///
    /// # Errors
    ///
    /// Returns an error if `class` is not an input type or has no input
    /// fields anywhere in its lineage.
    pub fn compile_input(&self, class: &ClassRef) -> Result<Arc<InputNode>> {
        if let Some(node) = self.cache().inputs.get(&class.key()) {
            return Ok(node.value().clone());
        }

        let options = self
            .registries()
            .input_options(class.key())
            .ok_or_else(|| ObjectTypeError::Unregistered {
                class: class.name().to_string(),
            })?;

        let lineage = class.ancestors_oldest_first();
        if lineage
            .iter()
            .all(|c| self.registries().input_fields.is_empty(c.key()))
        {
            return Err(ObjectTypeError::EmptyInputType {
                class: class.name().to_string(),
            }
            .into());
        }

        let fields = {
            let session = self.downgrade();
            let class = class.clone();
            LazyFields::new(move || session.upgrade()?.input_fields_of(&class))
        };

        let node = Arc::new(InputNode {
            name: options.name.unwrap_or_else(|| class.name().to_string()),
            description: options.description,
            class: class.clone(),
            fields,
        });
        debug!(input = %node.name, "compiled input type");

        Ok(self
            .cache()
            .inputs
            .entry(class.key())
            .or_insert(node)
            .value()
            .clone())
    }

    fn input_fields_of(&self, class: &ClassRef) -> Result<IndexMap<String, ResolvedInputField>> {
        let mut decls = IndexMap::new();
        for source in class.ancestors_oldest_first() {
            for (_, decl) in self.registries().input_fields.get_all(source.key()) {
                decls.insert(decl.exposed_name().to_string(), decl);
            }
        }

        let mut fields = IndexMap::with_capacity(decls.len());
        for (name, decl) in decls {
            let inferred = infer_type(decl.signature.as_ref());
            let nullable = decl.nullable.unwrap_or(inferred.is_nullable);
            let Some(runtime_type) = decl.ty.clone().or(inferred.runtime_type) else {
                return Err(inference_error(class, &decl.property, inferred.uninferable));
            };

            let options = ResolveOptions::argument()
                .nullable(nullable)
                .item_nullable(decl.item_nullable);
            let ty = self
                .resolve_type(&runtime_type, options)
                .map_err(|err| in_field(class, &decl.property, err))?;
            if !ty.named_node().is_input_type() {
                return Err(ObjectTypeError::NonInputField {
                    class: class.name().to_string(),
                    field: decl.property,
                    ty: ty.to_string(),
                }
                .into());
            }
            trace!(input = %class, field = %name, ty = %ty, "compiled input field");

            fields.insert(
                name.clone(),
                ResolvedInputField {
                    name,
                    property: decl.property,
                    ty,
                    description: decl.description,
                    default_value: decl.default_value,
                    deprecation_reason: decl.deprecation_reason,
                },
            );
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::registry::{InputFieldDecl, InputObjectTypeOptions, ObjectTypeOptions};
    use crate::types::{RuntimeType, TypeSignature};

    #[test]
    fn test_empty_input_rejected() {
        let session = Session::new();
        let empty = ClassRef::new("EmptyInput");
        session.input_object_type(&empty, InputObjectTypeOptions::new());

        assert!(matches!(
            session.compile_input(&empty).unwrap_err(),
            CompileError::ObjectType(ObjectTypeError::EmptyInputType { .. })
        ));
    }

    #[test]
    fn test_inherited_input_fields() {
        let session = Session::new();
        let base = ClassRef::new("PageInput");
        let filter = ClassRef::extends("UserFilter", &base);
        session.input_object_type(&filter, InputObjectTypeOptions::new());
        session.input_field(
            &base,
            InputFieldDecl::new("limit")
                .signature(TypeSignature::int().optional())
                .default_value(20),
        );
        session.input_field(
            &filter,
            InputFieldDecl::new("name").signature(TypeSignature::string()),
        );

        let node = session.compile_input(&filter).unwrap();
        let fields = node.fields().unwrap();
        assert_eq!(fields["limit"].ty.to_string(), "Int");
        assert_eq!(fields["name"].ty.to_string(), "String!");
        assert!(fields["limit"].default_value.is_some());
    }

    #[test]
    fn test_output_type_in_input_rejected() {
        let session = Session::new();
        let user = ClassRef::new("User");
        let filter = ClassRef::new("Filter");
        session.object_type(&user, ObjectTypeOptions::new());
        session.input_object_type(&filter, InputObjectTypeOptions::new());
        session.input_field(&filter, InputFieldDecl::new("user").ty(RuntimeType::from(&user)));

        let node = session.compile_input(&filter).unwrap();
        assert!(matches!(
            node.fields().unwrap_err(),
            CompileError::ObjectType(ObjectTypeError::NonInputField { .. })
        ));
    }
}
