use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ObjectTypeError, Result};
use crate::graph::{LazyFields, ObjectNode, ResolvedField};
use crate::registry::ObjectTypeOptions;
use crate::session::Session;
use crate::types::ClassRef;

impl Session {
    /// Compiles a registered object type into its node.
    ///
    /// The node is cached before any of its fields compile; the field map
    /// builds on first access.
    ///
    /// # Errors
    ///
    /// Returns an error if `class` is not an object type, or if one of its
    /// mixins or interfaces is not registered.
    pub fn compile_object(&self, class: &ClassRef) -> Result<Arc<ObjectNode>> {
        if let Some(node) = self.cache().objects.get(&class.key()) {
            return Ok(node.value().clone());
        }

        let options = self
            .registries()
            .object_options(class.key())
            .ok_or_else(|| ObjectTypeError::Unregistered {
                class: class.name().to_string(),
            })?;

        for mixin in &options.mixins {
            let has_fields = mixin
                .lineage()
                .iter()
                .any(|c| !self.registries().fields.is_empty(c.key()));
            if !self.is_object_type(mixin.key()) && !has_fields {
                return Err(ObjectTypeError::UnregisteredMixin {
                    class: class.name().to_string(),
                    mixin: mixin.name().to_string(),
                }
                .into());
            }
        }

        let interfaces = options
            .implements
            .iter()
            .map(|interface| -> Result<_> {
                if !self.is_interface(interface.key()) {
                    return Err(ObjectTypeError::UnregisteredInterface {
                        class: class.name().to_string(),
                        interface: interface.name().to_string(),
                    }
                    .into());
                }
                self.compile_interface(interface)
            })
            .collect::<Result<Vec<_>>>()?;

        let fields = {
            let session = self.downgrade();
            let class = class.clone();
            let options = options.clone();
            LazyFields::new(move || session.upgrade()?.object_fields(&class, &options))
        };

        let node = Arc::new(ObjectNode {
            name: options.name.unwrap_or_else(|| class.name().to_string()),
            description: options.description,
            class: Some(class.clone()),
            interfaces,
            fields,
        });
        debug!(object = %node.name, class = %class, "compiled object type");

        Ok(self
            .cache()
            .objects
            .entry(class.key())
            .or_insert(node)
            .value()
            .clone())
    }

    /// Walks interfaces, mixins and the class lineage, oldest first.
    fn object_fields(
        &self,
        class: &ClassRef,
        options: &ObjectTypeOptions,
    ) -> Result<IndexMap<String, ResolvedField>> {
        let sources: Vec<ClassRef> = options
            .implements
            .iter()
            .chain(&options.mixins)
            .flat_map(ClassRef::ancestors_oldest_first)
            .chain(class.ancestors_oldest_first())
            .collect();

        let mut fields = IndexMap::new();
        for (name, (owner, decl)) in self.collect_field_decls(class, &sources)? {
            let field = self.compile_field(&owner, &decl, None)?;
            fields.insert(name, field);
        }
        debug!(object = %class, fields = fields.len(), "compiled object fields");
        Ok(fields)
    }
}
