use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ObjectTypeError, Result};
use crate::graph::{Discriminator, InterfaceNode, LazyFields, ResolvedField};
use crate::session::Session;
use crate::types::ClassRef;

impl Session {
    /// Compiles a registered interface into its node.
    ///
    /// # Errors
    ///
    /// Returns an error if `class` is not registered as an interface.
    pub fn compile_interface(&self, class: &ClassRef) -> Result<Arc<InterfaceNode>> {
        if let Some(node) = self.cache().interfaces.get(&class.key()) {
            return Ok(node.value().clone());
        }

        let options = self
            .registries()
            .interface_options(class.key())
            .ok_or_else(|| ObjectTypeError::UnregisteredInterface {
                class: class.name().to_string(),
                interface: class.name().to_string(),
            })?;

        let session = self.downgrade();
        let discriminator = match options.resolve_type {
            Some(resolve) => Discriminator::Custom {
                resolve,
                session: session.clone(),
            },
            None => Discriminator::Implementors {
                interface: class.clone(),
                session: session.clone(),
            },
        };
        let fields = {
            let session = session.clone();
            let class = class.clone();
            LazyFields::new(move || session.upgrade()?.interface_fields(&class))
        };

        let node = Arc::new(InterfaceNode {
            name: options.name.unwrap_or_else(|| class.name().to_string()),
            description: options.description,
            class: class.clone(),
            fields,
            discriminator,
            session,
        });
        debug!(interface = %node.name, "compiled interface type");

        Ok(self
            .cache()
            .interfaces
            .entry(class.key())
            .or_insert(node)
            .value()
            .clone())
    }

    fn interface_fields(&self, class: &ClassRef) -> Result<IndexMap<String, ResolvedField>> {
        let sources = class.ancestors_oldest_first();
        let mut fields = IndexMap::new();
        for (name, (owner, decl)) in self.collect_field_decls(class, &sources)? {
            let field = self.compile_field(&owner, &decl, None)?;
            fields.insert(name, field);
        }
        Ok(fields)
    }
}
