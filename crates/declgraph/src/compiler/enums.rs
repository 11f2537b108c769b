use std::sync::Arc;

use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::graph::{EnumNode, EnumValueNode};
use crate::session::Session;
use crate::types::EnumDef;

impl Session {
    /// Compiles a registered enum into its node.
    ///
    /// # Errors
    ///
    /// Returns an error if `def` was never registered in this session.
    pub fn compile_enum(&self, def: &EnumDef) -> Result<Arc<EnumNode>> {
        if let Some(node) = self.cache().enums.get(&def.key()) {
            return Ok(node.value().clone());
        }

        let options = self
            .registries()
            .enum_options(def.key())
            .ok_or_else(|| ResolveError::UnregisteredEnum {
                reference: format!("enum{}", def.key()),
            })?;

        let values = def
            .members()
            .iter()
            .map(|member| EnumValueNode {
                name: member.name.clone(),
                value: member.value.clone(),
                description: member.description.clone(),
                deprecation_reason: member.deprecation_reason.clone(),
            })
            .collect::<Vec<_>>();

        let node = Arc::new(EnumNode {
            name: options.name,
            description: options.description,
            def: def.clone(),
            values,
        });
        debug!(name = %node.name, values = node.values.len(), "compiled enum type");

        Ok(self
            .cache()
            .enums
            .entry(def.key())
            .or_insert(node)
            .value()
            .clone())
    }
}
