use std::sync::Arc;

use tracing::debug;

use crate::error::{ResolveError, Result, UnionError};
use crate::graph::{Discriminator, GraphNode, UnionNode};
use crate::resolve::ResolveOptions;
use crate::session::Session;
use crate::types::{ClassRef, RuntimeType};

impl Session {
    /// Compiles a registered union into its node, resolving every member.
    ///
    /// # Errors
    ///
    /// Returns an error if `class` is not a union, or if a member does not
    /// resolve to an object type.
    pub fn compile_union(&self, class: &ClassRef) -> Result<Arc<UnionNode>> {
        if let Some(node) = self.cache().unions.get(&class.key()) {
            return Ok(node.value().clone());
        }

        let options = self
            .registries()
            .union_options(class.key())
            .ok_or_else(|| ResolveError::Unresolvable {
                reference: class.name().to_string(),
            })?;
        let name = options.name.unwrap_or_else(|| class.name().to_string());

        let mut member_classes = Vec::new();
        let mut members = Vec::new();
        for member in options.types.resolve() {
            if self.is_union(member.key()) || self.is_interface(member.key()) {
                return Err(UnionError::NonObjectMember {
                    union: name,
                    member: member.name().to_string(),
                }
                .into());
            }
            let ty = self.resolve_type(
                &RuntimeType::Class(member.clone()),
                ResolveOptions::output().nullable(true),
            )?;
            match ty.named_node() {
                GraphNode::Object(node) => {
                    member_classes.push((member, node.name.clone()));
                    members.push(node.clone());
                }
                other => {
                    return Err(UnionError::NonObjectMember {
                        union: name,
                        member: other.name().to_string(),
                    }
                    .into());
                }
            }
        }

        let discriminator = match options.resolve_type {
            Some(resolve) => Discriminator::Custom {
                resolve,
                session: self.downgrade(),
            },
            None => Discriminator::Members(member_classes),
        };

        let node = Arc::new(UnionNode {
            name,
            description: options.description,
            class: class.clone(),
            members,
            discriminator,
        });
        debug!(union = %node.name, members = node.members.len(), "compiled union type");

        Ok(self
            .cache()
            .unions
            .entry(class.key())
            .or_insert(node)
            .value()
            .clone())
    }
}
