use std::sync::Arc;

use tracing::trace;

use super::{in_field, inference_error};
use crate::error::{ResolveError, Result};
use crate::graph::ResolvedField;
use crate::inference::infer_type;
use crate::registry::FieldDecl;
use crate::resolve::ResolveOptions;
use crate::resolver::FieldResolver;
use crate::session::Session;
use crate::types::ClassRef;
use crate::value::Instance;

impl Session {
    /// Compiles one output field declared by `owner`.
    ///
    /// Inference always runs; an explicit type takes precedence over the
    /// inferred one, but the inferred nullability still applies unless the
    /// declaration overrides it. Root fields receive the schema singleton
    /// that replaces their source.
    pub(crate) fn compile_field(
        &self,
        owner: &ClassRef,
        decl: &FieldDecl,
        root: Option<&Instance>,
    ) -> Result<ResolvedField> {
        let inferred = infer_type(decl.returns.as_ref());
        let nullable = decl.nullable.unwrap_or(inferred.is_nullable);
        let options = ResolveOptions::output()
            .nullable(nullable)
            .item_nullable(decl.item_nullable);

        let Some(runtime_type) = decl.ty.clone().or_else(|| inferred.runtime_type.clone()) else {
            return Err(inference_error(owner, &decl.property, inferred.uninferable));
        };

        let ty = self
            .resolve_type(&runtime_type, options)
            .map_err(|err| in_field(owner, &decl.property, err))?;
        if !ty.named_node().is_output_type() {
            if inferred.uninferable.is_some() {
                return Err(inference_error(owner, &decl.property, inferred.uninferable));
            }
            return Err(ResolveError::NotOutputType {
                class: owner.name().to_string(),
                field: decl.property.clone(),
                ty: ty.to_string(),
            }
            .into());
        }

        let (args, params) = self.compile_args(owner, decl)?;
        let resolver = FieldResolver::new(self, owner, decl, root.cloned(), params);
        trace!(class = %owner, field = %decl.exposed_name(), ty = %ty, "compiled field");

        Ok(ResolvedField {
            name: decl.exposed_name().to_string(),
            property: decl.property.clone(),
            ty,
            args,
            resolver: Arc::new(resolver),
            description: decl.description.clone(),
            deprecation_reason: decl.deprecation_reason.clone(),
        })
    }
}
