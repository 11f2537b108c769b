//! Per-category compilers.
//!
//! Each compiler is a method on [`Session`](crate::Session) that first
//! consults the session's node cache, so every declaration compiles to
//! exactly one node. Object and interface field maps are built lazily, which
//! lets a type reference itself or a type whose fields are not compiled yet.

mod args;
mod enums;
mod field;
mod input;
mod interface;
mod object;
mod union;

use indexmap::IndexMap;

use crate::error::{CompileError, InferenceError, ObjectTypeError, ResolveError};
use crate::inference::Uninferable;
use crate::registry::FieldDecl;
use crate::session::Session;
use crate::types::ClassRef;

impl Session {
    /// Field declarations visible through `sources`, later sources winning.
    ///
    /// Root fields are skipped on schema roots and rejected everywhere else.
    fn collect_field_decls(
        &self,
        class: &ClassRef,
        sources: &[ClassRef],
    ) -> Result<IndexMap<String, (ClassRef, FieldDecl)>, CompileError> {
        let is_root = self.is_schema_root(class.key());
        let mut decls = IndexMap::new();
        for source in sources {
            for (_, decl) in self.registries().fields.get_all(source.key()) {
                if decl.root_category.is_some() {
                    if is_root {
                        continue;
                    }
                    return Err(ObjectTypeError::RootFieldOnNonRoot {
                        class: class.name().to_string(),
                        field: decl.property.clone(),
                    }
                    .into());
                }
                decls.insert(decl.exposed_name().to_string(), (source.clone(), decl));
            }
        }
        Ok(decls)
    }
}

pub(crate) fn inference_error(
    class: &ClassRef,
    field: &str,
    shape: Option<Uninferable>,
) -> CompileError {
    let class = class.name().to_string();
    let field = field.to_string();
    match shape {
        Some(shape) => InferenceError::Uninferable {
            class,
            field,
            shape: shape.describe(),
        },
        None => InferenceError::Undetermined { class, field },
    }
    .into()
}

/// Attributes a resolution failure to the field that triggered it.
pub(crate) fn in_field(class: &ClassRef, field: &str, err: CompileError) -> CompileError {
    match err {
        CompileError::Resolve(source @ ResolveError::InField { .. }) => source.into(),
        CompileError::Resolve(source) => ResolveError::InField {
            class: class.name().to_string(),
            field: field.to_string(),
            source: Box::new(source),
        }
        .into(),
        other => other,
    }
}
