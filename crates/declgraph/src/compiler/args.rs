use indexmap::IndexMap;
use tracing::trace;

use crate::error::{ArgumentError, Result};
use crate::graph::ResolvedArg;
use crate::inference::infer_type;
use crate::registry::FieldDecl;
use crate::resolve::ResolveOptions;
use crate::resolver::ParamBinding;
use crate::session::Session;
use crate::types::ClassRef;

impl Session {
    /// Compiles the argument map of a method field and the positional
    /// bindings its resolver uses.
    ///
    /// Injected parameters never appear in the argument map. With
    /// `only_decorated_args`, parameters without an argument declaration are
    /// skipped as well and receive `undefined` at call time.
    pub(crate) fn compile_args(
        &self,
        owner: &ClassRef,
        decl: &FieldDecl,
    ) -> Result<(IndexMap<String, ResolvedArg>, Vec<ParamBinding>)> {
        let registries = self.registries();
        let mut args = IndexMap::new();
        let mut bindings = Vec::with_capacity(decl.params.len());

        for (index, param) in decl.params.iter().enumerate() {
            let key = (decl.property.clone(), index);
            let arg = registries.args.get(owner.key(), &key);
            let injector = registries.injectors.get(owner.key(), &key);

            match (arg, injector) {
                (Some(_), Some(_)) => {
                    return Err(ArgumentError::InjectedArgument {
                        class: owner.name().to_string(),
                        field: decl.property.clone(),
                        index,
                    }
                    .into());
                }
                (None, Some(injector)) => {
                    bindings.push(ParamBinding::injected(&param.name, injector));
                }
                (None, None) if decl.only_decorated_args => {
                    bindings.push(ParamBinding::unbound(&param.name));
                }
                (arg, None) => {
                    let arg = arg.unwrap_or_default();
                    let inferred = infer_type(param.signature.as_ref());
                    let nullable = arg.nullable || inferred.is_nullable;

                    let Some(runtime_type) = arg.ty.clone().or(inferred.runtime_type) else {
                        let reason = match inferred.uninferable {
                            Some(shape) => format!(
                                "the {} type cannot be inferred, provide an explicit type",
                                shape.describe()
                            ),
                            None => "no explicit type and no inferable signature".to_string(),
                        };
                        return Err(ArgumentError::Unresolvable {
                            class: owner.name().to_string(),
                            field: decl.property.clone(),
                            index,
                            reason,
                        }
                        .into());
                    };

                    let ty = self
                        .resolve_type(&runtime_type, ResolveOptions::argument().nullable(nullable))
                        .map_err(|err| ArgumentError::Unresolvable {
                            class: owner.name().to_string(),
                            field: decl.property.clone(),
                            index,
                            reason: err.to_string(),
                        })?;
                    if !ty.named_node().is_input_type() {
                        return Err(ArgumentError::NotInputType {
                            class: owner.name().to_string(),
                            field: decl.property.clone(),
                            index,
                            ty: ty.to_string(),
                        }
                        .into());
                    }

                    let name = arg.name.clone().unwrap_or_else(|| param.name.clone());
                    trace!(class = %owner, field = %decl.property, arg = %name, ty = %ty, "compiled argument");

                    bindings.push(ParamBinding::argument(
                        &param.name,
                        &name,
                        self.cast_plan(&runtime_type),
                    ));
                    args.insert(
                        name.clone(),
                        ResolvedArg {
                            name,
                            ty,
                            description: arg.description,
                            default_value: arg.default_value,
                        },
                    );
                }
            }
        }

        Ok((args, bindings))
    }
}
