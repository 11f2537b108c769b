//! The type resolver: runtime type reference to graph type.

use tracing::trace;

use crate::error::{ResolveError, Result};
use crate::graph::{GraphNode, GraphType};
use crate::session::Session;
use crate::types::RuntimeType;

/// Context of one resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub is_nullable: bool,
    pub item_nullable: bool,
    pub allow_thunk: bool,
    pub is_argument: bool,
}

impl ResolveOptions {
    /// Output position, thunks allowed, non-null.
    pub fn output() -> Self {
        Self {
            allow_thunk: true,
            ..Default::default()
        }
    }

    /// Argument position, thunks allowed, non-null.
    pub fn argument() -> Self {
        Self {
            allow_thunk: true,
            is_argument: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }

    #[must_use]
    pub fn item_nullable(mut self, item_nullable: bool) -> Self {
        self.item_nullable = item_nullable;
        self
    }

    fn wrap(self, node: GraphNode) -> GraphType {
        self.wrap_type(GraphType::Named(node))
    }

    fn wrap_type(self, ty: GraphType) -> GraphType {
        if self.is_nullable { ty } else { ty.non_null() }
    }
}

impl Session {
    /// Resolves a runtime type reference to a graph type.
    ///
    /// Classes are looked up as union, interface, input (argument position
    /// only) and object type, in that order. A thunk is invoked once; the
    /// reference it returns may not be another thunk.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is not registered, or if compiling
    /// the referenced node fails.
    pub fn resolve_type(&self, runtime_type: &RuntimeType, options: ResolveOptions) -> Result<GraphType> {
        trace!(reference = %runtime_type, ?options, "resolving type");
        match runtime_type {
            RuntimeType::Node(node) => Ok(options.wrap(node.clone())),
            RuntimeType::Scalar(scalar) => Ok(options.wrap(scalar.node())),
            RuntimeType::Array(items) => {
                let [item] = items.as_slice() else {
                    return Err(ResolveError::ListArity { count: items.len() }.into());
                };
                let item_options = ResolveOptions {
                    is_nullable: options.item_nullable,
                    item_nullable: false,
                    ..options
                };
                let item = self.resolve_type(item, item_options)?;
                Ok(options.wrap_type(item.list()))
            }
            RuntimeType::Enum(def) => {
                let node = self.compile_enum(def)?;
                Ok(options.wrap(GraphNode::Enum(node)))
            }
            RuntimeType::Class(class) => {
                let key = class.key();
                let node = if self.is_union(key) {
                    GraphNode::Union(self.compile_union(class)?)
                } else if self.is_interface(key) {
                    GraphNode::Interface(self.compile_interface(class)?)
                } else if options.is_argument && self.is_input_type(key) {
                    GraphNode::Input(self.compile_input(class)?)
                } else if self.is_object_type(key) {
                    GraphNode::Object(self.compile_object(class)?)
                } else {
                    return Err(ResolveError::Unresolvable {
                        reference: class.name().to_string(),
                    }
                    .into());
                };
                Ok(options.wrap(node))
            }
            RuntimeType::Thunk(thunk) if options.allow_thunk => {
                let inner = thunk.call();
                if matches!(inner, RuntimeType::Thunk(_)) {
                    return Err(ResolveError::NestedThunk.into());
                }
                self.resolve_type(
                    &inner,
                    ResolveOptions {
                        allow_thunk: false,
                        ..options
                    },
                )
            }
            RuntimeType::Thunk(_) => Err(ResolveError::NestedThunk.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::registry::{InputFieldDecl, InputObjectTypeOptions, ObjectTypeOptions};
    use crate::types::{ClassRef, EnumDef};

    #[test]
    fn test_scalars_default_to_non_null() {
        let session = Session::new();
        let ty = session
            .resolve_type(&RuntimeType::string(), ResolveOptions::output())
            .unwrap();
        assert_eq!(ty.to_string(), "String!");

        let ty = session
            .resolve_type(&RuntimeType::date(), ResolveOptions::output().nullable(true))
            .unwrap();
        assert_eq!(ty.to_string(), "DateTime");
    }

    #[test]
    fn test_list_wrapping() {
        let session = Session::new();
        let list = RuntimeType::list(RuntimeType::number());

        let ty = session.resolve_type(&list, ResolveOptions::output()).unwrap();
        assert_eq!(ty.to_string(), "[Float!]!");

        let ty = session
            .resolve_type(&list, ResolveOptions::output().nullable(true).item_nullable(true))
            .unwrap();
        assert_eq!(ty.to_string(), "[Float]");
    }

    #[test]
    fn test_list_arity() {
        let session = Session::new();
        let bad = RuntimeType::Array(vec![RuntimeType::string(), RuntimeType::int()]);
        let err = session.resolve_type(&bad, ResolveOptions::output()).unwrap_err();
        assert!(matches!(err, CompileError::Resolve(ResolveError::ListArity { count: 2 })));
    }

    #[test]
    fn test_unregistered_class() {
        let session = Session::new();
        let ghost = ClassRef::new("Ghost");
        let err = session
            .resolve_type(&RuntimeType::from(&ghost), ResolveOptions::output())
            .unwrap_err();
        assert!(err.to_string().contains("Ghost"));
        assert!(err.to_string().contains("neither a registered type nor a thunk"));
    }

    #[test]
    fn test_thunk_resolves_once() {
        let session = Session::new();
        let foo = ClassRef::new("Foo");
        session.object_type(&foo, ObjectTypeOptions::new());

        let ty = session
            .resolve_type(&RuntimeType::lazy(&foo), ResolveOptions::output())
            .unwrap();
        assert_eq!(ty.to_string(), "Foo!");
    }

    #[test]
    fn test_nested_thunk_rejected() {
        let session = Session::new();
        let foo = ClassRef::new("Foo");
        session.object_type(&foo, ObjectTypeOptions::new());
        let nested = RuntimeType::thunk({
            let foo = foo.clone();
            move || RuntimeType::lazy(&foo)
        });

        let err = session.resolve_type(&nested, ResolveOptions::output()).unwrap_err();
        assert!(matches!(err, CompileError::Resolve(ResolveError::NestedThunk)));
    }

    #[test]
    fn test_argument_position_prefers_input() {
        let session = Session::new();
        let point = ClassRef::new("Point");
        session.duplex_object_type(&point, ObjectTypeOptions::new());
        session.input_field(&point, InputFieldDecl::new("x").ty(RuntimeType::int()));

        let output = session
            .resolve_type(&RuntimeType::from(&point), ResolveOptions::output())
            .unwrap();
        let input = session
            .resolve_type(&RuntimeType::from(&point), ResolveOptions::argument())
            .unwrap();

        assert!(matches!(output.named_node(), GraphNode::Object(_)));
        assert!(matches!(input.named_node(), GraphNode::Input(_)));
        assert_eq!(input.to_string(), "PointInput!");

        let only_input = ClassRef::new("Filter");
        session.input_object_type(&only_input, InputObjectTypeOptions::new());
        assert!(session
            .resolve_type(&RuntimeType::from(&only_input), ResolveOptions::output())
            .is_err());
    }

    #[test]
    fn test_unregistered_enum() {
        let session = Session::new();
        let def = EnumDef::numeric(["A"]);
        let err = session
            .resolve_type(&RuntimeType::from(&def), ResolveOptions::output())
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::Resolve(ResolveError::UnregisteredEnum { .. })
        ));
    }
}
