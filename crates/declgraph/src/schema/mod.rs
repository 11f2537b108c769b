//! Schema assembly: merges the root fields of every schema root into the
//! query and mutation types and collects the reachable type graph.

mod executable;

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::{AssemblyError, Result};
use crate::graph::{GraphNode, GraphType, LazyFields, ObjectNode, ResolvedField};
use crate::registry::FieldDecl;
use crate::session::{NodeCache, Session};
use crate::types::ClassRef;
use crate::value::Instance;

/// The result of [`Session::compile_schema`].
pub struct CompiledSchema {
    pub query: Arc<ObjectNode>,
    pub mutation: Option<Arc<ObjectNode>>,
    types: Vec<GraphNode>,
    config: CompilerConfig,
    graph: Arc<NodeCache>,
}

impl CompiledSchema {
    /// Every named type reachable from the roots, roots included.
    pub fn types(&self) -> &[GraphNode] {
        &self.types
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("query", &self.query.name)
            .field("mutation", &self.mutation.as_ref().map(|m| m.name.as_str()))
            .field("types", &self.types.len())
            .finish()
    }
}

struct RootField {
    root: ClassRef,
    owner: ClassRef,
    decl: FieldDecl,
    instance: Instance,
}

impl Session {
    /// Assembles the query and mutation types from `roots`.
    ///
    /// Each root is instantiated once per call; every root resolver closes
    /// over that singleton.
    ///
    /// # Errors
    ///
    /// Returns an error if a class is not a schema root, if two root fields
    /// share a name, if no query field exists, or if any reachable type
    /// fails to compile.
    pub fn compile_schema(&self, roots: &[ClassRef]) -> Result<CompiledSchema> {
        let mut query: IndexMap<String, RootField> = IndexMap::new();
        let mut mutation: IndexMap<String, RootField> = IndexMap::new();

        for root in roots {
            let options = self
                .registries()
                .root_options(root.key())
                .ok_or_else(|| AssemblyError::NotSchemaRoot {
                    class: root.name().to_string(),
                })?;
            let instance = options
                .constructor
                .as_ref()
                .map_or_else(|| Instance::new(root), |construct| construct());

            for (name, (owner, decl)) in self.root_decls(root)? {
                let Some(category) = decl.root_category else {
                    continue;
                };
                if category.is_query() {
                    merge_root_field(&mut query, &name, root, &owner, &decl, &instance)?;
                }
                if category.is_mutation() {
                    merge_root_field(&mut mutation, &name, root, &owner, &decl, &instance)?;
                }
            }
        }

        if query.is_empty() {
            return Err(AssemblyError::NoQueryFields.into());
        }

        let config = self.config().clone();
        let query = Arc::new(self.root_node(&config.query_type_name, query)?);
        let mutation = if mutation.is_empty() {
            None
        } else {
            Some(Arc::new(self.root_node(&config.mutation_type_name, mutation)?))
        };

        let mut start = vec![GraphNode::Object(query.clone())];
        start.extend(mutation.clone().map(GraphNode::Object));
        let types = collect_types(start)?;

        debug!(
            roots = roots.len(),
            types = types.len(),
            has_mutation = mutation.is_some(),
            "compiled schema"
        );
        Ok(CompiledSchema {
            query,
            mutation,
            types,
            config,
            graph: self.cache_handle(),
        })
    }

    /// Root field declarations of one root, keyed by exposed name. Ancestors
    /// are walked oldest first so a subclass overrides an inherited field; a
    /// name declared twice by the same class is a collision.
    fn root_decls(&self, root: &ClassRef) -> Result<IndexMap<String, (ClassRef, FieldDecl)>> {
        let mut decls = IndexMap::new();
        for source in root.ancestors_oldest_first() {
            let mut seen = HashSet::new();
            for (_, decl) in self.registries().fields.get_all(source.key()) {
                if decl.root_category.is_none() {
                    continue;
                }
                let name = decl.exposed_name().to_string();
                if !seen.insert(name.clone()) {
                    return Err(AssemblyError::DuplicateRootField {
                        field: name,
                        first: source.name().to_string(),
                        second: source.name().to_string(),
                    }
                    .into());
                }
                decls.insert(name, (source.clone(), decl));
            }
        }
        Ok(decls)
    }

    fn root_node(&self, name: &str, fields: IndexMap<String, RootField>) -> Result<ObjectNode> {
        let mut compiled = IndexMap::with_capacity(fields.len());
        for (field_name, field) in fields {
            debug!(root = %field.root, field = %field_name, type_name = name, "compiling root field");
            let resolved = self.compile_field(&field.owner, &field.decl, Some(&field.instance))?;
            compiled.insert(field_name, resolved);
        }
        Ok(ObjectNode {
            name: name.to_string(),
            description: None,
            class: None,
            interfaces: Vec::new(),
            fields: LazyFields::ready(compiled),
        })
    }
}

fn merge_root_field(
    target: &mut IndexMap<String, RootField>,
    name: &str,
    root: &ClassRef,
    owner: &ClassRef,
    decl: &FieldDecl,
    instance: &Instance,
) -> Result<()> {
    match target.entry(name.to_string()) {
        Entry::Occupied(existing) => Err(AssemblyError::DuplicateRootField {
            field: name.to_string(),
            first: existing.get().root.name().to_string(),
            second: root.name().to_string(),
        }
        .into()),
        Entry::Vacant(slot) => {
            slot.insert(RootField {
                root: root.clone(),
                owner: owner.clone(),
                decl: decl.clone(),
                instance: instance.clone(),
            });
            Ok(())
        }
    }
}

/// Walks the graph from `start`, forcing every lazy field map.
fn collect_types(start: Vec<GraphNode>) -> Result<Vec<GraphNode>> {
    let mut seen: IndexMap<String, GraphNode> = IndexMap::new();
    let mut pending = start;

    while let Some(node) = pending.pop() {
        match seen.get(node.name()) {
            Some(existing) if existing.ptr_eq(&node) => continue,
            Some(_) => {
                return Err(AssemblyError::DuplicateTypeName {
                    name: node.name().to_string(),
                }
                .into());
            }
            None => {}
        }
        seen.insert(node.name().to_string(), node.clone());

        match &node {
            GraphNode::Object(object) => {
                push_fields(&mut pending, &*object.fields()?);
                pending.extend(object.interfaces.iter().cloned().map(GraphNode::Interface));
            }
            GraphNode::Interface(interface) => {
                push_fields(&mut pending, &*interface.fields()?);
                pending.extend(interface.implementations()?.into_iter().map(GraphNode::Object));
            }
            GraphNode::Union(union) => {
                pending.extend(union.members.iter().cloned().map(GraphNode::Object));
            }
            GraphNode::Input(input) => {
                pending.extend(input.fields()?.values().map(|f| named(&f.ty)));
            }
            GraphNode::Enum(_) | GraphNode::Scalar(_) => {}
        }
    }

    Ok(seen.into_values().collect())
}

fn push_fields(pending: &mut Vec<GraphNode>, fields: &IndexMap<String, ResolvedField>) {
    for field in fields.values() {
        pending.push(named(&field.ty));
        pending.extend(field.args.values().map(|arg| named(&arg.ty)));
    }
}

fn named(ty: &GraphType) -> GraphNode {
    ty.named_node().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::registry::{ObjectTypeOptions, SchemaRootOptions};
    use crate::resolver::Method;
    use crate::types::TypeSignature;

    fn greeting(property: &str) -> FieldDecl {
        FieldDecl::method(property, Method::sync(|_, _| Ok("hi".into())))
            .returns(TypeSignature::string())
    }

    fn hello() -> FieldDecl {
        greeting("hello")
    }

    #[test]
    fn test_not_a_schema_root() {
        let session = Session::new();
        let err = session.compile_schema(&[ClassRef::new("Plain")]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Assembly(AssemblyError::NotSchemaRoot { .. })
        ));
    }

    #[test]
    fn test_no_query_fields() {
        let session = Session::new();
        let root = ClassRef::new("Root");
        session.schema_root(&root, SchemaRootOptions::new());
        session
            .mutation(
                &root,
                FieldDecl::method("noop", Method::sync(|_, _| Ok(true.into())))
                    .returns(TypeSignature::boolean()),
            )
            .unwrap();

        assert!(matches!(
            session.compile_schema(&[root]).unwrap_err(),
            CompileError::Assembly(AssemblyError::NoQueryFields)
        ));
    }

    #[test]
    fn test_collision_names_both_roots() {
        let session = Session::new();
        let first = ClassRef::new("UserRoot");
        let second = ClassRef::new("PostRoot");
        for root in [&first, &second] {
            session.schema_root(root, SchemaRootOptions::new());
            session.query(root, hello()).unwrap();
        }

        let err = session.compile_schema(&[first, second]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("hello"));
        assert!(message.contains("UserRoot"));
        assert!(message.contains("PostRoot"));
    }

    #[test]
    fn test_roots_merged_and_types_collected() {
        let session = Session::new();
        let user = ClassRef::new("User");
        let users = ClassRef::new("UserRoot");
        let misc = ClassRef::new("MiscRoot");
        session.object_type(&user, ObjectTypeOptions::new());
        session
            .field(&user, FieldDecl::property("name").returns(TypeSignature::string()))
            .unwrap();
        session.schema_root(&users, SchemaRootOptions::new());
        session.schema_root(&misc, SchemaRootOptions::new());
        session
            .query(
                &users,
                FieldDecl::method("me", Method::sync(|_, _| Ok(Default::default())))
                    .returns(TypeSignature::class(&user).nullable()),
            )
            .unwrap();
        session.query_and_mutation(&misc, hello()).unwrap();

        let schema = session.compile_schema(&[users, misc]).unwrap();
        let query_fields = schema.query.fields().unwrap();
        assert_eq!(query_fields.keys().collect::<Vec<_>>(), ["me", "hello"]);
        assert_eq!(schema.mutation.as_ref().unwrap().name, "Mutation");

        let mut names: Vec<_> = schema.types().iter().map(|t| t.name().to_string()).collect();
        names.sort();
        assert_eq!(names, ["Mutation", "Query", "String", "User"]);
    }

    #[test]
    fn test_root_singleton_shared_by_fields() {
        let session = Session::new();
        let root = ClassRef::new("Root");
        let class = root.clone();
        session.schema_root(
            &root,
            SchemaRootOptions::new().constructor(move || class.instance().with("greeting", "hey")),
        );
        session.query(&root, hello()).unwrap();
        session.query(&root, greeting("hello2")).unwrap();

        let schema = session.compile_schema(&[root]).unwrap();
        let fields = schema.query.fields().unwrap();
        let first = fields["hello"].resolver.root().unwrap();
        let second = fields["hello2"].resolver.root().unwrap();
        assert_eq!(first.get("greeting").and_then(|v| v.as_str()), Some("hey"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_type_name() {
        let session = Session::new();
        let a = ClassRef::new("A");
        let b = ClassRef::new("B");
        let root = ClassRef::new("Root");
        session.object_type(&a, ObjectTypeOptions::new().name("Same"));
        session.object_type(&b, ObjectTypeOptions::new().name("Same"));
        for class in [&a, &b] {
            session
                .field(class, FieldDecl::property("id").returns(TypeSignature::id()))
                .unwrap();
        }
        session.schema_root(&root, SchemaRootOptions::new());
        session
            .query(
                &root,
                FieldDecl::method("a", Method::sync(|_, _| Ok(Default::default())))
                    .returns(TypeSignature::class(&a)),
            )
            .unwrap();
        session
            .query(
                &root,
                FieldDecl::method("b", Method::sync(|_, _| Ok(Default::default())))
                    .returns(TypeSignature::class(&b)),
            )
            .unwrap();

        assert!(matches!(
            session.compile_schema(&[root]).unwrap_err(),
            CompileError::Assembly(AssemblyError::DuplicateTypeName { .. })
        ));
    }
}
