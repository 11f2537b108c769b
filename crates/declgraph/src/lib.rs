//! # declgraph
//!
//! Compiles declarative type registrations into a resolved GraphQL type
//! graph and lowers it into an executable `async_graphql` dynamic schema.
//!
//! Classes, fields, arguments and root operations are registered on a
//! [`Session`]. Compilation turns them into one graph node per declaration
//! and synthesizes a resolver for every field, covering argument binding,
//! injected values, lifecycle hooks and result casting.
//!
//! ## Example
//!
//! ```
//! use declgraph::{ClassRef, FieldDecl, Method, SchemaRootOptions, Session, TypeSignature};
//!
//! let session = Session::new();
//! let root = ClassRef::new("Greeter");
//! session.schema_root(&root, SchemaRootOptions::new());
//! session
//!     .query(
//!         &root,
//!         FieldDecl::method("hello", Method::sync(|_, args| {
//!             let name = args[0].as_str().unwrap_or("world");
//!             Ok(format!("hello, {name}").into())
//!         }))
//!         .param("name", TypeSignature::string())
//!         .returns(TypeSignature::string()),
//!     )
//!     .unwrap();
//!
//! let schema = session.compile_schema(&[root]).unwrap();
//! assert!(schema.sdl().unwrap().contains("hello"));
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! query_type_name = "Query"
//! mutation_type_name = "Mutation"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```
//!
//! ## Modules
//!
//! - [`session`] - Registration API and compilation context
//! - [`registry`] - Metadata registries
//! - [`inference`] - Type inference from static signatures
//! - [`resolve`] - Runtime type reference to graph type
//! - [`graph`] - Compiled nodes
//! - [`resolver`] - Resolver synthesis and hooks
//! - [`schema`] - Schema assembly and the executable schema
//! - [`config`] - Compiler configuration
//! - [`error`] - Error types

mod compiler;

pub mod config;
pub mod error;
pub mod graph;
pub mod inference;
pub mod registry;
pub mod resolve;
pub mod resolver;
pub mod schema;
pub mod session;
pub mod types;
pub mod value;

// Re-export main types
pub use config::CompilerConfig;
pub use error::{
    ArgumentError, AssemblyError, CastError, CompileError, InferenceError, ObjectTypeError,
    RegistrationError, ResolveError, ResolverError, UnionError,
};
pub use graph::{GraphNode, GraphType, ScalarNode};
pub use registry::{
    ArgDecl, EnumOptions, FieldDecl, InputFieldDecl, InputObjectTypeOptions, InterfaceTypeOptions,
    ObjectTypeOptions, SchemaRootOptions, UnionOptions,
};
pub use resolve::ResolveOptions;
pub use resolver::{
    AfterHook, CastPlan, Hook, Injector, Method, RequestContext, ResolveInfo, ResolverData,
};
pub use schema::CompiledSchema;
pub use session::Session;
pub use types::{ClassRef, EnumDef, EnumMember, NativeScalar, RuntimeType, TypeSignature};
pub use value::{Instance, RuntimeValue};

/// Result type for compilation.
pub use error::Result;
