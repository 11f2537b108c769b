//! Integration tests for type graph compilation: node identity, duplex
//! types, configuration and the generated SDL.

use std::sync::Arc;

use declgraph::{
    ClassRef, CompileError, CompilerConfig, FieldDecl, Method, ObjectTypeOptions, ResolveOptions,
    RuntimeType, SchemaRootOptions, Session, TypeSignature,
};
use serde_json::json;

fn echo() -> Method {
    Method::sync(|_, args| Ok(args.into_iter().next().unwrap_or_default()))
}

/// Registers an `Api` root with a single `ping` query.
fn ping_root(session: &Session) -> ClassRef {
    let api = ClassRef::new("Api");
    session.schema_root(&api, SchemaRootOptions::new());
    session
        .query(
            &api,
            FieldDecl::method("ping", Method::sync(|_, _| Ok("pong".into())))
                .returns(TypeSignature::string()),
        )
        .unwrap();
    api
}

// =============================================================================
// Node identity
// =============================================================================

#[test]
fn test_sessions_compile_independent_graphs() {
    let user = ClassRef::new("User");
    let first = Session::new();
    let second = Session::new();
    for session in [&first, &second] {
        session.object_type(&user, ObjectTypeOptions::new());
        session
            .field(&user, FieldDecl::property("id").returns(TypeSignature::id()))
            .unwrap();
    }

    let a = first
        .resolve_type(&RuntimeType::from(&user), ResolveOptions::output())
        .unwrap();
    let a_again = first
        .resolve_type(&RuntimeType::from(&user), ResolveOptions::output())
        .unwrap();
    let b = second
        .resolve_type(&RuntimeType::from(&user), ResolveOptions::output())
        .unwrap();

    assert!(a.named_node().ptr_eq(a_again.named_node()));
    assert!(!a.named_node().ptr_eq(b.named_node()));
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn test_mutually_recursive_types_compile() {
    let session = Session::new();
    let author = ClassRef::new("Author");
    let book = ClassRef::new("Book");
    session.object_type(&author, ObjectTypeOptions::new());
    session.object_type(&book, ObjectTypeOptions::new());
    session
        .field(&author, FieldDecl::property("books").ty(RuntimeType::list(RuntimeType::lazy(&book))))
        .unwrap();
    session
        .field(&book, FieldDecl::property("author").ty(RuntimeType::lazy(&author)))
        .unwrap();

    let ty = session
        .resolve_type(&RuntimeType::from(&author), ResolveOptions::output())
        .unwrap();
    let node = ty.named_node().as_object().unwrap().clone();
    let books = node.field("books").unwrap().unwrap();
    assert_eq!(books.ty.to_string(), "[Book!]!");

    let book_node = books.ty.named_node().as_object().unwrap().clone();
    let back = book_node.field("author").unwrap().unwrap();
    assert!(back.ty.named_node().ptr_eq(ty.named_node()));
}

#[test]
fn test_recursive_nodes_freed_with_session() {
    let session = Session::new();
    let author = ClassRef::new("Author");
    let book = ClassRef::new("Book");
    session.object_type(&author, ObjectTypeOptions::new());
    session.object_type(&book, ObjectTypeOptions::new());
    session
        .field(&author, FieldDecl::property("book").ty(RuntimeType::lazy(&book)))
        .unwrap();
    session
        .field(&book, FieldDecl::property("author").ty(RuntimeType::lazy(&author)))
        .unwrap();

    let ty = session
        .resolve_type(&RuntimeType::from(&author), ResolveOptions::output())
        .unwrap();
    let author_node = ty.named_node().as_object().unwrap().clone();
    let book_node = author_node
        .field("book")
        .unwrap()
        .unwrap()
        .ty
        .named_node()
        .as_object()
        .unwrap()
        .clone();
    assert!(book_node.fields().unwrap().contains_key("author"));

    let author_weak = Arc::downgrade(&author_node);
    let book_weak = Arc::downgrade(&book_node);
    drop((ty, author_node, book_node));
    assert!(author_weak.upgrade().is_some());

    drop(session);
    assert!(author_weak.upgrade().is_none());
    assert!(book_weak.upgrade().is_none());
}

#[tokio::test]
async fn test_executable_outlives_session() {
    let session = Session::new();
    let api = ping_root(&session);
    let point = ClassRef::new("Point");
    session.duplex_object_type(&point, ObjectTypeOptions::new());
    session
        .duplex_field(&point, FieldDecl::property("x").returns(TypeSignature::int()))
        .unwrap();
    session
        .query(
            &api,
            FieldDecl::method("mirror", echo())
                .param("point", TypeSignature::class(&point))
                .returns(TypeSignature::class(&point)),
        )
        .unwrap();

    let schema = session.compile_schema(&[api]).unwrap().executable().unwrap();
    drop(session);

    let response = schema.execute("{ mirror(point: { x: 7 }) { x } }").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap(), json!({ "mirror": { "x": 7 } }));
}

// =============================================================================
// Duplex types
// =============================================================================

#[tokio::test]
async fn test_duplex_type_round_trip() {
    let session = Session::new();
    let api = ping_root(&session);
    let point = ClassRef::new("Point");
    session.duplex_object_type(&point, ObjectTypeOptions::new());
    session
        .duplex_field(&point, FieldDecl::property("x").returns(TypeSignature::int()))
        .unwrap();
    session
        .duplex_field(&point, FieldDecl::property("y").returns(TypeSignature::int()))
        .unwrap();
    session
        .query(
            &api,
            FieldDecl::method("mirror", echo())
                .param("point", TypeSignature::class(&point))
                .returns(TypeSignature::class(&point)),
        )
        .unwrap();

    let compiled = session.compile_schema(&[api]).unwrap();
    let names: Vec<&str> = compiled.types().iter().map(|t| t.name()).collect();
    assert!(names.contains(&"Point"));
    assert!(names.contains(&"PointInput"));

    let sdl = compiled.sdl().unwrap();
    assert!(sdl.contains("input PointInput"));
    assert!(sdl.contains("point: PointInput!"), "{sdl}");

    let schema = compiled.executable().unwrap();
    let response = schema.execute("{ mirror(point: { x: 1 }) { x y } }").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "mirror": { "x": 1, "y": null } })
    );
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_from_toml_renames_roots() {
    let config = CompilerConfig::from_toml_str(
        r#"
        query_type_name = "RootQuery"
        max_depth = 4
        "#,
    )
    .unwrap();
    assert_eq!(config.mutation_type_name, "Mutation");

    let session = Session::with_config(config);
    let api = ping_root(&session);
    let compiled = session.compile_schema(&[api]).unwrap();
    assert_eq!(compiled.query.name, "RootQuery");
    assert!(compiled.mutation.is_none());
    assert_eq!(compiled.config().max_depth, 4);
    assert!(compiled.sdl().unwrap().contains("type RootQuery"));
}

#[test]
fn test_config_rejects_same_root_names() {
    let err = CompilerConfig::from_toml_str(
        r#"
        query_type_name = "Root"
        mutation_type_name = "Root"
        "#,
    )
    .unwrap_err();
    assert!(err.contains("must differ"));
}

#[tokio::test]
async fn test_depth_limit_enforced() {
    let session = Session::with_config(CompilerConfig {
        max_depth: 3,
        ..Default::default()
    });
    let api = ping_root(&session);
    let node = ClassRef::new("Node");
    session.object_type(&node, ObjectTypeOptions::new());
    session
        .field(&node, FieldDecl::property("next").ty(RuntimeType::lazy(&node)).nullable(true))
        .unwrap();
    session
        .query(
            &api,
            FieldDecl::method("head", Method::sync(|_, _| Ok(declgraph::RuntimeValue::Null)))
                .ty(RuntimeType::from(&node))
                .nullable(true),
        )
        .unwrap();

    let schema = session.compile_schema(&[api]).unwrap().executable().unwrap();
    let shallow = schema.execute("{ head { next { __typename } } }").await;
    assert!(shallow.errors.is_empty(), "{:?}", shallow.errors);
    let deep = schema
        .execute("{ head { next { next { next { next { __typename } } } } } }")
        .await;
    assert!(!deep.errors.is_empty());
}

// =============================================================================
// Failures surface at compile time
// =============================================================================

#[test]
fn test_unknown_field_type_names_field() {
    let session = Session::new();
    let api = ping_root(&session);
    let ghost = ClassRef::new("Ghost");
    session
        .query(
            &api,
            FieldDecl::method("haunt", echo()).ty(RuntimeType::from(&ghost)),
        )
        .unwrap();

    let err = session.compile_schema(&[api]).unwrap_err();
    assert!(matches!(err, CompileError::Resolve(_)), "{err:?}");
    assert!(err.to_string().starts_with("Api.haunt: "), "{err}");
}

#[test]
fn test_deprecations_in_sdl() {
    let session = Session::new();
    let api = ping_root(&session);
    session
        .query(
            &api,
            FieldDecl::method("legacy", Method::sync(|_, _| Ok("old".into())))
                .returns(TypeSignature::string())
                .deprecated("use ping"),
        )
        .unwrap();

    let sdl = session.compile_schema(&[api]).unwrap().sdl().unwrap();
    assert!(sdl.contains("use ping"), "{sdl}");
}
