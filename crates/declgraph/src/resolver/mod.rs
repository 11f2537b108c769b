//! Resolver synthesis.
//!
//! Every compiled field carries a [`FieldResolver`] that looks up the value
//! or method on its source, binds positional arguments, runs the lifecycle
//! hooks and casts the result to the declared class.

mod callables;
mod cast;

use std::fmt;

use futures_util::future::try_join_all;
use indexmap::IndexMap;
use tracing::trace;

pub use callables::{
    AfterHook, DiscriminateFn, Hook, Injector, Method, RequestContext, ResolveInfo, ResolverData,
};
pub use cast::CastPlan;

use crate::error::{CastError, ResolverError};
use crate::registry::FieldDecl;
use crate::session::Session;
use crate::types::ClassRef;
use crate::value::{Instance, RuntimeValue};

/// Where one positional parameter gets its value from.
#[derive(Clone)]
pub(crate) struct ParamBinding {
    name: String,
    exposed: Option<String>,
    cast: CastPlan,
    injector: Option<Injector>,
}

impl ParamBinding {
    pub(crate) fn argument(name: &str, exposed: &str, cast: CastPlan) -> Self {
        Self {
            name: name.to_string(),
            exposed: Some(exposed.to_string()),
            cast,
            injector: None,
        }
    }

    pub(crate) fn injected(name: &str, injector: Injector) -> Self {
        Self {
            name: name.to_string(),
            exposed: None,
            cast: CastPlan::Passthrough,
            injector: Some(injector),
        }
    }

    pub(crate) fn unbound(name: &str) -> Self {
        Self {
            name: name.to_string(),
            exposed: None,
            cast: CastPlan::Passthrough,
            injector: None,
        }
    }

    fn bind(&self, data: &ResolverData) -> Result<RuntimeValue, CastError> {
        if let Some(injector) = &self.injector {
            return Ok(injector.call(data));
        }
        let supplied = self
            .exposed
            .as_deref()
            .and_then(|exposed| data.args.get(exposed))
            .or_else(|| data.args.get(&self.name));
        match supplied {
            Some(value) => self.cast.apply(&self.name, value.clone()),
            None => Ok(RuntimeValue::Undefined),
        }
    }
}

impl fmt::Debug for ParamBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamBinding")
            .field("name", &self.name)
            .field("exposed", &self.exposed)
            .field("injected", &self.injector.is_some())
            .finish()
    }
}

enum Target {
    Value(RuntimeValue),
    Method(Method),
}

/// The synthesized resolver of one field.
pub struct FieldResolver {
    class: ClassRef,
    property: String,
    field_name: String,
    root: Option<Instance>,
    implementation: Option<Method>,
    params: Vec<ParamBinding>,
    before: Vec<Hook>,
    after: Vec<AfterHook>,
    result_cast: CastPlan,
}

impl FieldResolver {
    pub(crate) fn new(
        session: &Session,
        owner: &ClassRef,
        decl: &FieldDecl,
        root: Option<Instance>,
        params: Vec<ParamBinding>,
    ) -> Self {
        let registries = session.registries();
        Self {
            class: owner.clone(),
            property: decl.property.clone(),
            field_name: decl.exposed_name().to_string(),
            root,
            implementation: decl.implementation.clone(),
            params,
            before: registries.before_hooks(owner.key(), &decl.property),
            after: registries.after_hooks(owner.key(), &decl.property),
            result_cast: decl
                .ty
                .as_ref()
                .map_or(CastPlan::Passthrough, |ty| session.cast_plan(ty)),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The singleton this resolver substitutes for its source, if it
    /// belongs to a schema root.
    pub fn root(&self) -> Option<&Instance> {
        self.root.as_ref()
    }

    pub fn cast_plan(&self) -> &CastPlan {
        &self.result_cast
    }

    /// Resolves the field for `source`.
    ///
    /// Before hooks run concurrently and all must succeed before the value
    /// is looked up. After hooks observe the cast value but cannot replace
    /// it.
    ///
    /// # Errors
    ///
    /// Returns the first hook or implementation failure, or a cast error.
    pub async fn call(
        &self,
        source: RuntimeValue,
        args: IndexMap<String, RuntimeValue>,
        context: Option<RequestContext>,
        info: ResolveInfo,
    ) -> Result<RuntimeValue, ResolverError> {
        let source = match &self.root {
            Some(root) => RuntimeValue::Instance(root.clone()),
            None => source,
        };
        let data = ResolverData {
            source,
            args,
            context,
            info,
        };

        if !self.before.is_empty() {
            try_join_all(self.before.iter().map(|hook| hook.call(data.clone()))).await?;
        }

        let value = match self.target(&data.source) {
            Target::Value(value) => value,
            Target::Method(method) => {
                let args = self
                    .params
                    .iter()
                    .map(|param| param.bind(&data))
                    .collect::<Result<Vec<_>, _>>()?;
                method.call(data.source.clone(), args).await?
            }
        };
        let value = self.result_cast.apply(&self.field_name, value)?;

        if !self.after.is_empty() {
            try_join_all(
                self.after
                    .iter()
                    .map(|hook| hook.call(value.clone(), data.clone())),
            )
            .await?;
        }

        trace!(
            class = %self.class,
            field = %self.field_name,
            kind = value.kind(),
            "resolved field"
        );
        Ok(value)
    }

    /// Instance method override, then property, then the declared method.
    fn target(&self, source: &RuntimeValue) -> Target {
        if let Some(method) = source.as_instance().and_then(|i| i.method(&self.property)) {
            return Target::Method(method.clone());
        }
        if let Some(value) = source.get(&self.property) {
            return Target::Value(value.clone());
        }
        match &self.implementation {
            Some(method) => Target::Method(method.clone()),
            None => Target::Value(RuntimeValue::Undefined),
        }
    }
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldResolver")
            .field("class", &self.class)
            .field("field", &self.field_name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::registry::{ArgDecl, ObjectTypeOptions};
    use crate::types::{RuntimeType, TypeSignature};

    fn resolver_for(session: &Session, class: &ClassRef, field: &str) -> Arc<FieldResolver> {
        let node = session.compile_object(class).unwrap();
        node.field(field).unwrap().unwrap().resolver
    }

    fn args<const N: usize>(entries: [(&str, RuntimeValue); N]) -> IndexMap<String, RuntimeValue> {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[tokio::test]
    async fn test_property_read() {
        let session = Session::new();
        let user = ClassRef::new("User");
        session.object_type(&user, ObjectTypeOptions::new());
        session
            .field(&user, FieldDecl::property("name").returns(TypeSignature::string()))
            .unwrap();

        let resolver = resolver_for(&session, &user, "name");
        let source = RuntimeValue::from(user.instance().with("name", "Ada"));
        let value = resolver
            .call(source, IndexMap::new(), None, ResolveInfo::default())
            .await
            .unwrap();
        assert_eq!(value.as_str(), Some("Ada"));

        let missing = resolver
            .call(RuntimeValue::Null, IndexMap::new(), None, ResolveInfo::default())
            .await
            .unwrap();
        assert_eq!(missing, RuntimeValue::Undefined);
    }

    #[tokio::test]
    async fn test_method_binds_by_exposed_name() {
        let session = Session::new();
        let greeter = ClassRef::new("Greeter");
        session.object_type(&greeter, ObjectTypeOptions::new());
        session
            .field(
                &greeter,
                FieldDecl::method(
                    "greet",
                    Method::sync(|_, args| {
                        let name = args[0].as_str().unwrap_or("?").to_string();
                        let times = args[1].as_i64().unwrap_or(1);
                        Ok(vec![name; times as usize].join(" ").into())
                    }),
                )
                .param("name", TypeSignature::string())
                .param("times", TypeSignature::int().optional())
                .returns(TypeSignature::string()),
            )
            .unwrap();
        session.arg(&greeter, "greet", 0, ArgDecl::new().name("who"));

        let resolver = resolver_for(&session, &greeter, "greet");
        let value = resolver
            .call(
                RuntimeValue::Null,
                args([("who", "hi".into()), ("times", 2.into())]),
                None,
                ResolveInfo::default(),
            )
            .await
            .unwrap();
        assert_eq!(value.as_str(), Some("hi hi"));
    }

    #[tokio::test]
    async fn test_instance_override_wins() {
        let session = Session::new();
        let counter = ClassRef::new("Counter");
        session.object_type(&counter, ObjectTypeOptions::new());
        session
            .field(
                &counter,
                FieldDecl::method("value", Method::sync(|_, _| Ok(1.into())))
                    .returns(TypeSignature::int()),
            )
            .unwrap();

        let resolver = resolver_for(&session, &counter, "value");
        let overridden = counter
            .instance()
            .with_method("value", Method::sync(|_, _| Ok(42.into())));

        let value = resolver
            .call(overridden.into(), IndexMap::new(), None, ResolveInfo::default())
            .await
            .unwrap();
        assert_eq!(value.as_i64(), Some(42));

        let value = resolver
            .call(counter.instance().into(), IndexMap::new(), None, ResolveInfo::default())
            .await
            .unwrap();
        assert_eq!(value.as_i64(), Some(1));
    }

    #[tokio::test]
    async fn test_failing_before_hook_skips_implementation() {
        let session = Session::new();
        let secret = ClassRef::new("Secret");
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        session.object_type(&secret, ObjectTypeOptions::new());
        session
            .field(
                &secret,
                FieldDecl::method(
                    "code",
                    Method::sync(move |_, _| {
                        counted.fetch_add(1, Ordering::SeqCst);
                        Ok("1234".into())
                    }),
                )
                .returns(TypeSignature::string()),
            )
            .unwrap();
        session.before(&secret, "code", Hook::sync(|_| Ok(())));
        session.before(&secret, "code", Hook::sync(|_| Err(ResolverError::failed("denied"))));

        let resolver = resolver_for(&session, &secret, "code");
        let err = resolver
            .call(secret.instance().into(), IndexMap::new(), None, ResolveInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "denied");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_after_hooks_observe_value() {
        let session = Session::new();
        let item = ClassRef::new("Item");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        session.object_type(&item, ObjectTypeOptions::new());
        session
            .field(&item, FieldDecl::property("label").returns(TypeSignature::string()))
            .unwrap();
        session.after(
            &item,
            "label",
            AfterHook::sync(move |value, data| {
                if let Ok(mut seen) = sink.lock() {
                    seen.push((value.as_str().map(str::to_string), data.info.field_name));
                }
                Ok(())
            }),
        );

        let resolver = resolver_for(&session, &item, "label");
        let info = ResolveInfo {
            field_name: "label".into(),
            ..Default::default()
        };
        let value = resolver
            .call(item.instance().with("label", "x").into(), IndexMap::new(), None, info)
            .await
            .unwrap();

        assert_eq!(value.as_str(), Some("x"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Some("x".to_string()), "label".to_string())]
        );
    }

    #[tokio::test]
    async fn test_injected_context_and_source() {
        struct Viewer(&'static str);

        let session = Session::new();
        let doc = ClassRef::new("Doc");
        session.object_type(&doc, ObjectTypeOptions::new());
        session
            .field(
                &doc,
                FieldDecl::method(
                    "describe",
                    Method::sync(|_, args| {
                        let viewer = args[0].downcast_ref::<Viewer>().map_or("anon", |v| v.0);
                        let title = args[1].get("title").and_then(RuntimeValue::as_str).unwrap_or("");
                        Ok(format!("{viewer} reads {title}").into())
                    }),
                )
                .untyped_param("viewer")
                .untyped_param("doc")
                .returns(TypeSignature::string()),
            )
            .unwrap();
        session.inject(&doc, "describe", 0, Injector::context());
        session.inject(&doc, "describe", 1, Injector::source());

        let node = session.compile_object(&doc).unwrap();
        let field = node.field("describe").unwrap().unwrap();
        assert!(field.args.is_empty());

        let value = field
            .resolver
            .call(
                doc.instance().with("title", "Dune").into(),
                IndexMap::new(),
                Some(RequestContext::new(Viewer("ada"))),
                ResolveInfo::default(),
            )
            .await
            .unwrap();
        assert_eq!(value.as_str(), Some("ada reads Dune"));
    }

    #[tokio::test]
    async fn test_result_cast_to_declared_class() {
        let session = Session::new();
        let foo = ClassRef::new("Foo");
        let holder = ClassRef::new("Holder");
        session.object_type(&foo, ObjectTypeOptions::new());
        session.object_type(&holder, ObjectTypeOptions::new());
        session
            .field(&foo, FieldDecl::property("x").returns(TypeSignature::int()))
            .unwrap();
        session
            .field(
                &holder,
                FieldDecl::method(
                    "foos",
                    Method::sync(|_, _| {
                        Ok(RuntimeValue::List(vec![
                            RuntimeValue::object([("x", RuntimeValue::from(1))]),
                            RuntimeValue::object([("x", RuntimeValue::from(2))]),
                        ]))
                    }),
                )
                .ty(RuntimeType::list(&foo)),
            )
            .unwrap();

        let resolver = resolver_for(&session, &holder, "foos");
        let value = resolver
            .call(holder.instance().into(), IndexMap::new(), None, ResolveInfo::default())
            .await
            .unwrap();
        let items = value.as_list().unwrap();
        assert!(items.iter().all(|v| v.as_instance().is_some_and(|i| i.class() == &foo)));
        assert_eq!(items[1].get("x").and_then(RuntimeValue::as_i64), Some(2));
    }

    #[tokio::test]
    async fn test_nested_list_fails_at_resolve_time() {
        let session = Session::new();
        let foo = ClassRef::new("Foo");
        let holder = ClassRef::new("Holder");
        session.object_type(&foo, ObjectTypeOptions::new());
        session.object_type(&holder, ObjectTypeOptions::new());
        session
            .field(
                &holder,
                FieldDecl::method(
                    "foos",
                    Method::sync(|_, _| Ok(RuntimeValue::List(vec![RuntimeValue::List(vec![])]))),
                )
                .ty(RuntimeType::list(&foo)),
            )
            .unwrap();

        let resolver = resolver_for(&session, &holder, "foos");
        let err = resolver
            .call(holder.instance().into(), IndexMap::new(), None, ResolveInfo::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolverError::Cast(CastError::NestedList { .. })));
    }

    #[test]
    fn test_async_method_blocking() {
        let session = Session::new();
        let slow = ClassRef::new("Slow");
        session.object_type(&slow, ObjectTypeOptions::new());
        session
            .field(
                &slow,
                FieldDecl::method(
                    "answer",
                    Method::new(|_, _| async {
                        tokio::task::yield_now().await;
                        Ok(RuntimeValue::from(42))
                    }),
                )
                .returns(TypeSignature::int()),
            )
            .unwrap();

        let resolver = resolver_for(&session, &slow, "answer");
        let value = tokio_test::block_on(resolver.call(
            slow.instance().into(),
            IndexMap::new(),
            None,
            ResolveInfo::default(),
        ))
        .unwrap();
        assert_eq!(value.as_i64(), Some(42));
    }
}
