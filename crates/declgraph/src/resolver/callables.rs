//! Callables supplied at registration time: field methods, lifecycle hooks,
//! injectors and custom discriminators.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use indexmap::IndexMap;

use crate::error::ResolverError;
use crate::types::RuntimeType;
use crate::value::RuntimeValue;

type MethodFn = dyn Fn(RuntimeValue, Vec<RuntimeValue>) -> BoxFuture<'static, Result<RuntimeValue, ResolverError>>
    + Send
    + Sync;

/// A field implementation. Receives the source value and the positional
/// arguments in parameter order.
#[derive(Clone)]
pub struct Method(Arc<MethodFn>);

impl Method {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RuntimeValue, Vec<RuntimeValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RuntimeValue, ResolverError>> + Send + 'static,
    {
        Self(Arc::new(move |this, args| f(this, args).boxed()))
    }

    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(RuntimeValue, Vec<RuntimeValue>) -> Result<RuntimeValue, ResolverError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(move |this, args| {
            futures_util::future::ready(f(this, args)).boxed()
        }))
    }

    pub fn call(
        &self,
        this: RuntimeValue,
        args: Vec<RuntimeValue>,
    ) -> BoxFuture<'static, Result<RuntimeValue, ResolverError>> {
        (self.0)(this, args)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Method(..)")
    }
}

/// Request-scoped data attached by the caller of the executable schema.
#[derive(Clone)]
pub struct RequestContext(Arc<dyn Any + Send + Sync>);

impl RequestContext {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self(Arc::new(data))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub(crate) fn to_runtime(&self) -> RuntimeValue {
        RuntimeValue::Opaque(self.0.clone())
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestContext(..)")
    }
}

/// Where in the graph a resolver is running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveInfo {
    pub parent_type: String,
    pub field_name: String,
    pub return_type: String,
}

/// Everything a hook or injector may look at.
#[derive(Debug, Clone, Default)]
pub struct ResolverData {
    pub source: RuntimeValue,
    pub args: IndexMap<String, RuntimeValue>,
    pub context: Option<RequestContext>,
    pub info: ResolveInfo,
}

type HookFn = dyn Fn(ResolverData) -> BoxFuture<'static, Result<(), ResolverError>> + Send + Sync;

/// Runs before a field resolves. A failure aborts the field.
#[derive(Clone)]
pub struct Hook(Arc<HookFn>);

impl Hook {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(ResolverData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ResolverError>> + Send + 'static,
    {
        Self(Arc::new(move |data| f(data).boxed()))
    }

    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(ResolverData) -> Result<(), ResolverError> + Send + Sync + 'static,
    {
        Self(Arc::new(move |data| futures_util::future::ready(f(data)).boxed()))
    }

    pub fn call(&self, data: ResolverData) -> BoxFuture<'static, Result<(), ResolverError>> {
        (self.0)(data)
    }
}

type AfterHookFn = dyn Fn(RuntimeValue, ResolverData) -> BoxFuture<'static, Result<(), ResolverError>>
    + Send
    + Sync;

/// Runs after a field resolved, observing its value.
#[derive(Clone)]
pub struct AfterHook(Arc<AfterHookFn>);

impl AfterHook {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RuntimeValue, ResolverData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ResolverError>> + Send + 'static,
    {
        Self(Arc::new(move |value, data| f(value, data).boxed()))
    }

    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(RuntimeValue, ResolverData) -> Result<(), ResolverError> + Send + Sync + 'static,
    {
        Self(Arc::new(move |value, data| {
            futures_util::future::ready(f(value, data)).boxed()
        }))
    }

    pub fn call(
        &self,
        value: RuntimeValue,
        data: ResolverData,
    ) -> BoxFuture<'static, Result<(), ResolverError>> {
        (self.0)(value, data)
    }
}

/// Supplies a parameter value instead of the caller.
#[derive(Clone)]
pub struct Injector(Arc<dyn Fn(&ResolverData) -> RuntimeValue + Send + Sync>);

impl Injector {
    pub fn new(f: impl Fn(&ResolverData) -> RuntimeValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Injects the request context as an opaque value, or null without one.
    pub fn context() -> Self {
        Self::new(|data| {
            data.context
                .as_ref()
                .map_or(RuntimeValue::Null, RequestContext::to_runtime)
        })
    }

    /// Injects the parent value.
    pub fn source() -> Self {
        Self::new(|data| data.source.clone())
    }

    /// Injects the [`ResolveInfo`] as an opaque value.
    pub fn info() -> Self {
        Self::new(|data| RuntimeValue::opaque(data.info.clone()))
    }

    pub fn call(&self, data: &ResolverData) -> RuntimeValue {
        (self.0)(data)
    }
}

/// Picks the concrete type of a union or interface value.
pub type DiscriminateFn =
    Arc<dyn Fn(&RuntimeValue, Option<&RequestContext>, &ResolveInfo) -> Option<RuntimeType> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sync_method() {
        let method = Method::sync(|_, args| {
            let name = args.first().and_then(RuntimeValue::as_str).unwrap_or("nobody");
            Ok(format!("hello, {name}").into())
        });
        let out = method.call(RuntimeValue::Null, vec!["Bob".into()]).await.unwrap();
        assert_eq!(out.as_str(), Some("hello, Bob"));
    }

    #[test]
    fn test_context_injector() {
        struct Viewer(&'static str);

        let data = ResolverData {
            context: Some(RequestContext::new(Viewer("alice"))),
            ..Default::default()
        };
        let injected = Injector::context().call(&data);
        assert_eq!(injected.downcast_ref::<Viewer>().map(|v| v.0), Some("alice"));

        let without = Injector::context().call(&ResolverData::default());
        assert_eq!(without, RuntimeValue::Null);
    }
}
