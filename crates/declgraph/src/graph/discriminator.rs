//! Runtime type discrimination for unions and interfaces.

use tracing::{trace, warn};

use crate::resolve::ResolveOptions;
use crate::resolver::{DiscriminateFn, RequestContext, ResolveInfo};
use crate::session::WeakSession;
use crate::types::{ClassRef, RuntimeType};
use crate::value::RuntimeValue;

pub(crate) enum Discriminator {
    /// Union members in declaration order; the first one the value is an
    /// instance of wins.
    Members(Vec<(ClassRef, String)>),
    /// Registered implementors of an interface, then the value's own class.
    Implementors {
        interface: ClassRef,
        session: WeakSession,
    },
    /// A user function whose result goes back through the type resolver.
    Custom {
        resolve: DiscriminateFn,
        session: WeakSession,
    },
}

impl Discriminator {
    pub(crate) fn discriminate(
        &self,
        abstract_type: &str,
        value: &RuntimeValue,
        context: Option<&RequestContext>,
        info: &ResolveInfo,
    ) -> Option<String> {
        let found = match self {
            Self::Members(members) => {
                let instance = value.as_instance()?;
                members
                    .iter()
                    .find(|(class, _)| instance.is_instance_of(class.key()))
                    .map(|(_, name)| name.clone())
            }
            Self::Implementors { interface, session } => {
                implementor_name(session, interface, value)
            }
            Self::Custom { resolve, session } => {
                let runtime_type = resolve(value, context, info)?;
                custom_name(session, &runtime_type)
            }
        };

        match &found {
            Some(name) => trace!(abstract_type, concrete = %name, "discriminated value"),
            None => warn!(
                abstract_type,
                field = %info.field_name,
                kind = value.kind(),
                "could not discriminate value"
            ),
        }
        found
    }
}

fn implementor_name(
    session: &WeakSession,
    interface: &ClassRef,
    value: &RuntimeValue,
) -> Option<String> {
    let session = session.upgrade().ok()?;
    let instance = value.as_instance()?;

    let implementor = session
        .implementors_of(interface)
        .into_iter()
        .find(|class| instance.is_instance_of(class.key()));

    let class = match implementor {
        Some(class) => class,
        None if session.is_object_type(instance.class().key()) => instance.class().clone(),
        None => return None,
    };
    session.compile_object(&class).ok().map(|node| node.name.clone())
}

fn custom_name(session: &WeakSession, runtime_type: &RuntimeType) -> Option<String> {
    let session = session.upgrade().ok()?;
    let ty = session
        .resolve_type(runtime_type, ResolveOptions::output().nullable(true))
        .ok()?;
    Some(ty.named_node().name().to_string())
}
