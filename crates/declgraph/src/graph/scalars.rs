//! Scalar nodes.
//!
//! The built-in scalars are shared statics; `DateTime` is not built into the
//! execution engine and is registered as a custom scalar validated as
//! RFC 3339.

use std::fmt;
use std::sync::{Arc, LazyLock};

use async_graphql::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

type Validator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A named scalar.
pub struct ScalarNode {
    name: String,
    description: Option<String>,
    builtin: bool,
    validator: Option<Validator>,
}

impl ScalarNode {
    /// Declares a custom scalar. Values are accepted unchecked unless a
    /// validator is attached.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            builtin: false,
            validator: None,
        }
    }

    fn builtin(name: &str) -> Self {
        Self {
            builtin: true,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn validator(mut self, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the execution engine already provides this scalar.
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validator.as_ref().is_none_or(|validate| validate(value))
    }

    pub(crate) fn validator_fn(&self) -> Option<Validator> {
        self.validator.clone()
    }
}

impl fmt::Debug for ScalarNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarNode")
            .field("name", &self.name)
            .field("builtin", &self.builtin)
            .finish()
    }
}

pub static STRING: LazyLock<Arc<ScalarNode>> =
    LazyLock::new(|| Arc::new(ScalarNode::builtin("String")));

pub static FLOAT: LazyLock<Arc<ScalarNode>> =
    LazyLock::new(|| Arc::new(ScalarNode::builtin("Float")));

pub static BOOLEAN: LazyLock<Arc<ScalarNode>> =
    LazyLock::new(|| Arc::new(ScalarNode::builtin("Boolean")));

pub static INT: LazyLock<Arc<ScalarNode>> = LazyLock::new(|| Arc::new(ScalarNode::builtin("Int")));

pub static ID: LazyLock<Arc<ScalarNode>> = LazyLock::new(|| Arc::new(ScalarNode::builtin("ID")));

pub static DATE_TIME: LazyLock<Arc<ScalarNode>> = LazyLock::new(|| {
    Arc::new(
        ScalarNode::new("DateTime")
            .description("A date-time string in RFC 3339 format")
            .validator(is_rfc3339),
    )
});

fn is_rfc3339(value: &Value) -> bool {
    match value {
        Value::String(s) => OffsetDateTime::parse(s, &Rfc3339).is_ok(),
        _ => false,
    }
}
