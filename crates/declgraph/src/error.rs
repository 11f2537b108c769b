//! Error types for schema compilation and resolver execution.
//!
//! Compilation errors are grouped by the stage that raises them and
//! aggregated into [`CompileError`]. Errors raised while a synthesized
//! resolver runs are [`ResolverError`]s and reach the execution engine as
//! per-field errors.

/// Errors raised by the registration API.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// A field was registered twice without a query/mutation split.
    #[error("Field {class}.{field} is already registered")]
    DuplicateField { class: String, field: String },

    /// The same enum definition was registered twice.
    #[error("Enum {name} is already registered")]
    DuplicateEnum { name: String },

    /// A root field was declared without a method implementation.
    #[error("Every root schema field must be a method ({class}.{field})")]
    RootFieldNotMethod { class: String, field: String },
}

/// Errors raised when a field type can neither be inferred nor was given.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The static signature is an empty object, bare array or bare promise.
    #[error(
        "{class}.{field}: the {shape} type cannot be inferred, provide an explicit type for this field"
    )]
    Uninferable {
        class: String,
        field: String,
        shape: &'static str,
    },

    /// No signature, or a union of unrelated types.
    #[error("{class}.{field}: could not determine the type, provide an explicit type for this field")]
    Undetermined { class: String, field: String },
}

/// Errors raised by the type resolver.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(
        "Cannot resolve type `{reference}`: it is neither a registered type nor a thunk returning one"
    )]
    Unresolvable { reference: String },

    #[error("List types must declare exactly one item type, got {count}")]
    ListArity { count: usize },

    #[error(
        "A type thunk returned another thunk; a thunk must return a concrete type reference. \
         If the referenced type is not declared yet, reference it through a single thunk"
    )]
    NestedThunk,

    #[error("Enum {reference} is used as a type but was never registered")]
    UnregisteredEnum { reference: String },

    /// A resolution failure attributed to the field that triggered it.
    #[error("{class}.{field}: {source}")]
    InField {
        class: String,
        field: String,
        #[source]
        source: Box<ResolveError>,
    },

    #[error("{class}.{field} resolves to {ty}, which is not an output type")]
    NotOutputType {
        class: String,
        field: String,
        ty: String,
    },
}

/// Errors raised while compiling a field's argument map.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error("{class}.{field}: cannot resolve the type of argument #{index}: {reason}")]
    Unresolvable {
        class: String,
        field: String,
        index: usize,
        reason: String,
    },

    #[error("{class}.{field}: argument #{index} resolves to {ty}, which is not an input type")]
    NotInputType {
        class: String,
        field: String,
        index: usize,
        ty: String,
    },

    /// A parameter was registered both as an injected value and as an argument.
    #[error("{class}.{field}: argument #{index} is injected and cannot also be a caller argument")]
    InjectedArgument {
        class: String,
        field: String,
        index: usize,
    },
}

/// Errors raised while assembling the query and mutation roots.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("{class} is not registered as a schema root")]
    NotSchemaRoot { class: String },

    #[error("The schema must expose at least one query field")]
    NoQueryFields,

    #[error("Root field `{field}` is declared by both {first} and {second}")]
    DuplicateRootField {
        field: String,
        first: String,
        second: String,
    },

    #[error("Type name `{name}` is used by two different types")]
    DuplicateTypeName { name: String },

    /// The execution engine rejected the lowered schema.
    #[error("Failed to build executable schema: {0}")]
    Engine(String),
}

/// Errors raised while compiling object, input and interface types.
#[derive(Debug, thiserror::Error)]
pub enum ObjectTypeError {
    #[error("{class} is not registered as an object type")]
    Unregistered { class: String },

    #[error("{class}: mixin {mixin} is not registered as an object type")]
    UnregisteredMixin { class: String, mixin: String },

    #[error("{class}: interface {interface} is not registered as an interface type")]
    UnregisteredInterface { class: String, interface: String },

    #[error("{class}.{field}: root fields can only be declared on a schema root")]
    RootFieldOnNonRoot { class: String, field: String },

    #[error("Input type {class} has no fields")]
    EmptyInputType { class: String },

    #[error("{class}.{field} resolves to {ty}, which is not an input type")]
    NonInputField {
        class: String,
        field: String,
        ty: String,
    },
}

/// Errors raised while compiling union types.
#[derive(Debug, thiserror::Error)]
pub enum UnionError {
    #[error("Union {union}: member {member} is not an object type")]
    NonObjectMember { union: String, member: String },
}

/// Any error raised while compiling a schema.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    ObjectType(#[from] ObjectTypeError),

    #[error(transparent)]
    Union(#[from] UnionError),

    /// A lazily compiled node outlived the session that created it.
    #[error("The compilation session was dropped before its types were fully compiled")]
    SessionDropped,
}

/// Errors raised when casting a resolved value to its declared type.
#[derive(Debug, thiserror::Error)]
pub enum CastError {
    #[error("{field}: expected a list, got {found}")]
    NotAList { field: String, found: &'static str },

    #[error("{field}: nested lists cannot be cast")]
    NestedList { field: String },
}

/// Errors raised while a synthesized resolver runs.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error(transparent)]
    Cast(#[from] CastError),

    /// A hook or field implementation failed.
    #[error("{0}")]
    Failed(String),

    #[error("Could not determine the concrete type of a {abstract_type} value")]
    Discrimination { abstract_type: String },

    #[error("{value} is not a value of enum {enum_type}")]
    InvalidEnumValue { enum_type: String, value: String },

    #[error(transparent)]
    Compile(Box<CompileError>),
}

impl ResolverError {
    /// Creates a new `Failed` error.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<CompileError> for ResolverError {
    fn from(err: CompileError) -> Self {
        Self::Compile(Box::new(err))
    }
}

/// Result type for compilation.
pub type Result<T, E = CompileError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_message() {
        let err = RegistrationError::DuplicateField {
            class: "Foo".into(),
            field: "bar".into(),
        };
        assert_eq!(err.to_string(), "Field Foo.bar is already registered");
    }

    #[test]
    fn test_compile_error_is_transparent() {
        let err: CompileError = AssemblyError::NoQueryFields.into();
        assert_eq!(
            err.to_string(),
            "The schema must expose at least one query field"
        );
    }

    #[test]
    fn test_resolver_error_into_graphql_error() {
        let err: async_graphql::Error = ResolverError::failed("boom").into();
        assert_eq!(err.message, "boom");
    }
}
