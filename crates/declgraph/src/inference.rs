//! Type inference from static signatures.
//!
//! Inference never fails hard. A missing result only becomes an error when
//! the declaration also lacks an explicit type, and only the shapes listed in
//! [`Uninferable`] produce a targeted diagnostic.

use tracing::trace;

use crate::types::{NativeScalar, RuntimeType, TypeSignature};

/// Signature shapes that carry no usable type information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uninferable {
    Object,
    Array,
    Promise,
}

impl Uninferable {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::Promise => "promise",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Inferred {
    pub runtime_type: Option<RuntimeType>,
    pub is_nullable: bool,
    pub uninferable: Option<Uninferable>,
}

impl Inferred {
    fn of(runtime_type: RuntimeType) -> Self {
        Self {
            runtime_type: Some(runtime_type),
            ..Default::default()
        }
    }

    fn undetermined() -> Self {
        Self::default()
    }

    fn uninferable(shape: Uninferable) -> Self {
        Self {
            uninferable: Some(shape),
            ..Default::default()
        }
    }

    fn nullable_if(mut self, nullable: bool) -> Self {
        self.is_nullable |= nullable;
        self
    }
}

/// Derives a runtime type and nullability default from a signature.
pub fn infer_type(signature: Option<&TypeSignature>) -> Inferred {
    let Some(signature) = signature else {
        return Inferred::undetermined();
    };
    let inferred = infer(signature);
    trace!(
        runtime_type = ?inferred.runtime_type,
        nullable = inferred.is_nullable,
        "inferred type"
    );
    inferred
}

fn infer(signature: &TypeSignature) -> Inferred {
    match signature {
        TypeSignature::Scalar(scalar) => Inferred::of(RuntimeType::Scalar(*scalar)),
        TypeSignature::Literal(literal) => Inferred::of(RuntimeType::Scalar(literal.scalar())),
        TypeSignature::Class(class) => Inferred::of(RuntimeType::Class(class.clone())),
        TypeSignature::Enum(def) => Inferred::of(RuntimeType::Enum(def.clone())),
        TypeSignature::Null | TypeSignature::Undefined => Inferred::undetermined().nullable_if(true),
        TypeSignature::Array(item) => {
            let item = infer(item);
            match item.runtime_type {
                Some(runtime_type) => Inferred::of(RuntimeType::Array(vec![runtime_type])),
                None => Inferred {
                    uninferable: item.uninferable,
                    ..Inferred::undetermined()
                },
            }
        }
        TypeSignature::Generic { params, .. } => match params.as_slice() {
            [inner] => infer(inner),
            _ => Inferred::undetermined(),
        },
        TypeSignature::Union(members) => infer_union(members),
        TypeSignature::Object => Inferred::uninferable(Uninferable::Object),
        TypeSignature::BareArray => Inferred::uninferable(Uninferable::Array),
        TypeSignature::BarePromise => Inferred::uninferable(Uninferable::Promise),
    }
}

fn infer_union(members: &[TypeSignature]) -> Inferred {
    let mut flat = Vec::with_capacity(members.len());
    flatten(members, &mut flat);

    let total = flat.len();
    let remaining: Vec<&TypeSignature> = flat.into_iter().filter(|m| !m.is_nullish()).collect();
    let stripped = remaining.len() < total;

    if is_boolean_pair(&remaining) {
        return Inferred::of(RuntimeType::boolean()).nullable_if(stripped);
    }

    match remaining.as_slice() {
        [] => Inferred::undetermined().nullable_if(stripped),
        [single] => infer(single).nullable_if(stripped),
        several => match shared_scalar(several) {
            Some(scalar) => Inferred::of(RuntimeType::Scalar(scalar)).nullable_if(stripped),
            None => Inferred::undetermined().nullable_if(stripped),
        },
    }
}

fn flatten<'a>(members: &'a [TypeSignature], out: &mut Vec<&'a TypeSignature>) {
    for member in members {
        match member {
            TypeSignature::Union(nested) => flatten(nested, out),
            other => out.push(other),
        }
    }
}

fn is_boolean_pair(members: &[&TypeSignature]) -> bool {
    use crate::types::Literal;

    let has = |wanted: bool| {
        members
            .iter()
            .any(|m| matches!(m, TypeSignature::Literal(Literal::Bool(b)) if *b == wanted))
    };
    members.len() == 2 && has(true) && has(false)
}

/// The scalar kind all members share, e.g. `'a' | 'b'` is a string.
fn shared_scalar(members: &[&TypeSignature]) -> Option<NativeScalar> {
    let mut kinds = members.iter().map(|member| match member {
        TypeSignature::Scalar(scalar) => Some(*scalar),
        TypeSignature::Literal(literal) => Some(literal.scalar()),
        _ => None,
    });
    let first = kinds.next()??;
    kinds.all(|kind| kind == Some(first)).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassRef, EnumDef, Literal};

    fn scalar_of(inferred: &Inferred) -> Option<NativeScalar> {
        match inferred.runtime_type {
            Some(RuntimeType::Scalar(scalar)) => Some(scalar),
            _ => None,
        }
    }

    #[test]
    fn test_plain_scalar_is_non_null() {
        let inferred = infer_type(Some(&TypeSignature::string()));
        assert_eq!(scalar_of(&inferred), Some(NativeScalar::String));
        assert!(!inferred.is_nullable);
    }

    #[test]
    fn test_nullable_union() {
        let inferred = infer_type(Some(&TypeSignature::number().nullable()));
        assert_eq!(scalar_of(&inferred), Some(NativeScalar::Number));
        assert!(inferred.is_nullable);

        let optional = infer_type(Some(&TypeSignature::string().optional()));
        assert!(optional.is_nullable);
    }

    #[test]
    fn test_boolean_literal_pair() {
        let sig = TypeSignature::union([
            TypeSignature::Literal(Literal::Bool(true)),
            TypeSignature::Literal(Literal::Bool(false)),
        ]);
        let inferred = infer_type(Some(&sig));
        assert_eq!(scalar_of(&inferred), Some(NativeScalar::Boolean));
        assert!(!inferred.is_nullable);

        let nullable = infer_type(Some(&sig.nullable()));
        assert_eq!(scalar_of(&nullable), Some(NativeScalar::Boolean));
        assert!(nullable.is_nullable);
    }

    #[test]
    fn test_string_literal_union() {
        let sig = TypeSignature::union([
            TypeSignature::Literal(Literal::String("a".into())),
            TypeSignature::Literal(Literal::String("b".into())),
        ]);
        assert_eq!(scalar_of(&infer_type(Some(&sig))), Some(NativeScalar::String));
    }

    #[test]
    fn test_mixed_union_is_undetermined() {
        let foo = ClassRef::new("Foo");
        let sig = TypeSignature::union([TypeSignature::string(), TypeSignature::class(&foo)]);
        let inferred = infer_type(Some(&sig));
        assert!(inferred.runtime_type.is_none());
        assert!(inferred.uninferable.is_none());
    }

    #[test]
    fn test_array_of_class() {
        let foo = ClassRef::new("Foo");
        let inferred = infer_type(Some(&TypeSignature::array(TypeSignature::class(&foo))));
        match inferred.runtime_type {
            Some(RuntimeType::Array(items)) => {
                assert!(matches!(&items[..], [RuntimeType::Class(c)] if *c == foo));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_promise_unwraps() {
        let inferred = infer_type(Some(&TypeSignature::promise(TypeSignature::int().nullable())));
        assert_eq!(scalar_of(&inferred), Some(NativeScalar::Int));
        assert!(inferred.is_nullable);
    }

    #[test]
    fn test_enum_is_non_null() {
        let def = EnumDef::numeric(["A"]);
        let inferred = infer_type(Some(&TypeSignature::enumeration(&def)));
        assert!(matches!(inferred.runtime_type, Some(RuntimeType::Enum(_))));
        assert!(!inferred.is_nullable);
    }

    #[test]
    fn test_uninferable_shapes() {
        assert_eq!(
            infer_type(Some(&TypeSignature::Object)).uninferable,
            Some(Uninferable::Object)
        );
        assert_eq!(
            infer_type(Some(&TypeSignature::BareArray)).uninferable,
            Some(Uninferable::Array)
        );
        assert_eq!(
            infer_type(Some(&TypeSignature::BarePromise.nullable())).uninferable,
            Some(Uninferable::Promise)
        );
        assert!(infer_type(None).runtime_type.is_none());
        assert!(infer_type(None).uninferable.is_none());
    }
}
