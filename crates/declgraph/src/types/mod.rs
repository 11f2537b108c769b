//! Declaration-side types: identities, runtime type references and static
//! signatures.

pub mod class;
pub mod runtime;
pub mod signature;

pub use class::{ClassRef, EnumDef, EnumMember, TypeKey};
pub use runtime::{NativeScalar, RuntimeType, Thunk};
pub use signature::{Literal, TypeSignature};
