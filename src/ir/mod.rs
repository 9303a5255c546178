//! Typed declaration IR.
//!
//! A [`Program`] owns declared types; a [`DeclaredType`] owns its fields and
//! methods; variables own their declaration statements. Everything else is
//! referenced by id ([`TypeId`], [`FieldId`], [`LocalId`], ...) so back
//! references never own what they point at.

pub mod capability;
pub mod code;
pub mod declared;
pub mod field;
pub mod literal;
pub mod program;
pub mod types;
pub mod variable;

pub use capability::{CanBeStatic, HasEnclosingType};
pub use code::{BinaryOp, Block, Expr, LocalId, ParamId, Stmt, VarSlot};
pub use declared::{
    Annotation, Annotations, DeclaredType, FieldId, Method, MethodId, TypeId, TypeKind,
    INSTANCE_INITIALIZER, STATIC_INITIALIZER,
};
pub use field::{Disposition, Field};
pub use literal::ValueLiteral;
pub use program::Program;
pub use types::{PrimitiveType, Ty, TypeRef};
pub use variable::{DeclarationStatement, Local, Parameter, Variable, VariableDecl};
