use std::fmt;
use std::sync::Arc;

use super::TypeId;

/// Shared, immutable type descriptor. Many declarations point at the same one.
pub type TypeRef = Arc<Ty>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Void => "void",
        }
    }
}

/// Semantic types referenced by declarations and expressions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Primitive(PrimitiveType),
    /// The string type of the source language.
    String,
    /// Type of the `null` literal.
    Null,
    /// A declared type of the program being compiled.
    Declared { id: TypeId, name: Arc<str> },
    Array(TypeRef),
}

impl Ty {
    pub fn primitive(p: PrimitiveType) -> TypeRef {
        Arc::new(Ty::Primitive(p))
    }

    pub fn declared(id: TypeId, name: &str) -> TypeRef {
        Arc::new(Ty::Declared {
            id,
            name: Arc::from(name),
        })
    }

    pub fn array_of(elem: TypeRef) -> TypeRef {
        Arc::new(Ty::Array(elem))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Ty::Primitive(_))
    }

    pub fn display(&self) -> String {
        match self {
            Ty::Primitive(p) => p.as_str().to_string(),
            Ty::String => "String".to_string(),
            Ty::Null => "null".to_string(),
            Ty::Declared { name, .. } => name.to_string(),
            Ty::Array(elem) => format!("{}[]", elem.display()),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
