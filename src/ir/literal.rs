use std::fmt;
use std::sync::Arc;

use super::types::{PrimitiveType, Ty};

/// Payload of a value-literal expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueLiteral {
    Boolean(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Arc<str>),
    Null,
}

impl ValueLiteral {
    pub fn string(s: &str) -> Self {
        ValueLiteral::String(Arc::from(s))
    }

    pub fn ty(&self) -> Ty {
        match self {
            ValueLiteral::Boolean(_) => Ty::Primitive(PrimitiveType::Boolean),
            ValueLiteral::Char(_) => Ty::Primitive(PrimitiveType::Char),
            ValueLiteral::Int(_) => Ty::Primitive(PrimitiveType::Int),
            ValueLiteral::Long(_) => Ty::Primitive(PrimitiveType::Long),
            ValueLiteral::Float(_) => Ty::Primitive(PrimitiveType::Float),
            ValueLiteral::Double(_) => Ty::Primitive(PrimitiveType::Double),
            ValueLiteral::String(_) => Ty::String,
            ValueLiteral::Null => Ty::Null,
        }
    }
}

/// Source-language spelling of the literal.
impl fmt::Display for ValueLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueLiteral::Boolean(b) => write!(f, "{}", b),
            ValueLiteral::Char(c) => write!(f, "{:?}", c),
            ValueLiteral::Int(v) => write!(f, "{}", v),
            ValueLiteral::Long(v) => write!(f, "{}L", v),
            ValueLiteral::Float(v) => write!(f, "{:?}f", v),
            ValueLiteral::Double(v) => write!(f, "{:?}", v),
            ValueLiteral::String(s) => write!(f, "{:?}", s),
            ValueLiteral::Null => write!(f, "null"),
        }
    }
}
