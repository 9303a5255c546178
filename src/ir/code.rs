//! Statements and expressions of method bodies.

use std::fmt;

use super::literal::ValueLiteral;
use super::{FieldId, TypeId};
use crate::span::SourceInfo;

/// Method-relative index of a local variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub u32);

/// Method-relative index of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub u32);

/// The variable a declaration anchor stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarSlot {
    Field(FieldId),
    Local(LocalId),
}

impl fmt::Display for VarSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarSlot::Field(id) => write!(f, "field #{} of type #{}", id.index, id.owner.0),
            VarSlot::Local(id) => write!(f, "local #{}", id.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Assign,
    Add,
    Sub,
    Mul,
    Eq,
    Lt,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Assign => "=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Eq => "==",
            BinaryOp::Lt => "<",
        }
    }
}

/// Expressions.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal {
        info: SourceInfo,
        value: ValueLiteral,
    },
    FieldRef {
        info: SourceInfo,
        field: FieldId,
        /// `None` for static access.
        instance: Option<Box<Expr>>,
    },
    LocalRef {
        info: SourceInfo,
        local: LocalId,
    },
    ParamRef {
        info: SourceInfo,
        param: ParamId,
    },
    This {
        info: SourceInfo,
        ty: TypeId,
    },
    Binary {
        info: SourceInfo,
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn literal(info: SourceInfo, value: ValueLiteral) -> Self {
        Expr::Literal { info, value }
    }

    pub fn static_field(info: SourceInfo, field: FieldId) -> Self {
        Expr::FieldRef {
            info,
            field,
            instance: None,
        }
    }

    pub fn binary(info: SourceInfo, op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            info,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn info(&self) -> &SourceInfo {
        match self {
            Expr::Literal { info, .. }
            | Expr::FieldRef { info, .. }
            | Expr::LocalRef { info, .. }
            | Expr::ParamRef { info, .. }
            | Expr::This { info, .. }
            | Expr::Binary { info, .. } => info,
        }
    }

    pub fn as_literal(&self) -> Option<&ValueLiteral> {
        match self {
            Expr::Literal { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A sequence of statements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub info: SourceInfo,
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(info: SourceInfo, stmts: Vec<Stmt>) -> Self {
        Self { info, stmts }
    }
}

/// Statements.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// Position of a variable's declaration statement within its block.
    /// The variable owns the statement; the anchor only orders it.
    Declare {
        info: SourceInfo,
        target: VarSlot,
    },
    Expr {
        info: SourceInfo,
        expr: Expr,
    },
    Return {
        info: SourceInfo,
        value: Option<Expr>,
    },
    If {
        info: SourceInfo,
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    Block(Block),
}

impl Stmt {
    pub fn declare(info: SourceInfo, target: VarSlot) -> Self {
        Stmt::Declare { info, target }
    }

    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr {
            info: expr.info().clone(),
            expr,
        }
    }

    pub fn info(&self) -> &SourceInfo {
        match self {
            Stmt::Declare { info, .. }
            | Stmt::Expr { info, .. }
            | Stmt::Return { info, .. }
            | Stmt::If { info, .. } => info,
            Stmt::Block(block) => &block.info,
        }
    }
}
