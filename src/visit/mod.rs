//! Visitor protocol over the declaration IR.
//!
//! A traversal is driven by a pass, never by the nodes. For every node the
//! walker calls the visitor's pre-visit hook for that node kind; `Ok(true)`
//! descends into the node's children, `Ok(false)` skips them. The post-visit
//! hook runs in both cases. Errors abort the whole traversal.
//!
//! Children per node kind:
//!
//! | node | children, in order |
//! |---|---|
//! | declared type | annotations, fields, methods |
//! | field | annotations only |
//! | method | annotations, parameters, body |
//! | declaration anchor | the variable's initializer expression |
//! | statement / expression | nested statements and expressions |
//!
//! A field's declaration statement is not a child of the field. It is
//! reached from its `Stmt::Declare` anchor in the static or instance
//! initializer, so initializers are seen in statement order.

mod context;
mod walk;

use std::fmt;

use crate::error::IrError;
use crate::ir::{
    Annotation, Annotations, Block, DeclarationStatement, DeclaredType, Expr, Field, FieldId,
    Local, LocalId, Method, Parameter, Stmt, VarSlot, VariableDecl,
};
use crate::ir::variable::sealed::{Token, VariableStorage};
use crate::span::SourceInfo;

pub use context::{Context, Slot};
pub use walk::{traverse_program, Traverse};

/// Closed set of node kinds the protocol can offer a visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    DeclaredType,
    Field,
    Method,
    Parameter,
    Annotation,
    Block,
    Declaration,
    ExprStmt,
    Return,
    If,
    Literal,
    FieldRef,
    LocalRef,
    ParamRef,
    This,
    Binary,
}

impl NodeKind {
    pub fn of_stmt(stmt: &Stmt) -> NodeKind {
        match stmt {
            Stmt::Declare { .. } => NodeKind::Declaration,
            Stmt::Expr { .. } => NodeKind::ExprStmt,
            Stmt::Return { .. } => NodeKind::Return,
            Stmt::If { .. } => NodeKind::If,
            Stmt::Block(_) => NodeKind::Block,
        }
    }

    pub fn of_expr(expr: &Expr) -> NodeKind {
        match expr {
            Expr::Literal { .. } => NodeKind::Literal,
            Expr::FieldRef { .. } => NodeKind::FieldRef,
            Expr::LocalRef { .. } => NodeKind::LocalRef,
            Expr::ParamRef { .. } => NodeKind::ParamRef,
            Expr::This { .. } => NodeKind::This,
            Expr::Binary { .. } => NodeKind::Binary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::DeclaredType => "declared type",
            NodeKind::Field => "field",
            NodeKind::Method => "method",
            NodeKind::Parameter => "parameter",
            NodeKind::Annotation => "annotation",
            NodeKind::Block => "block",
            NodeKind::Declaration => "declaration",
            NodeKind::ExprStmt => "expression statement",
            NodeKind::Return => "return",
            NodeKind::If => "if",
            NodeKind::Literal => "literal",
            NodeKind::FieldRef => "field reference",
            NodeKind::LocalRef => "local reference",
            NodeKind::ParamRef => "parameter reference",
            NodeKind::This => "this",
            NodeKind::Binary => "binary expression",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The variable a declaration anchor resolved to.
#[derive(Debug)]
pub enum DeclTarget<'a> {
    Field { id: FieldId, field: &'a mut Field },
    Local { id: LocalId, local: &'a mut Local },
}

impl DeclTarget<'_> {
    /// The slot the anchor named.
    pub fn slot(&self) -> VarSlot {
        match self {
            DeclTarget::Field { id, .. } => VarSlot::Field(*id),
            DeclTarget::Local { id, .. } => VarSlot::Local(*id),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DeclTarget::Field { field: f, .. } => f.name(),
            DeclTarget::Local { local: l, .. } => l.name(),
        }
    }

    pub fn is_final(&self) -> bool {
        match self {
            DeclTarget::Field { field: f, .. } => f.is_final(),
            DeclTarget::Local { local: l, .. } => l.is_final(),
        }
    }

    pub fn initializer(&self) -> Option<&Expr> {
        match self {
            DeclTarget::Field { field: f, .. } => f.initializer(),
            DeclTarget::Local { local: l, .. } => l.initializer(),
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            DeclTarget::Field { field: f, .. } => Some(f),
            DeclTarget::Local { .. } => None,
        }
    }

    pub fn as_field_mut(&mut self) -> Option<&mut Field> {
        match self {
            DeclTarget::Field { field: f, .. } => Some(f),
            DeclTarget::Local { .. } => None,
        }
    }

    pub(crate) fn declaration_mut(&mut self) -> Option<&mut DeclarationStatement> {
        match self {
            DeclTarget::Field { field: f, .. } => f.variable_mut(Token(())),
            DeclTarget::Local { local: l, .. } => l.variable_mut(Token(())),
        }
        .declaration_mut()
    }
}

/// Build the error a visitor returns for a node kind it does not handle.
pub fn unsupported<T>(visitor: &'static str, kind: NodeKind, info: &SourceInfo) -> Result<T, IrError> {
    Err(IrError::UnsupportedNode {
        kind,
        visitor,
        info: info.clone(),
    })
}

/// A pass over the IR.
///
/// Every hook defaults to [`Visitor::visit_node`] / [`Visitor::end_visit_node`],
/// which accept every node. A visitor written for a subset of node kinds
/// overrides `visit_node` to return [`unsupported`], so an unexpected node
/// fails the pass instead of being skipped.
pub trait Visitor {
    fn visit_node(
        &mut self,
        _kind: NodeKind,
        _info: &SourceInfo,
        _cx: &mut Context,
    ) -> Result<bool, IrError> {
        Ok(true)
    }

    fn end_visit_node(
        &mut self,
        _kind: NodeKind,
        _info: &SourceInfo,
        _cx: &mut Context,
    ) -> Result<(), IrError> {
        Ok(())
    }

    fn visit_type(&mut self, ty: &mut DeclaredType, cx: &mut Context) -> Result<bool, IrError> {
        self.visit_node(NodeKind::DeclaredType, ty.info(), cx)
    }

    fn end_visit_type(&mut self, ty: &mut DeclaredType, cx: &mut Context) -> Result<(), IrError> {
        self.end_visit_node(NodeKind::DeclaredType, ty.info(), cx)
    }

    fn visit_field(&mut self, field: &mut Field, cx: &mut Context) -> Result<bool, IrError> {
        self.visit_node(NodeKind::Field, field.info(), cx)
    }

    fn end_visit_field(&mut self, field: &mut Field, cx: &mut Context) -> Result<(), IrError> {
        self.end_visit_node(NodeKind::Field, field.info(), cx)
    }

    fn visit_method(&mut self, method: &mut Method, cx: &mut Context) -> Result<bool, IrError> {
        self.visit_node(NodeKind::Method, method.info(), cx)
    }

    fn end_visit_method(&mut self, method: &mut Method, cx: &mut Context) -> Result<(), IrError> {
        self.end_visit_node(NodeKind::Method, method.info(), cx)
    }

    fn visit_parameter(&mut self, param: &mut Parameter, cx: &mut Context) -> Result<bool, IrError> {
        self.visit_node(NodeKind::Parameter, param.info(), cx)
    }

    fn end_visit_parameter(
        &mut self,
        param: &mut Parameter,
        cx: &mut Context,
    ) -> Result<(), IrError> {
        self.end_visit_node(NodeKind::Parameter, param.info(), cx)
    }

    fn visit_annotation(&mut self, annotation: &Annotation, cx: &mut Context) -> Result<bool, IrError> {
        self.visit_node(NodeKind::Annotation, &annotation.info, cx)
    }

    fn end_visit_annotation(
        &mut self,
        annotation: &Annotation,
        cx: &mut Context,
    ) -> Result<(), IrError> {
        self.end_visit_node(NodeKind::Annotation, &annotation.info, cx)
    }

    /// Offer each annotation of an immutable list, then return the list the
    /// owner should keep. Override to substitute a new list.
    fn accept_annotations(
        &mut self,
        annotations: &Annotations,
        cx: &mut Context,
    ) -> Result<Annotations, IrError> {
        for annotation in annotations {
            walk::walk_annotation(self, annotation, cx)?;
        }
        Ok(annotations.clone())
    }

    fn visit_block(&mut self, block: &mut Block, cx: &mut Context) -> Result<bool, IrError> {
        self.visit_node(NodeKind::Block, &block.info, cx)
    }

    fn end_visit_block(&mut self, block: &mut Block, cx: &mut Context) -> Result<(), IrError> {
        self.end_visit_node(NodeKind::Block, &block.info, cx)
    }

    /// A declaration anchor. `info` is the anchor's provenance.
    fn visit_declaration(
        &mut self,
        _decl: &mut DeclTarget<'_>,
        info: &SourceInfo,
        cx: &mut Context,
    ) -> Result<bool, IrError> {
        self.visit_node(NodeKind::Declaration, info, cx)
    }

    fn end_visit_declaration(
        &mut self,
        _decl: &mut DeclTarget<'_>,
        info: &SourceInfo,
        cx: &mut Context,
    ) -> Result<(), IrError> {
        self.end_visit_node(NodeKind::Declaration, info, cx)
    }

    /// Statements other than declaration anchors and nested blocks.
    fn visit_stmt(&mut self, stmt: &mut Stmt, cx: &mut Context) -> Result<bool, IrError> {
        self.visit_node(NodeKind::of_stmt(stmt), stmt.info(), cx)
    }

    fn end_visit_stmt(&mut self, stmt: &mut Stmt, cx: &mut Context) -> Result<(), IrError> {
        self.end_visit_node(NodeKind::of_stmt(stmt), stmt.info(), cx)
    }

    fn visit_expr(&mut self, expr: &mut Expr, cx: &mut Context) -> Result<bool, IrError> {
        self.visit_node(NodeKind::of_expr(expr), expr.info(), cx)
    }

    fn end_visit_expr(&mut self, expr: &mut Expr, cx: &mut Context) -> Result<(), IrError> {
        self.end_visit_node(NodeKind::of_expr(expr), expr.info(), cx)
    }
}
