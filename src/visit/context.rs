use std::fmt;

use super::NodeKind;
use crate::error::IrError;
use crate::ir::{Expr, Stmt, TypeId};

/// What kind of position the current node occupies in its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// An element of a block's statement list: removable, replaceable.
    Statement,
    /// An expression operand: replaceable.
    Expression,
    /// Anything else (types, fields, methods, parameters, annotations).
    Fixed,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Statement => write!(f, "statement"),
            Slot::Expression => write!(f, "expression"),
            Slot::Fixed => write!(f, "fixed"),
        }
    }
}

#[derive(Debug)]
pub(crate) enum Edit {
    Remove,
    ReplaceStmt(Stmt),
    ReplaceExpr(Expr),
}

/// Bookkeeping for one node on the ancestry stack.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) kind: NodeKind,
    pub(crate) slot: Slot,
    pub(crate) edit: Option<Edit>,
    pub(crate) before: Vec<Stmt>,
    pub(crate) after: Vec<Stmt>,
}

/// Per-traversal state handed to every visitor hook.
///
/// Tracks the ancestry of the node being visited and collects edits a
/// visitor requests for it. Edits are applied by the walker once the node's
/// post-visit hook has returned; statements inserted or substituted that way
/// are not visited again in the same traversal.
#[derive(Debug, Default)]
pub struct Context {
    frames: Vec<Frame>,
    enclosing_type: Option<TypeId>,
    changed: bool,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Kind of the node currently being visited.
    pub fn current(&self) -> Option<NodeKind> {
        self.frames.last().map(|f| f.kind)
    }

    pub fn parent(&self) -> Option<NodeKind> {
        let n = self.frames.len();
        if n < 2 {
            return None;
        }
        Some(self.frames[n - 2].kind)
    }

    /// Node kinds from the current node outwards.
    pub fn ancestry(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.frames.iter().rev().map(|f| f.kind)
    }

    /// The declared type whose subtree is being traversed.
    pub fn enclosing_type(&self) -> Option<TypeId> {
        self.enclosing_type
    }

    pub fn did_change(&self) -> bool {
        self.changed
    }

    /// Record an in-place mutation made directly on a node.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn can_remove(&self) -> bool {
        self.current_slot() == Some(Slot::Statement)
    }

    pub fn replace_stmt(&mut self, stmt: Stmt) -> Result<(), IrError> {
        self.edit_frame(Slot::Statement, "replace a statement")?.edit = Some(Edit::ReplaceStmt(stmt));
        self.changed = true;
        Ok(())
    }

    pub fn remove_stmt(&mut self) -> Result<(), IrError> {
        self.edit_frame(Slot::Statement, "remove a statement")?.edit = Some(Edit::Remove);
        self.changed = true;
        Ok(())
    }

    pub fn insert_before(&mut self, stmt: Stmt) -> Result<(), IrError> {
        self.edit_frame(Slot::Statement, "insert a statement")?.before.push(stmt);
        self.changed = true;
        Ok(())
    }

    pub fn insert_after(&mut self, stmt: Stmt) -> Result<(), IrError> {
        self.edit_frame(Slot::Statement, "insert a statement")?.after.push(stmt);
        self.changed = true;
        Ok(())
    }

    pub fn replace_expr(&mut self, expr: Expr) -> Result<(), IrError> {
        self.edit_frame(Slot::Expression, "replace an expression")?.edit = Some(Edit::ReplaceExpr(expr));
        self.changed = true;
        Ok(())
    }

    fn current_slot(&self) -> Option<Slot> {
        self.frames.last().map(|f| f.slot)
    }

    fn edit_frame(&mut self, required: Slot, edit: &'static str) -> Result<&mut Frame, IrError> {
        match self.frames.last_mut() {
            Some(frame) if frame.slot == required => Ok(frame),
            _ => Err(IrError::InvalidEdit { edit, required }),
        }
    }

    pub(crate) fn enter(&mut self, kind: NodeKind, slot: Slot) {
        self.frames.push(Frame {
            kind,
            slot,
            edit: None,
            before: Vec::new(),
            after: Vec::new(),
        });
    }

    pub(crate) fn leave(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Set the enclosing type, returning the previous one for restoring.
    pub(crate) fn set_enclosing_type(&mut self, ty: Option<TypeId>) -> Option<TypeId> {
        std::mem::replace(&mut self.enclosing_type, ty)
    }
}
