use super::context::{Context, Edit, Frame, Slot};
use super::{DeclTarget, NodeKind, Visitor};
use crate::error::IrError;
use crate::ir::{
    Annotation, Block, DeclaredType, Expr, Field, Local, Method, Parameter, Program, Stmt, TypeId,
    VarSlot,
};
use crate::span::SourceInfo;

/// A node that can offer itself and its traversable children to a visitor.
pub trait Traverse {
    fn traverse<V: Visitor + ?Sized>(&mut self, visitor: &mut V, cx: &mut Context) -> Result<(), IrError>;
}

/// Traverse every declared type of `program` in id order with a fresh context.
pub fn traverse_program<V: Visitor + ?Sized>(visitor: &mut V, program: &mut Program) -> Result<Context, IrError> {
    let mut cx = Context::new();
    for ty in program.types_mut() {
        ty.traverse(visitor, &mut cx)?;
    }
    Ok(cx)
}

impl Traverse for DeclaredType {
    fn traverse<V: Visitor + ?Sized>(&mut self, visitor: &mut V, cx: &mut Context) -> Result<(), IrError> {
        tracing::trace!(ty = %self.name, "traversing declared type");
        cx.enter(NodeKind::DeclaredType, Slot::Fixed);
        let outer = cx.set_enclosing_type(Some(self.id));
        if visitor.visit_type(self, cx)? {
            self.annotations = visitor.accept_annotations(&self.annotations, cx)?;
            for field in self.fields.iter_mut() {
                field.traverse(visitor, cx)?;
            }
            let DeclaredType { fields, methods, .. } = self;
            for method in methods.iter_mut() {
                walk_method(visitor, cx, method, fields)?;
            }
        }
        visitor.end_visit_type(self, cx)?;
        cx.set_enclosing_type(outer);
        cx.leave();
        Ok(())
    }
}

impl Traverse for Field {
    fn traverse<V: Visitor + ?Sized>(&mut self, visitor: &mut V, cx: &mut Context) -> Result<(), IrError> {
        cx.enter(NodeKind::Field, Slot::Fixed);
        if visitor.visit_field(self, cx)? {
            let annotations = visitor.accept_annotations(self.annotations(), cx)?;
            self.replace_annotations(annotations);
            // The declaration statement is visited from its anchor in the
            // initializer block, not from here.
        }
        visitor.end_visit_field(self, cx)?;
        cx.leave();
        Ok(())
    }
}

impl Traverse for Parameter {
    fn traverse<V: Visitor + ?Sized>(&mut self, visitor: &mut V, cx: &mut Context) -> Result<(), IrError> {
        cx.enter(NodeKind::Parameter, Slot::Fixed);
        visitor.visit_parameter(self, cx)?;
        visitor.end_visit_parameter(self, cx)?;
        cx.leave();
        Ok(())
    }
}

impl Traverse for Expr {
    fn traverse<V: Visitor + ?Sized>(&mut self, visitor: &mut V, cx: &mut Context) -> Result<(), IrError> {
        walk_expr(visitor, cx, self)
    }
}

/// Variables a block's declaration anchors may resolve to.
struct Scope<'a> {
    owner: TypeId,
    fields: &'a mut [Field],
    locals: &'a mut [Local],
}

impl Scope<'_> {
    fn resolve(&mut self, slot: VarSlot, info: &SourceInfo) -> Result<DeclTarget<'_>, IrError> {
        let target = match slot {
            VarSlot::Field(id) if id.owner == self.owner => {
                self.fields
                    .get_mut(id.index as usize)
                    .map(|field| DeclTarget::Field { id, field })
            }
            VarSlot::Field(_) => None,
            VarSlot::Local(id) => self
                .locals
                .get_mut(id.0 as usize)
                .map(|local| DeclTarget::Local { id, local }),
        };
        target.ok_or_else(|| IrError::DanglingSlot {
            slot,
            info: info.clone(),
        })
    }
}

pub(super) fn walk_annotation<V: Visitor + ?Sized>(
    visitor: &mut V,
    annotation: &Annotation,
    cx: &mut Context,
) -> Result<(), IrError> {
    cx.enter(NodeKind::Annotation, Slot::Fixed);
    visitor.visit_annotation(annotation, cx)?;
    visitor.end_visit_annotation(annotation, cx)?;
    cx.leave();
    Ok(())
}

fn walk_method<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Context,
    method: &mut Method,
    fields: &mut [Field],
) -> Result<(), IrError> {
    cx.enter(NodeKind::Method, Slot::Fixed);
    if visitor.visit_method(method, cx)? {
        method.annotations = visitor.accept_annotations(&method.annotations, cx)?;
        let owner = method.enclosing_type;
        let Method {
            params,
            locals,
            body,
            ..
        } = method;
        for param in params.iter_mut() {
            param.traverse(visitor, cx)?;
        }
        if let Some(body) = body {
            let mut scope = Scope {
                owner,
                fields,
                locals,
            };
            walk_fixed_block(visitor, cx, body, &mut scope)?;
        }
    }
    visitor.end_visit_method(method, cx)?;
    cx.leave();
    Ok(())
}

/// A block that is not itself an element of a statement list.
fn walk_fixed_block<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Context,
    block: &mut Block,
    scope: &mut Scope<'_>,
) -> Result<(), IrError> {
    cx.enter(NodeKind::Block, Slot::Fixed);
    walk_block(visitor, cx, block, scope)?;
    cx.leave();
    Ok(())
}

fn walk_block<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Context,
    block: &mut Block,
    scope: &mut Scope<'_>,
) -> Result<(), IrError> {
    if visitor.visit_block(block, cx)? {
        walk_stmts(visitor, cx, &mut block.stmts, scope)?;
    }
    visitor.end_visit_block(block, cx)
}

fn walk_stmts<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Context,
    stmts: &mut Vec<Stmt>,
    scope: &mut Scope<'_>,
) -> Result<(), IrError> {
    let mut i = 0;
    while i < stmts.len() {
        cx.enter(NodeKind::of_stmt(&stmts[i]), Slot::Statement);
        walk_stmt(visitor, cx, &mut stmts[i], scope)?;
        i = match cx.leave() {
            Some(frame) => apply_stmt_edits(stmts, i, frame),
            None => i + 1,
        };
    }
    Ok(())
}

/// Apply the edits recorded for `stmts[i]`; returns the index of the next
/// statement to visit.
fn apply_stmt_edits(stmts: &mut Vec<Stmt>, i: usize, frame: Frame) -> usize {
    let Frame {
        edit,
        before,
        after,
        ..
    } = frame;
    let at = i + before.len();
    stmts.splice(i..i, before);
    let next = match edit {
        Some(Edit::Remove) => {
            stmts.remove(at);
            at
        }
        Some(Edit::ReplaceStmt(stmt)) => {
            stmts[at] = stmt;
            at + 1
        }
        Some(Edit::ReplaceExpr(_)) | None => at + 1,
    };
    let inserted = after.len();
    stmts.splice(next..next, after);
    next + inserted
}

fn walk_stmt<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Context,
    stmt: &mut Stmt,
    scope: &mut Scope<'_>,
) -> Result<(), IrError> {
    match stmt {
        Stmt::Declare { info, target } => return walk_declaration(visitor, cx, info, *target, scope),
        Stmt::Block(block) => return walk_block(visitor, cx, block, scope),
        _ => {}
    }
    if visitor.visit_stmt(stmt, cx)? {
        match stmt {
            Stmt::Expr { expr, .. } => walk_expr(visitor, cx, expr)?,
            Stmt::Return {
                value: Some(value), ..
            } => walk_expr(visitor, cx, value)?,
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                walk_expr(visitor, cx, cond)?;
                walk_fixed_block(visitor, cx, then_block, scope)?;
                if let Some(else_block) = else_block {
                    walk_fixed_block(visitor, cx, else_block, scope)?;
                }
            }
            Stmt::Return { value: None, .. } | Stmt::Declare { .. } | Stmt::Block(_) => {}
        }
    }
    visitor.end_visit_stmt(stmt, cx)
}

fn walk_declaration<V: Visitor + ?Sized>(
    visitor: &mut V,
    cx: &mut Context,
    info: &SourceInfo,
    slot: VarSlot,
    scope: &mut Scope<'_>,
) -> Result<(), IrError> {
    let mut target = scope.resolve(slot, info)?;
    if visitor.visit_declaration(&mut target, info, cx)? {
        if let Some(decl) = target.declaration_mut() {
            walk_expr(visitor, cx, &mut decl.initializer)?;
        }
    }
    visitor.end_visit_declaration(&mut target, info, cx)
}

fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, cx: &mut Context, expr: &mut Expr) -> Result<(), IrError> {
    cx.enter(NodeKind::of_expr(expr), Slot::Expression);
    if visitor.visit_expr(expr, cx)? {
        match expr {
            Expr::FieldRef {
                instance: Some(instance),
                ..
            } => walk_expr(visitor, cx, instance)?,
            Expr::Binary { lhs, rhs, .. } => {
                walk_expr(visitor, cx, lhs)?;
                walk_expr(visitor, cx, rhs)?;
            }
            _ => {}
        }
    }
    visitor.end_visit_expr(expr, cx)?;
    if let Some(Frame {
        edit: Some(Edit::ReplaceExpr(replacement)),
        ..
    }) = cx.leave()
    {
        *expr = replacement;
    }
    Ok(())
}
