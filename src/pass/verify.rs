//! Structural checks run between passes.

use crate::error::IrError;
use crate::ir::{CanBeStatic, DeclaredType, Expr, Field, FieldId, Method, Program, VariableDecl};
use crate::span::SourceInfo;
use crate::visit::{traverse_program, Context, DeclTarget, Traverse, Visitor};

/// Check every declared type of `program`. Returns the first violation.
pub fn verify_program(program: &mut Program) -> Result<(), IrError> {
    traverse_program(&mut InvariantChecker::default(), program)?;
    Ok(())
}

/// Check a single declared type in isolation.
pub fn verify_type(ty: &mut DeclaredType) -> Result<(), IrError> {
    ty.traverse(&mut InvariantChecker::default(), &mut Context::new())
}

/// Visitor that rejects fields whose flags, ownership or declaration
/// anchors are inconsistent.
#[derive(Default)]
struct InvariantChecker {
    type_name: String,
    /// Anchor sites seen per field index.
    anchors: Vec<Vec<SourceInfo>>,
    /// Staticness of the initializer being walked; `None` outside initializers.
    initializer: Option<bool>,
}

impl InvariantChecker {
    fn violation(&self, detail: String, info: &SourceInfo) -> IrError {
        IrError::InvariantViolation {
            type_name: self.type_name.clone(),
            detail,
            info: info.clone(),
        }
    }

    fn check_flags(&self, field: &Field) -> Result<(), IrError> {
        let name = field.name();
        if field.is_final() && field.is_volatile() {
            return Err(self.violation(
                format!("field `{}` is both final and volatile", name),
                field.info(),
            ));
        }
        if field.is_compile_time_constant() && !field.is_final() {
            return Err(self.violation(
                format!("compile-time constant `{}` is not final", name),
                field.info(),
            ));
        }
        if field.is_this_capture() {
            if !field.is_final() {
                return Err(self.violation(
                    format!("this-capture `{}` is not final", name),
                    field.info(),
                ));
            }
            if field.is_static() {
                return Err(self.violation(
                    format!("this-capture `{}` is static", name),
                    field.info(),
                ));
            }
        }
        Ok(())
    }

    fn check_anchor(&self, id: FieldId, field: &Field, info: &SourceInfo) -> Result<(), IrError> {
        match self.initializer {
            Some(is_static) if is_static == field.is_static() => Ok(()),
            Some(_) => Err(self.violation(
                format!(
                    "field `{}` is anchored in the wrong initializer",
                    field.name()
                ),
                info,
            )),
            None => Err(self.violation(
                format!(
                    "field `{}` (#{}) is anchored outside an initializer",
                    field.name(),
                    id.index
                ),
                info,
            )),
        }
    }
}

impl Visitor for InvariantChecker {
    fn visit_type(&mut self, ty: &mut DeclaredType, _cx: &mut Context) -> Result<bool, IrError> {
        self.type_name = ty.name().to_string();
        self.anchors = vec![Vec::new(); ty.fields().len()];
        Ok(true)
    }

    fn end_visit_type(&mut self, ty: &mut DeclaredType, _cx: &mut Context) -> Result<(), IrError> {
        for (field, sites) in ty.fields().iter().zip(&self.anchors) {
            match sites.as_slice() {
                [_] => {}
                [] => {
                    return Err(self.violation(
                        format!("field `{}` has no declaration anchor", field.name()),
                        field.info(),
                    ))
                }
                [_, second, ..] => {
                    return Err(self.violation(
                        format!("field `{}` is anchored {} times", field.name(), sites.len()),
                        second,
                    ))
                }
            }
        }
        Ok(())
    }

    fn visit_field(&mut self, field: &mut Field, cx: &mut Context) -> Result<bool, IrError> {
        self.check_flags(field)?;
        if cx.enclosing_type() != Some(field.enclosing_type()) {
            return Err(self.violation(
                format!(
                    "field `{}` claims enclosing type #{}",
                    field.name(),
                    field.enclosing_type().0
                ),
                field.info(),
            ));
        }
        Ok(false)
    }

    fn visit_method(&mut self, method: &mut Method, _cx: &mut Context) -> Result<bool, IrError> {
        self.initializer = method.is_initializer().then(|| method.is_static());
        Ok(true)
    }

    fn end_visit_method(&mut self, _method: &mut Method, _cx: &mut Context) -> Result<(), IrError> {
        self.initializer = None;
        Ok(())
    }

    fn visit_declaration(
        &mut self,
        decl: &mut DeclTarget<'_>,
        info: &SourceInfo,
        _cx: &mut Context,
    ) -> Result<bool, IrError> {
        if let DeclTarget::Field { id, field } = decl {
            self.check_anchor(*id, field, info)?;
            if let Some(sites) = self.anchors.get_mut(id.index as usize) {
                sites.push(info.clone());
            }
        }
        Ok(false)
    }

    fn visit_expr(&mut self, _expr: &mut Expr, _cx: &mut Context) -> Result<bool, IrError> {
        Ok(false)
    }
}
