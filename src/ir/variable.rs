//! The variable-declaration family: data shared by fields, locals and
//! parameters, and the [`VariableDecl`] trait through which it is queried.

use self::sealed::{Token, VariableStorage};
use super::code::Expr;
use super::types::TypeRef;
use crate::error::IrError;
use crate::span::SourceInfo;

/// A declaration statement owned by the variable it initializes.
///
/// The enclosing block only holds a positional anchor
/// (`Stmt::Declare`); the initializer is reached through that anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclarationStatement {
    pub info: SourceInfo,
    pub initializer: Expr,
}

impl DeclarationStatement {
    pub fn new(info: SourceInfo, initializer: Expr) -> Self {
        Self { info, initializer }
    }
}

/// State common to every variable declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    info: SourceInfo,
    name: String,
    ty: TypeRef,
    is_final: bool,
    declaration: Option<DeclarationStatement>,
}

impl Variable {
    pub(crate) fn new(
        info: SourceInfo,
        name: impl Into<String>,
        ty: TypeRef,
        is_final: bool,
    ) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "variable names are never empty");
        Self {
            info,
            name,
            ty,
            is_final,
            declaration: None,
        }
    }

    pub fn info(&self) -> &SourceInfo {
        &self.info
    }

    pub(crate) fn mark_final(&mut self) {
        self.is_final = true;
    }

    pub(crate) fn declaration_mut(&mut self) -> Option<&mut DeclarationStatement> {
        self.declaration.as_mut()
    }
}

pub(crate) mod sealed {
    use super::Variable;

    /// Mutable access to the base record. Only this crate can produce a
    /// [`Token`], so other crates change flags through `set_final` alone.
    pub trait VariableStorage {
        fn variable_mut(&mut self, token: Token) -> &mut Variable;
    }

    pub struct Token(pub(crate) ());
}

/// Query and escalation surface of a variable declaration.
///
/// Implementors hold a [`Variable`]; the provided methods read through it.
/// `set_final` may be overridden by a specialization that adds
/// preconditions. The base record is read-only outside this crate:
///
/// ```compile_fail
/// use objir::ir::{Disposition, Field, PrimitiveType, Ty, TypeId, VariableDecl};
/// use objir::span::SourceInfo;
///
/// let int = Ty::primitive(PrimitiveType::Int);
/// let constant = Disposition::CompileTimeConstant;
/// let mut k = Field::new(SourceInfo::synthetic(), "K", TypeId(0), int, true, constant);
/// let _ = k.variable_mut();
/// ```
pub trait VariableDecl: VariableStorage {
    fn variable(&self) -> &Variable;

    fn info(&self) -> &SourceInfo {
        &self.variable().info
    }

    fn name(&self) -> &str {
        &self.variable().name
    }

    fn ty(&self) -> &TypeRef {
        &self.variable().ty
    }

    fn is_final(&self) -> bool {
        self.variable().is_final
    }

    fn declaration(&self) -> Option<&DeclarationStatement> {
        self.variable().declaration.as_ref()
    }

    /// The initializer expression, if a declaration statement is attached.
    fn initializer(&self) -> Option<&Expr> {
        self.declaration().map(|decl| &decl.initializer)
    }

    /// Attach or replace the declaration statement. No legality checks.
    fn set_initializer(&mut self, declaration: DeclarationStatement) {
        self.variable_mut(Token(())).declaration = Some(declaration);
    }

    fn set_final(&mut self) -> Result<(), IrError> {
        self.variable_mut(Token(())).mark_final();
        Ok(())
    }
}

/// A method-local variable.
#[derive(Clone, Debug, PartialEq)]
pub struct Local {
    var: Variable,
}

impl Local {
    pub fn new(info: SourceInfo, name: impl Into<String>, ty: TypeRef, is_final: bool) -> Self {
        Self {
            var: Variable::new(info, name, ty, is_final),
        }
    }
}

impl VariableDecl for Local {
    fn variable(&self) -> &Variable {
        &self.var
    }
}

impl VariableStorage for Local {
    fn variable_mut(&mut self, _: Token) -> &mut Variable {
        &mut self.var
    }
}

/// A method parameter. Its value is bound by the caller, so a parameter
/// starts without a declaration statement; `set_initializer` still attaches
/// one, as for any variable.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    var: Variable,
}

impl Parameter {
    pub fn new(info: SourceInfo, name: impl Into<String>, ty: TypeRef, is_final: bool) -> Self {
        Self {
            var: Variable::new(info, name, ty, is_final),
        }
    }
}

impl VariableDecl for Parameter {
    fn variable(&self) -> &Variable {
        &self.var
    }
}

impl VariableStorage for Parameter {
    fn variable_mut(&mut self, _: Token) -> &mut Variable {
        &mut self.var
    }
}
