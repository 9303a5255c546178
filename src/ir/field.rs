//! Field declarations and the construction-time disposition that seeds
//! their flags.

use super::capability::{CanBeStatic, HasEnclosingType};
use super::declared::Annotations;
use super::literal::ValueLiteral;
use super::types::TypeRef;
use super::variable::sealed::{Token, VariableStorage};
use super::variable::{Variable, VariableDecl};
use super::TypeId;
use crate::error::IrError;
use crate::span::SourceInfo;

/// How a field is declared: constant, final, volatile, or none of these.
///
/// Only consumed by [`Field::new`]. It is not stored: a field can become
/// final later through a path no disposition describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Disposition {
    CompileTimeConstant,
    Final,
    None,
    /// Synthetic field holding a captured enclosing instance.
    ThisCapture,
    Volatile,
}

impl Disposition {
    pub fn is_final(self) -> bool {
        matches!(
            self,
            Disposition::CompileTimeConstant | Disposition::Final | Disposition::ThisCapture
        )
    }

    pub fn is_this_capture(self) -> bool {
        self == Disposition::ThisCapture
    }

    fn is_compile_time_constant(self) -> bool {
        self == Disposition::CompileTimeConstant
    }

    fn is_volatile(self) -> bool {
        self == Disposition::Volatile
    }
}

/// A field of a declared type.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    var: Variable,
    enclosing_type: TypeId,
    is_static: bool,
    is_compile_time_constant: bool,
    is_this_capture: bool,
    is_volatile: bool,
    annotations: Annotations,
}

impl Field {
    pub fn new(
        info: SourceInfo,
        name: impl Into<String>,
        enclosing_type: TypeId,
        ty: TypeRef,
        is_static: bool,
        disposition: Disposition,
    ) -> Self {
        Self {
            var: Variable::new(info, name, ty, disposition.is_final()),
            enclosing_type,
            is_static,
            is_compile_time_constant: disposition.is_compile_time_constant(),
            is_this_capture: disposition.is_this_capture(),
            is_volatile: disposition.is_volatile(),
            annotations: Annotations::default(),
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// The declared type that owns this field.
    pub fn enclosing_type(&self) -> TypeId {
        self.enclosing_type
    }

    /// The initializer as a literal, if it is one.
    ///
    /// Whether a compile-time constant really has a literal initializer is
    /// decided upstream; this is only a query.
    pub fn literal_initializer(&self) -> Option<&ValueLiteral> {
        self.initializer().and_then(|init| init.as_literal())
    }

    pub fn is_compile_time_constant(&self) -> bool {
        self.is_compile_time_constant
    }

    pub fn is_this_capture(&self) -> bool {
        self.is_this_capture
    }

    pub fn is_volatile(&self) -> bool {
        self.is_volatile
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub(crate) fn replace_annotations(&mut self, annotations: Annotations) {
        self.annotations = annotations;
    }

    pub fn set_volatile(&mut self) -> Result<(), IrError> {
        if self.is_final() {
            return Err(self.invalid_state("Final fields cannot be set volatile"));
        }
        if !self.is_volatile {
            tracing::debug!(field = self.name(), "field escalated to volatile");
        }
        self.is_volatile = true;
        Ok(())
    }

    fn invalid_state(&self, message: &'static str) -> IrError {
        IrError::InvalidState {
            message,
            field: self.name().to_string(),
            info: self.info().clone(),
        }
    }
}

impl VariableDecl for Field {
    fn variable(&self) -> &Variable {
        &self.var
    }

    fn set_final(&mut self) -> Result<(), IrError> {
        if self.is_volatile {
            return Err(self.invalid_state("Volatile fields cannot be set final"));
        }
        if !self.is_final() {
            tracing::debug!(field = self.name(), "field escalated to final");
        }
        self.var.mark_final();
        Ok(())
    }
}

impl VariableStorage for Field {
    fn variable_mut(&mut self, _: Token) -> &mut Variable {
        &mut self.var
    }
}

impl CanBeStatic for Field {
    fn is_static(&self) -> bool {
        self.is_static
    }
}

impl HasEnclosingType for Field {
    fn enclosing_type(&self) -> Option<TypeId> {
        Some(self.enclosing_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Expr, PrimitiveType, Ty};
    use crate::ir::variable::DeclarationStatement;

    fn field(disposition: Disposition) -> Field {
        Field::new(
            SourceInfo::synthetic(),
            "f",
            TypeId(0),
            Ty::primitive(PrimitiveType::Int),
            false,
            disposition,
        )
    }

    fn flags(f: &Field) -> (bool, bool, bool, bool) {
        (
            f.is_final(),
            f.is_volatile(),
            f.is_compile_time_constant(),
            f.is_this_capture(),
        )
    }

    #[test]
    fn test_disposition_predicates() {
        assert!(Disposition::CompileTimeConstant.is_final());
        assert!(Disposition::Final.is_final());
        assert!(Disposition::ThisCapture.is_final());
        assert!(!Disposition::None.is_final());
        assert!(!Disposition::Volatile.is_final());
        assert!(Disposition::ThisCapture.is_this_capture());
        assert!(!Disposition::Final.is_this_capture());
    }

    #[test]
    fn test_flags_seeded_from_disposition() {
        assert_eq!(flags(&field(Disposition::None)), (false, false, false, false));
        assert_eq!(flags(&field(Disposition::Final)), (true, false, false, false));
        assert_eq!(flags(&field(Disposition::Volatile)), (false, true, false, false));
        assert_eq!(
            flags(&field(Disposition::CompileTimeConstant)),
            (true, false, true, false)
        );
        assert_eq!(flags(&field(Disposition::ThisCapture)), (true, false, false, true));
    }

    #[test]
    fn test_set_final_on_volatile_fails_without_mutation() {
        let mut f = field(Disposition::Volatile);
        let err = f.set_final().unwrap_err();
        assert!(matches!(
            err,
            IrError::InvalidState { message: "Volatile fields cannot be set final", .. }
        ));
        assert_eq!(flags(&f), (false, true, false, false));
    }

    #[test]
    fn test_set_volatile_on_final_fails_without_mutation() {
        for disposition in [
            Disposition::Final,
            Disposition::CompileTimeConstant,
            Disposition::ThisCapture,
        ] {
            let mut f = field(disposition);
            let before = flags(&f);
            assert!(matches!(f.set_volatile(), Err(IrError::InvalidState { .. })));
            assert_eq!(flags(&f), before);
        }
    }

    #[test]
    fn test_escalations_are_idempotent() {
        let mut f = field(Disposition::None);
        f.set_volatile().unwrap();
        f.set_volatile().unwrap();
        assert_eq!(flags(&f), (false, true, false, false));

        let mut g = field(Disposition::None);
        g.set_final().unwrap();
        g.set_final().unwrap();
        assert_eq!(flags(&g), (true, false, false, false));
    }

    #[test]
    fn test_literal_initializer() {
        let mut f = field(Disposition::CompileTimeConstant);
        assert!(f.literal_initializer().is_none());

        f.set_initializer(DeclarationStatement::new(
            SourceInfo::synthetic(),
            Expr::literal(SourceInfo::synthetic(), ValueLiteral::Int(42)),
        ));
        assert_eq!(f.literal_initializer(), Some(&ValueLiteral::Int(42)));

        f.set_initializer(DeclarationStatement::new(
            SourceInfo::synthetic(),
            Expr::This {
                info: SourceInfo::synthetic(),
                ty: TypeId(0),
            },
        ));
        assert!(f.literal_initializer().is_none());
        assert!(f.initializer().is_some());
        assert!(f.is_compile_time_constant());
    }

    #[test]
    fn test_capabilities() {
        let f = Field::new(
            SourceInfo::synthetic(),
            "COUNT",
            TypeId(3),
            Ty::primitive(PrimitiveType::Int),
            true,
            Disposition::Final,
        );
        assert!(CanBeStatic::is_static(&f));
        assert_eq!(f.enclosing_type(), TypeId(3));
        assert_eq!(HasEnclosingType::enclosing_type(&f), Some(TypeId(3)));
    }
}
