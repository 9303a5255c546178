//! Pass scheduling over a program.
//!
//! A pass transforms one declared type at a time. Distinct types are
//! disjoint `&mut` borrows of the program arena, so the manager can hand them
//! to rayon workers without further synchronization.

pub mod verify;

use std::collections::HashMap;
use std::fmt;

use rayon::prelude::*;

use crate::config::IrConfig;
use crate::error::IrError;
use crate::ir::{DeclaredType, Expr, FieldId, Program, ValueLiteral};
use crate::visit::{Context, Traverse, Visitor};

pub use verify::{verify_program, verify_type};

/// A transformation applied to each declared type.
pub trait Pass: Send + Sync {
    fn name(&self) -> &str;

    /// Transform `ty`; returns whether anything changed.
    fn run_on_type(&self, ty: &mut DeclaredType) -> Result<bool, IrError>;
}

/// Per-pass outcome of a [`PassManager::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassOutcome {
    pub name: String,
    pub changed_types: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub passes: Vec<PassOutcome>,
}

impl PassReport {
    /// Types changed by the pass called `name`, if it ran.
    pub fn changed_types(&self, name: &str) -> Option<usize> {
        self.passes
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.changed_types)
    }

    pub fn any_changed(&self) -> bool {
        self.passes.iter().any(|p| p.changed_types > 0)
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.passes {
            writeln!(f, "{:<24} {} type(s) changed", p.name, p.changed_types)?;
        }
        Ok(())
    }
}

/// Runs an ordered list of passes over every declared type.
pub struct PassManager {
    config: IrConfig,
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new(config: IrConfig) -> Self {
        Self {
            config,
            passes: Vec::new(),
        }
    }

    pub fn add(&mut self, pass: impl Pass + 'static) -> &mut Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn config(&self) -> &IrConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order. The first error aborts the run; changes made
    /// before it stay in place.
    pub fn run(&self, program: &mut Program) -> Result<PassReport, IrError> {
        let mut report = PassReport::default();
        for pass in &self.passes {
            let span = tracing::info_span!("pass", name = pass.name());
            let _guard = span.enter();

            let changed_types = if self.config.parallel {
                let changed: Vec<bool> = program
                    .types_mut()
                    .par_iter_mut()
                    .map(|ty| pass.run_on_type(ty))
                    .collect::<Result<_, _>>()?;
                changed.into_iter().filter(|c| *c).count()
            } else {
                let mut count = 0;
                for ty in program.types_mut() {
                    if pass.run_on_type(ty)? {
                        count += 1;
                    }
                }
                count
            };
            tracing::info!(changed_types, "pass finished");

            if self.config.verify_after_each_pass {
                verify_program(program)?;
            }
            report.passes.push(PassOutcome {
                name: pass.name().to_string(),
                changed_types,
            });
        }
        Ok(report)
    }
}

/// Replaces reads of literal-initialized compile-time constants declared in
/// the same type with the literal itself.
#[derive(Debug, Default)]
pub struct InlineConstants;

impl Pass for InlineConstants {
    fn name(&self) -> &str {
        "inline-constants"
    }

    fn run_on_type(&self, ty: &mut DeclaredType) -> Result<bool, IrError> {
        let constants: HashMap<FieldId, ValueLiteral> = ty
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_compile_time_constant())
            .filter_map(|(index, f)| {
                let id = FieldId {
                    owner: ty.id(),
                    index: index as u32,
                };
                f.literal_initializer().map(|lit| (id, lit.clone()))
            })
            .collect();
        if constants.is_empty() {
            return Ok(false);
        }
        let mut cx = Context::new();
        ty.traverse(&mut ConstantInliner { constants }, &mut cx)?;
        Ok(cx.did_change())
    }
}

struct ConstantInliner {
    constants: HashMap<FieldId, ValueLiteral>,
}

impl Visitor for ConstantInliner {
    fn end_visit_expr(&mut self, expr: &mut Expr, cx: &mut Context) -> Result<(), IrError> {
        if let Expr::FieldRef {
            info,
            field,
            instance: None,
        } = expr
        {
            if let Some(value) = self.constants.get(field) {
                cx.replace_expr(Expr::literal(info.clone(), value.clone()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;
    use crate::span::SourceInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn int() -> TypeRef {
        Ty::primitive(PrimitiveType::Int)
    }

    /// `class C{n} { static final int K = {n}; static int v = K; }` for n types.
    fn program(types: usize) -> Program {
        let mut program = Program::new();
        for n in 0..types {
            let name = format!("C{}", n);
            let id = program.declare_type(SourceInfo::synthetic(), name, TypeKind::Class, None);
            let ty = program.ty_mut(id).unwrap();
            let constant = Disposition::CompileTimeConstant;
            let k = ty.add_field(SourceInfo::synthetic(), "K", int(), true, constant);
            ty.field_mut(k).unwrap().set_initializer(DeclarationStatement::new(
                SourceInfo::synthetic(),
                Expr::literal(SourceInfo::synthetic(), ValueLiteral::Int(n as i32)),
            ));
            let v = ty.add_field(SourceInfo::synthetic(), "v", int(), true, Disposition::None);
            ty.field_mut(v).unwrap().set_initializer(DeclarationStatement::new(
                SourceInfo::synthetic(),
                Expr::static_field(SourceInfo::synthetic(), k),
            ));
        }
        program
    }

    struct Counting(Arc<AtomicUsize>);

    impl Pass for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn run_on_type(&self, _ty: &mut DeclaredType) -> Result<bool, IrError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    #[test]
    fn test_inline_constants_sequential_and_parallel_agree() {
        let mut seq = program(8);
        let mut par = seq.clone();

        let mut manager = PassManager::new(IrConfig::default());
        manager.add(InlineConstants);
        let report = manager.run(&mut seq).unwrap();
        assert_eq!(report.changed_types("inline-constants"), Some(8));

        let mut manager = PassManager::new(IrConfig {
            parallel: true,
            ..IrConfig::default()
        });
        manager.add(InlineConstants);
        assert_eq!(manager.run(&mut par).unwrap(), report);
        assert_eq!(seq, par);

        let c3 = seq.type_by_name("C3").unwrap();
        let v = seq.ty(c3).unwrap().field_by_name("v").unwrap();
        let inlined = seq.field(v).unwrap().literal_initializer();
        assert_eq!(inlined, Some(&ValueLiteral::Int(3)));
    }

    #[test]
    fn test_second_run_reports_no_change() {
        let mut p = program(2);
        let mut manager = PassManager::new(IrConfig::default());
        manager.add(InlineConstants);
        assert!(manager.run(&mut p).unwrap().any_changed());
        assert!(!manager.run(&mut p).unwrap().any_changed());
    }

    #[test]
    fn test_every_type_visited_once_per_pass() {
        let mut p = program(5);
        let mut manager = PassManager::new(IrConfig {
            parallel: true,
            verify_after_each_pass: false,
        });
        let calls = Arc::new(AtomicUsize::new(0));
        manager.add(Counting(calls.clone())).add(Counting(calls.clone()));
        let report = manager.run(&mut p).unwrap();
        assert_eq!(report.changed_types("counting"), Some(0));
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    struct DropAnchors;

    impl Pass for DropAnchors {
        fn name(&self) -> &str {
            "drop-anchors"
        }

        fn run_on_type(&self, ty: &mut DeclaredType) -> Result<bool, IrError> {
            for method in ty.methods.iter_mut() {
                if let Some(body) = method.body_mut() {
                    body.stmts.clear();
                }
            }
            Ok(true)
        }
    }

    #[test]
    fn test_verification_catches_broken_pass() {
        let mut p = program(1);
        let mut manager = PassManager::new(IrConfig::default());
        manager.add(DropAnchors).add(InlineConstants);
        let err = manager.run(&mut p).unwrap_err();
        assert!(matches!(err, IrError::InvariantViolation { .. }), "{}", err);

        let mut p = program(1);
        let mut manager = PassManager::new(IrConfig {
            verify_after_each_pass: false,
            ..IrConfig::default()
        });
        manager.add(DropAnchors).add(InlineConstants);
        let report = manager.run(&mut p).unwrap();
        assert_eq!(report.changed_types("drop-anchors"), Some(1));
        // Without anchors the initializer is unreachable, so nothing inlines.
        assert_eq!(report.changed_types("inline-constants"), Some(0));
    }

    struct Fails;

    impl Pass for Fails {
        fn name(&self) -> &str {
            "fails"
        }

        fn run_on_type(&self, ty: &mut DeclaredType) -> Result<bool, IrError> {
            let k = ty.field_by_name("K").unwrap();
            ty.field_mut(k).unwrap().set_volatile()?;
            Ok(true)
        }
    }

    #[test]
    fn test_error_aborts_remaining_passes() {
        let mut p = program(1);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut manager = PassManager::new(IrConfig::default());
        manager.add(Fails).add(Counting(calls.clone()));
        let err = manager.run(&mut p).unwrap_err();
        assert_eq!(err.to_string(), "Final fields cannot be set volatile: field `K`");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
