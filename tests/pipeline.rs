use objir::diagnostic::Severity;
use objir::ir::*;
use objir::print::print_type;
use objir::span::{SourceInfo, Span};
use objir::visit::DeclTarget;
use objir::{check_program_silent, optimize, traverse_program, Context, IrConfig, IrError, Visitor};

/// Helper: `class Outer { static final int SIZE = 16; class Inner { ... } }`
/// where `Inner` captures its outer instance and sums `SIZE` with its own constant.
fn nested_program() -> (Program, TypeId, TypeId) {
    let at = |start: u32| SourceInfo::new(Span::new(0, start, start + 4));
    let int = || Ty::primitive(PrimitiveType::Int);

    let mut program = Program::new();
    let outer = program.declare_type(at(0), "Outer", TypeKind::Class, None);
    let inner = program.declare_type(at(100), "Outer.Inner", TypeKind::Class, Some(outer));

    let size = program.ty_mut(outer).unwrap().add_field(
        at(10),
        "SIZE",
        int(),
        true,
        Disposition::CompileTimeConstant,
    );
    program.field_mut(size).unwrap().set_initializer(DeclarationStatement::new(
        at(20),
        Expr::literal(at(24), ValueLiteral::Int(16)),
    ));

    let outer_ref = program.ty(outer).unwrap().as_type_ref();
    let ty = program.ty_mut(inner).unwrap();
    ty.add_field(at(110), "this$0", outer_ref, false, Disposition::ThisCapture);
    let local_size = ty.add_field(at(120), "LOCAL", int(), true, Disposition::CompileTimeConstant);
    ty.field_mut(local_size).unwrap().set_initializer(DeclarationStatement::new(
        at(124),
        Expr::literal(at(128), ValueLiteral::Int(4)),
    ));
    let total = ty.add_field(at(130), "total", int(), false, Disposition::None);
    ty.field_mut(total).unwrap().set_initializer(DeclarationStatement::new(
        at(134),
        Expr::binary(
            at(136),
            BinaryOp::Add,
            Expr::static_field(at(138), size),
            Expr::static_field(at(142), local_size),
        ),
    ));
    (program, outer, inner)
}

// ── Order of visitation ──

#[derive(Default)]
struct DeclOrder(Vec<String>);

impl Visitor for DeclOrder {
    fn visit_declaration(
        &mut self,
        decl: &mut DeclTarget<'_>,
        _info: &SourceInfo,
        cx: &mut Context,
    ) -> Result<bool, IrError> {
        let owner = cx.enclosing_type().map(|t| t.0).unwrap_or(u32::MAX);
        self.0.push(format!("{}:{}", owner, decl.name()));
        Ok(true)
    }
}

#[test]
fn test_static_then_instance_initializers_per_type() {
    let (mut program, ..) = nested_program();
    let mut order = DeclOrder::default();
    traverse_program(&mut order, &mut program).unwrap();
    assert_eq!(order.0, vec!["0:SIZE", "1:LOCAL", "1:this$0", "1:total"]);
}

// ── Pipeline ──

#[test]
fn test_optimize_inlines_local_constants_only() {
    let (mut program, outer, inner) = nested_program();
    let report = optimize(&mut program, IrConfig::default()).unwrap();
    assert_eq!(report.changed_types("inline-constants"), Some(1));

    insta::assert_snapshot!(print_type(&program, inner), @r###"
    class Outer.Inner {
        final Outer this$0;
        static final int LOCAL = 4;
        int total = Outer.SIZE + 4;
    }
    "###);
    assert!(print_type(&program, outer).contains("static final int SIZE = 16;"));
}

#[test]
fn test_optimize_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(objir::config::CONFIG_FILE);
    std::fs::write(&path, "[ir]\nparallel = true\n").unwrap();
    let config = IrConfig::load(&path).unwrap();
    assert!(config.parallel && config.verify_after_each_pass);

    let (mut parallel, ..) = nested_program();
    let (mut sequential, ..) = nested_program();
    optimize(&mut parallel, config).unwrap();
    optimize(&mut sequential, IrConfig::default()).unwrap();
    assert_eq!(parallel, sequential);
}

// ── Verification diagnostics ──

#[test]
fn test_check_reports_inlined_provenance() {
    let (mut program, _, inner) = nested_program();
    let call = SourceInfo::new(Span::new(0, 300, 310));
    let ty = program.ty_mut(inner).unwrap();
    let stray = ty.add_method(
        SourceInfo::new(Span::new(0, 200, 204)),
        "helper",
        false,
        Ty::primitive(PrimitiveType::Void),
    );
    let total = ty.field_by_name("total").unwrap();
    let copied = SourceInfo::new(Span::new(0, 210, 214)).inlined_at(&call);
    let anchor = Stmt::declare(copied, VarSlot::Field(total));
    ty.method_mut(stray)
        .unwrap()
        .set_body(Block::new(SourceInfo::synthetic(), vec![anchor]));

    let errors = check_program_silent(&mut program).unwrap_err();
    assert_eq!(errors.len(), 1);
    let diag = &errors[0];
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.span, Span::new(0, 210, 214));
    assert!(diag.message.contains("anchored outside an initializer"), "{}", diag.message);
    assert!(diag.notes.iter().any(|n| n == "inlined at 0:300..310"));
}

#[test]
fn test_clean_program_checks() {
    let (mut program, ..) = nested_program();
    check_program_silent(&mut program).unwrap();
}
