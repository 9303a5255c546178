//! Java-like listing of declared types, as a code generator would emit them.

use crate::ir::{
    Annotations, Block, CanBeStatic, DeclaredType, Expr, Field, Method, Program, Stmt, TypeId,
    VarSlot, VariableDecl,
};

const INDENT: &str = "    ";

/// Render the declared type `id` of `program`, or an empty string if the
/// id is unknown.
pub fn print_type(program: &Program, id: TypeId) -> String {
    let Some(ty) = program.ty(id) else {
        return String::new();
    };
    let mut printer = Printer {
        program,
        owner: id,
        method: None,
        output: String::new(),
        depth: 0,
    };
    printer.emit_type(ty);
    printer.output
}

/// Render every declared type in id order, separated by blank lines.
pub fn print_program(program: &Program) -> String {
    program
        .types()
        .iter()
        .map(|ty| print_type(program, ty.id()))
        .collect::<Vec<_>>()
        .join("\n")
}

struct Printer<'a> {
    program: &'a Program,
    owner: TypeId,
    method: Option<&'a Method>,
    output: String,
    depth: usize,
}

impl<'a> Printer<'a> {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.output.push_str(INDENT);
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn emit_annotations(&mut self, annotations: &Annotations) {
        for annotation in annotations {
            self.line(&annotation.to_string());
        }
    }

    fn emit_type(&mut self, ty: &'a DeclaredType) {
        self.emit_annotations(ty.annotations());
        self.line(&format!("{} {} {{", ty.kind().as_str(), ty.name()));
        self.depth += 1;
        for field in ty.fields() {
            self.emit_field(field);
        }
        for method in ty.methods().iter().filter(|m| !m.is_initializer()) {
            self.output.push('\n');
            self.emit_method(method);
        }
        self.depth -= 1;
        self.line("}");
    }

    fn emit_field(&mut self, field: &Field) {
        self.emit_annotations(field.annotations());
        let mut decl = String::new();
        if field.is_static() {
            decl.push_str("static ");
        }
        if field.is_final() {
            decl.push_str("final ");
        }
        if field.is_volatile() {
            decl.push_str("volatile ");
        }
        decl.push_str(&format!("{} {}", field.ty(), field.name()));
        if let Some(init) = field.initializer() {
            decl.push_str(&format!(" = {}", self.expr(init)));
        }
        decl.push(';');
        self.line(&decl);
    }

    fn emit_method(&mut self, method: &'a Method) {
        self.method = Some(method);
        self.emit_annotations(method.annotations());
        let params: Vec<String> = method
            .params()
            .iter()
            .map(|p| {
                let modifier = if p.is_final() { "final " } else { "" };
                format!("{}{} {}", modifier, p.ty(), p.name())
            })
            .collect();
        let modifier = if method.is_static() { "static " } else { "" };
        let signature = format!(
            "{}{} {}({})",
            modifier,
            method.return_ty(),
            method.name(),
            params.join(", ")
        );
        match method.body() {
            Some(body) => {
                self.line(&format!("{} {{", signature));
                self.emit_stmts(body);
                self.line("}");
            }
            None => self.line(&format!("{};", signature)),
        }
        self.method = None;
    }

    fn emit_stmts(&mut self, block: &Block) {
        self.depth += 1;
        for stmt in &block.stmts {
            self.emit_stmt(stmt);
        }
        self.depth -= 1;
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Declare { target, .. } => {
                let text = self.declaration(*target);
                self.line(&text);
            }
            Stmt::Expr { expr, .. } => {
                let text = format!("{};", self.expr(expr));
                self.line(&text);
            }
            Stmt::Return { value: None, .. } => self.line("return;"),
            Stmt::Return {
                value: Some(value), ..
            } => {
                let text = format!("return {};", self.expr(value));
                self.line(&text);
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                let text = format!("if ({}) {{", self.expr(cond));
                self.line(&text);
                self.emit_stmts(then_block);
                if let Some(else_block) = else_block {
                    self.line("} else {");
                    self.emit_stmts(else_block);
                }
                self.line("}");
            }
            Stmt::Block(block) => {
                self.line("{");
                self.emit_stmts(block);
                self.line("}");
            }
        }
    }

    /// A local's declaration statement; field anchors only occur in
    /// initializers, which are printed with their fields.
    fn declaration(&self, slot: VarSlot) -> String {
        let local = match slot {
            VarSlot::Local(id) => self.method.and_then(|m| m.local(id)),
            VarSlot::Field(_) => None,
        };
        let Some(local) = local else {
            return format!("/* {} */;", slot);
        };
        let modifier = if local.is_final() { "final " } else { "" };
        match local.initializer() {
            Some(init) => format!(
                "{}{} {} = {};",
                modifier,
                local.ty(),
                local.name(),
                self.expr(init)
            ),
            None => format!("{}{} {};", modifier, local.ty(), local.name()),
        }
    }

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => value.to_string(),
            Expr::FieldRef {
                field, instance, ..
            } => {
                let name = match self.program.field(*field) {
                    Some(f) => f.name().to_string(),
                    None => return format!("/* {} */", VarSlot::Field(*field)),
                };
                match instance {
                    Some(instance) => format!("{}.{}", self.operand(instance), name),
                    None if field.owner == self.owner => name,
                    None => match self.program.ty(field.owner) {
                        Some(owner) => format!("{}.{}", owner.name(), name),
                        None => name,
                    },
                }
            }
            Expr::LocalRef { local, .. } => self
                .method
                .and_then(|m| m.local(*local))
                .map(|l| l.name().to_string())
                .unwrap_or_else(|| format!("/* local #{} */", local.0)),
            Expr::ParamRef { param, .. } => self
                .method
                .and_then(|m| m.param(*param))
                .map(|p| p.name().to_string())
                .unwrap_or_else(|| format!("/* param #{} */", param.0)),
            Expr::This { .. } => "this".to_string(),
            Expr::Binary { op, lhs, rhs, .. } => {
                format!("{} {} {}", self.operand(lhs), op.as_str(), self.operand(rhs))
            }
        }
    }

    /// An expression in operand position; nested binaries get parentheses.
    fn operand(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary { .. } => format!("({})", self.expr(expr)),
            _ => self.expr(expr),
        }
    }
}
