pub mod config;
pub mod diagnostic;
pub mod error;
pub mod ir;
pub mod pass;
pub mod print;
pub mod syntax;
pub mod visit;

// Re-exports: short paths for the types every pass touches
pub use config::IrConfig;
pub use error::IrError;
pub use pass::{Pass, PassManager, PassReport};
pub use syntax::span;
pub use visit::{traverse_program, Context, Traverse, Visitor};

use diagnostic::{render_diagnostics, Diagnostic};
use ir::Program;

/// Run the standard pass pipeline over `program`.
pub fn optimize(program: &mut Program, config: IrConfig) -> Result<PassReport, IrError> {
    let mut manager = PassManager::new(config);
    manager.add(pass::InlineConstants);
    manager.run(program)
}

/// Verify `program`, rendering any violation against `source` on stderr.
pub fn check_program(program: &mut Program, filename: &str, source: &str) -> Result<(), Vec<Diagnostic>> {
    match pass::verify_program(program) {
        Ok(()) => Ok(()),
        Err(err) => {
            let errors = vec![err.to_diagnostic()];
            render_diagnostics(&errors, filename, source);
            Err(errors)
        }
    }
}

/// Like [`check_program`], without rendering.
pub fn check_program_silent(program: &mut Program) -> Result<(), Vec<Diagnostic>> {
    pass::verify_program(program).map_err(|err| vec![err.to_diagnostic()])
}
