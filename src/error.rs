//! Errors raised by the IR core.
//!
//! Every variant is a structural or programmer error detected at the point
//! of misuse. None of them is retryable: a pass that receives one must
//! abort, leaving any partial mutation in place.

use crate::diagnostic::Diagnostic;
use crate::ir::VarSlot;
use crate::span::SourceInfo;
use crate::visit::{NodeKind, Slot};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    /// A flag escalation would break the final/volatile exclusion.
    #[error("{message}: field `{field}`")]
    InvalidState {
        message: &'static str,
        field: String,
        info: SourceInfo,
    },
    /// A visitor was offered a node kind it does not handle.
    #[error("{visitor} cannot handle {kind} nodes")]
    UnsupportedNode {
        kind: NodeKind,
        visitor: &'static str,
        info: SourceInfo,
    },
    /// A traversal edit was requested from a position that cannot take it.
    #[error("cannot {edit}: the current node is not in a {required} slot")]
    InvalidEdit { edit: &'static str, required: Slot },
    /// A declaration anchor points at a variable its block cannot reach.
    #[error("declaration of {slot} does not resolve in this scope")]
    DanglingSlot { slot: VarSlot, info: SourceInfo },
    /// Post-pass verification found an inconsistent node.
    #[error("invariant violated in `{type_name}`: {detail}")]
    InvariantViolation {
        type_name: String,
        detail: String,
        info: SourceInfo,
    },
}

impl IrError {
    /// Provenance of the offending node, when the error has one.
    pub fn info(&self) -> Option<&SourceInfo> {
        match self {
            IrError::InvalidState { info, .. }
            | IrError::UnsupportedNode { info, .. }
            | IrError::DanglingSlot { info, .. }
            | IrError::InvariantViolation { info, .. } => Some(info),
            IrError::InvalidEdit { .. } => None,
        }
    }

    /// Convert to a compiler diagnostic anchored at the offending node.
    ///
    /// These are internal contract violations, so the diagnostic says so in
    /// a note and lists any inlining call sites.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let info = self.info().cloned().unwrap_or_else(SourceInfo::synthetic);
        let mut diag = Diagnostic::error(self.to_string(), info.span())
            .with_note("internal compiler error: a pass broke the IR contract".to_string());
        for site in info.expansion_chain() {
            diag = diag.with_note(format!("inlined at {}", site.span()));
        }
        if let IrError::InvalidState { .. } = self {
            diag = diag.with_help("check the pass ordering that escalated this field".to_string());
        }
        diag
    }
}
