use std::fmt;
use std::sync::Arc;

/// A source location: file ID + byte offset range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    pub file_id: u16,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(file_id: u16, start: u32, end: u32) -> Self {
        Self {
            file_id,
            start,
            end,
        }
    }

    pub fn dummy() -> Self {
        Self {
            file_id: 0,
            start: 0,
            end: 0,
        }
    }

    pub fn merge(self, other: Span) -> Span {
        debug_assert_eq!(self.file_id, other.file_id);
        Span {
            file_id: self.file_id,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.file_id, self.start, self.end)
    }
}

/// Provenance token attached to every IR node.
///
/// Records the span a node was parsed from and, once the node has been
/// copied by inlining, the chain of call sites it was expanded at. The token
/// is immutable: transformations clone it, or derive a new one with
/// [`SourceInfo::inlined_at`], but never rewrite it in place.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceInfo {
    span: Span,
    inlined_at: Option<Arc<SourceInfo>>,
}

impl SourceInfo {
    pub fn new(span: Span) -> Self {
        Self {
            span,
            inlined_at: None,
        }
    }

    /// Token for synthesized nodes with no source text of their own.
    pub fn synthetic() -> Self {
        Self::new(Span::dummy())
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Derive the provenance of a copy of this node expanded at `call_site`.
    ///
    /// The existing expansion chain is kept; `call_site` (and its own
    /// chain) become the outermost entries.
    pub fn inlined_at(&self, call_site: &SourceInfo) -> SourceInfo {
        let own: Vec<Span> = self.expansion_chain().map(|site| site.span).collect();
        let inlined_at = own
            .into_iter()
            .rev()
            .fold(Arc::new(call_site.clone()), |outer, span| {
                Arc::new(SourceInfo {
                    span,
                    inlined_at: Some(outer),
                })
            });
        SourceInfo {
            span: self.span,
            inlined_at: Some(inlined_at),
        }
    }

    /// Call sites this node was inlined at, innermost first.
    pub fn expansion_chain(&self) -> ExpansionChain<'_> {
        ExpansionChain {
            next: self.inlined_at.as_deref(),
        }
    }

    pub fn is_inlined(&self) -> bool {
        self.inlined_at.is_some()
    }
}

impl Default for SourceInfo {
    fn default() -> Self {
        SourceInfo::synthetic()
    }
}

impl From<Span> for SourceInfo {
    fn from(span: Span) -> Self {
        SourceInfo::new(span)
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.span)?;
        for site in self.expansion_chain() {
            write!(f, " (inlined at {})", site.span)?;
        }
        Ok(())
    }
}

/// Iterator over the inlining call sites of a [`SourceInfo`].
pub struct ExpansionChain<'a> {
    next: Option<&'a SourceInfo>,
}

impl<'a> Iterator for ExpansionChain<'a> {
    type Item = &'a SourceInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.inlined_at.as_deref();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(info: &SourceInfo) -> Vec<Span> {
        info.expansion_chain().map(|s| s.span()).collect()
    }

    #[test]
    fn test_fresh_token_has_no_chain() {
        let info = SourceInfo::new(Span::new(1, 4, 9));
        assert_eq!(info.span(), Span::new(1, 4, 9));
        assert!(!info.is_inlined());
        assert!(spans(&info).is_empty());
    }

    #[test]
    fn test_inlining_leaves_original_untouched() {
        let body = SourceInfo::new(Span::new(1, 10, 20));
        let call = SourceInfo::new(Span::new(2, 0, 5));
        let copy = body.inlined_at(&call);
        assert!(!body.is_inlined());
        assert_eq!(copy.span(), body.span());
        assert_eq!(spans(&copy), vec![Span::new(2, 0, 5)]);
    }

    #[test]
    fn test_nested_inlining_orders_innermost_first() {
        let body = SourceInfo::new(Span::new(1, 10, 20));
        let inner_call = SourceInfo::new(Span::new(2, 0, 5));
        let outer_call = SourceInfo::new(Span::new(3, 7, 8));
        let once = body.inlined_at(&inner_call);
        let twice = once.inlined_at(&outer_call);
        assert_eq!(spans(&twice), vec![Span::new(2, 0, 5), Span::new(3, 7, 8)]);
        assert_eq!(spans(&once), vec![Span::new(2, 0, 5)]);
    }

    #[test]
    fn test_call_site_chain_is_carried_over() {
        let body = SourceInfo::new(Span::new(1, 0, 1));
        let outer = SourceInfo::new(Span::new(4, 0, 1));
        let call = SourceInfo::new(Span::new(2, 0, 1)).inlined_at(&outer);
        let copy = body.inlined_at(&call);
        assert_eq!(spans(&copy), vec![Span::new(2, 0, 1), Span::new(4, 0, 1)]);
    }

    #[test]
    fn test_display_lists_call_sites() {
        let body = SourceInfo::new(Span::new(1, 10, 20));
        let call = SourceInfo::new(Span::new(2, 0, 5));
        assert_eq!(
            body.inlined_at(&call).to_string(),
            "1:10..20 (inlined at 2:0..5)"
        );
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(0, 5, 9);
        let b = Span::new(0, 2, 7);
        assert_eq!(a.merge(b), Span::new(0, 2, 9));
    }
}
