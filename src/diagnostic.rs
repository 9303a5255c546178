use crate::span::Span;

/// A compiler diagnostic (error or warning).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    fn report<'a>(&'a self, filename: &'a str, color: bool) -> ariadne::Report<'a, (&'a str, std::ops::Range<usize>)> {
        use ariadne::{Color, Config, Label, Report, ReportKind};

        let (kind, label_color) = match self.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        let range = self.span.start as usize..self.span.end as usize;
        let mut report = Report::build(kind, filename, range.start)
            .with_config(Config::default().with_color(color))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, range))
                    .with_message(&self.message)
                    .with_color(label_color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report.finish()
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        let printed = self
            .report(filename, true)
            .eprint((filename, ariadne::Source::from(source)));
        if let Err(err) = printed {
            tracing::warn!("failed to render diagnostic: {}", err);
        }
    }

    /// Render without color into a string.
    pub fn render_to_string(&self, filename: &str, source: &str) -> String {
        let mut out = Vec::new();
        let written = self
            .report(filename, false)
            .write((filename, ariadne::Source::from(source)), &mut out);
        if written.is_err() {
            return self.message.clone();
        }
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let span = Span::new(0, 10, 15);
        let d = Diagnostic::error("field cannot be final".to_string(), span);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "field cannot be final");
        assert_eq!(d.span.start, 10);
        assert_eq!(d.span.end, 15);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_chained_builders() {
        let d = Diagnostic::warning("unread field".to_string(), Span::new(0, 0, 5))
            .with_note("note 1".to_string())
            .with_help("help text".to_string())
            .with_note("note 2".to_string());
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.notes, vec!["note 1", "note 2"]);
        assert_eq!(d.help.as_deref(), Some("help text"));
    }

    #[test]
    fn test_render_to_string_mentions_message_and_file() {
        let source = "class Foo {\n  volatile int x;\n}\n";
        let d = Diagnostic::error("Volatile fields cannot be set final".to_string(), Span::new(0, 14, 29))
            .with_note("internal compiler error".to_string());
        let text = d.render_to_string("Foo.src", source);
        assert!(text.contains("Volatile fields cannot be set final"));
        assert!(text.contains("Foo.src"));
        assert!(text.contains("internal compiler error"));
    }

    #[test]
    fn test_render_diagnostics_multiple() {
        let source = "class A {\n  int x;\n  int y;\n}\n";
        let diagnostics = vec![
            Diagnostic::warning("unread x".to_string(), Span::new(0, 16, 17)),
            Diagnostic::warning("unread y".to_string(), Span::new(0, 25, 26)),
        ];
        // Just verify it doesn't panic
        render_diagnostics(&diagnostics, "A.src", source);
    }
}
