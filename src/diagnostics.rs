use std::fmt;

/// Analysis stage a diagnostic originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexical,
    Syntax,
    Structural,
    Semantic,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Lexical => "Lexical",
            Stage::Syntax => "Syntax",
            Stage::Structural => "Structural",
            Stage::Semantic => "Semantic",
        }
    }
}

/// Notes cover implicit-cast and type-inference notices; they are not failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Note,
}

/// A positioned, stage-tagged report of an error or informational note
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    pub stage: Stage,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "line {}: {}", self.line, self.message),
            Severity::Note => write!(f, "line {}: note: {}", self.line, self.message),
        }
    }
}

/// Ordered, append-only diagnostic collection shared by all stages.
///
/// Diagnostics are emitted in discovery order and rendered grouped by stage.
/// A fresh collection is created per analysis call; nothing persists.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn error(&mut self, stage: Stage, line: usize, message: String) {
        self.push(Diagnostic {
            line,
            stage,
            severity: Severity::Error,
            message,
        });
    }

    pub fn note(&mut self, stage: Stage, line: usize, message: String) {
        self.push(Diagnostic {
            line,
            stage,
            severity: Severity::Note,
            message,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All Error-severity diagnostics, in encounter order
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Renders diagnostics grouped under labeled stage headings, in encounter
    /// order within each stage. Stages with no diagnostics get a success
    /// sentinel; the Semantic section ends with an error-count summary.
    pub fn render(&self, stages: &[Stage]) -> String {
        let mut out = String::new();

        for &stage in stages {
            out.push_str("--- ");
            out.push_str(stage.label());
            out.push_str(" ---\n");

            let mut any = false;
            for d in self.items.iter().filter(|d| d.stage == stage) {
                out.push_str(&d.to_string());
                out.push('\n');
                any = true;
            }

            let errors = self
                .items
                .iter()
                .filter(|d| d.stage == stage && d.severity == Severity::Error)
                .count();

            if !any {
                out.push_str(&format!("no {} errors found\n", stage.label().to_lowercase()));
            } else if stage == Stage::Semantic {
                if errors == 0 {
                    out.push_str("semantic analysis succeeded, no errors found\n");
                } else {
                    out.push_str(&format!(
                        "semantic analysis completed with {} error(s)\n",
                        errors
                    ));
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encounter_order_preserved() {
        let mut diags = Diagnostics::new();
        diags.error(Stage::Semantic, 3, "first".to_string());
        diags.error(Stage::Semantic, 1, "second".to_string());

        let lines: Vec<usize> = diags.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![3, 1]);
    }

    #[test]
    fn test_push_appends_a_prebuilt_diagnostic() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic {
            line: 4,
            stage: Stage::Lexical,
            severity: Severity::Error,
            message: "unknown character '@'".to_string(),
        });
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.iter().next().unwrap().line, 4);
    }

    #[test]
    fn test_notes_are_not_errors() {
        let mut diags = Diagnostics::new();
        diags.note(Stage::Semantic, 1, "implicit cast".to_string());

        assert_eq!(diags.len(), 1);
        assert_eq!(diags.error_count(), 0);
        assert!(!diags.has_errors());
    }

    #[test]
    fn test_render_success_sentinel() {
        let diags = Diagnostics::new();
        let report = diags.render(&[Stage::Lexical]);

        assert!(report.contains("--- Lexical ---"));
        assert!(report.contains("no lexical errors found"));
    }

    #[test]
    fn test_render_semantic_summary() {
        let mut diags = Diagnostics::new();
        diags.error(Stage::Semantic, 2, "type mismatch".to_string());
        let report = diags.render(&[Stage::Semantic]);

        assert!(report.contains("line 2: type mismatch"));
        assert!(report.contains("completed with 1 error(s)"));
    }

    #[test]
    fn test_render_groups_by_stage() {
        let mut diags = Diagnostics::new();
        diags.error(Stage::Syntax, 5, "unexpected token".to_string());
        diags.error(Stage::Lexical, 1, "unknown character".to_string());

        let report = diags.render(&[Stage::Lexical, Stage::Syntax]);
        let lex_pos = report.find("unknown character").unwrap();
        let syn_pos = report.find("unexpected token").unwrap();
        assert!(lex_pos < syn_pos);
    }
}
