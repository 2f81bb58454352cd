//! Line-oriented structural checker.
//!
//! A coarser fallback pass over physical source lines, independent of the
//! tokenizer and grammar, for input too broken to parse. Blank lines and
//! `//`-comment lines are skipped; brace and parenthesis matching runs over
//! every remaining line, including lines the classifier already recognized,
//! so well-formed class headers never produce phantom bracket errors.

use crate::diagnostics::{Diagnostics, Stage};

const ACCESS_MODIFIERS: [&str; 3] = ["public", "private", "protected"];
const MEMBER_MODIFIERS: [&str; 4] = ["public", "private", "protected", "static"];
const TYPE_KEYWORDS: [&str; 7] = ["int", "double", "float", "bool", "string", "char", "var"];

/// Check the basic line structure of the input. Per-line findings (brace
/// rules, declaration shapes, terminators, unmatched delimiters) are Syntax
/// diagnostics; the whole-input class-presence rule is the one Structural
/// diagnostic. An empty result means the input passed every rule.
pub fn check_basic_structure(source: &str) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let lines: Vec<&str> = source.lines().collect();

    let mut brace_stack: Vec<usize> = Vec::new();
    let mut paren_stack: Vec<usize> = Vec::new();
    let mut class_found = false;

    for (idx, raw_line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let stripped = raw_line.trim();

        if is_ignored(stripped) {
            continue;
        }

        // Bracket matching runs on every non-ignored line
        for c in raw_line.chars() {
            match c {
                '{' => brace_stack.push(line_no),
                '}' => {
                    if brace_stack.pop().is_none() {
                        diagnostics.error(
                            Stage::Syntax,
                            line_no,
                            "closing brace '}' without a matching opener".to_string(),
                        );
                    }
                }
                '(' => paren_stack.push(line_no),
                ')' => {
                    if paren_stack.pop().is_none() {
                        diagnostics.error(
                            Stage::Syntax,
                            line_no,
                            "closing parenthesis ')' without a matching opener".to_string(),
                        );
                    }
                }
                _ => {}
            }
        }

        if is_class_header(stripped) {
            class_found = true;
            if !stripped.contains('{') && !next_line_opens_brace(&lines, idx) {
                diagnostics.error(
                    Stage::Syntax,
                    line_no,
                    "missing '{' in class declaration".to_string(),
                );
            }
            continue;
        }

        if is_if_header(stripped) {
            if !next_line_opens_brace(&lines, idx) {
                diagnostics.error(
                    Stage::Syntax,
                    line_no,
                    "missing '{' after if".to_string(),
                );
            }
            continue;
        }

        if stripped == "else" {
            if !next_line_opens_brace(&lines, idx) {
                diagnostics.error(
                    Stage::Syntax,
                    line_no,
                    "missing '{' after else".to_string(),
                );
            }
            continue;
        }

        match classify_declaration(stripped) {
            DeclLine::Valid => continue,
            DeclLine::MissingName => {
                diagnostics.error(
                    Stage::Syntax,
                    line_no,
                    "variable declaration without a name".to_string(),
                );
                continue;
            }
            DeclLine::IncompleteInit => {
                diagnostics.error(
                    Stage::Syntax,
                    line_no,
                    "incomplete variable initialization".to_string(),
                );
                continue;
            }
            DeclLine::NotADeclaration => {}
        }

        if is_method_header(stripped) {
            if !stripped.contains('{') && !next_line_opens_brace(&lines, idx) {
                diagnostics.error(
                    Stage::Syntax,
                    line_no,
                    "missing '{' in method declaration".to_string(),
                );
            }
            continue;
        }

        // Terminator rules for whatever is left
        if stripped.ends_with(';') || stripped.ends_with('{') || stripped.ends_with('}') {
            continue;
        }
        if stripped.contains('=') || stripped.contains('(') || stripped.contains(')') {
            diagnostics.error(
                Stage::Syntax,
                line_no,
                "missing semicolon ';'".to_string(),
            );
        } else if is_bare_identifier(stripped) {
            diagnostics.error(
                Stage::Syntax,
                line_no,
                format!("invalid or incomplete statement: '{}'", stripped),
            );
        } else {
            diagnostics.error(
                Stage::Syntax,
                line_no,
                format!("invalid statement: '{}'", stripped),
            );
        }
    }

    for line_no in brace_stack {
        diagnostics.error(
            Stage::Syntax,
            line_no,
            "opening brace '{' is never closed".to_string(),
        );
    }
    for line_no in paren_stack {
        diagnostics.error(
            Stage::Syntax,
            line_no,
            "opening parenthesis '(' is never closed".to_string(),
        );
    }

    if !class_found {
        diagnostics.error(
            Stage::Structural,
            1,
            "no class declaration found in the input".to_string(),
        );
    }

    diagnostics
}

// Line classification

fn is_ignored(stripped: &str) -> bool {
    stripped.is_empty() || stripped.starts_with("//")
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_bare_identifier(stripped: &str) -> bool {
    let mut chars = stripped.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(is_ident_char),
        _ => false,
    }
}

/// First non-ignored line after `idx` starts with '{'
fn next_line_opens_brace(lines: &[&str], idx: usize) -> bool {
    lines[idx + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !is_ignored(l))
        .map_or(false, |l| l.starts_with('{'))
}

/// Strip a run of leading modifier words from the line
fn strip_modifiers<'a>(mut s: &'a str, modifiers: &[&str]) -> &'a str {
    'outer: loop {
        for m in modifiers {
            if let Some(rest) = s.strip_prefix(m) {
                if rest.starts_with(char::is_whitespace) {
                    s = rest.trim_start();
                    continue 'outer;
                }
            }
        }
        return s;
    }
}

/// `[access] class Name ...`
fn is_class_header(stripped: &str) -> bool {
    let rest = strip_modifiers(stripped, &ACCESS_MODIFIERS);
    match rest.strip_prefix("class") {
        Some(after) if after.starts_with(char::is_whitespace) => after
            .trim_start()
            .starts_with(|c: char| c.is_ascii_alphabetic() || c == '_'),
        _ => false,
    }
}

/// `if ( ... )` with nothing after the closing parenthesis
fn is_if_header(stripped: &str) -> bool {
    match stripped.strip_prefix("if") {
        Some(rest) if !rest.starts_with(is_ident_char) => {
            rest.trim_start().starts_with('(') && stripped.ends_with(')')
        }
        _ => false,
    }
}

/// Consume a leading type keyword or a `List<...>` prefix
fn strip_type_prefix(s: &str) -> Option<&str> {
    for kw in TYPE_KEYWORDS {
        if let Some(rest) = s.strip_prefix(kw) {
            if !rest.starts_with(is_ident_char) {
                return Some(rest);
            }
        }
    }
    if let Some(rest) = s.strip_prefix("List<") {
        if let Some(pos) = rest.find('>') {
            return Some(&rest[pos + 1..]);
        }
    }
    None
}

fn take_identifier(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map_or(s.len(), |(i, _)| i);
    s.split_at(end)
}

enum DeclLine {
    Valid,
    MissingName,
    IncompleteInit,
    NotADeclaration,
}

/// Shape-check a `<type> [name] [= value];` line. Only lines that both
/// start with a type and end with ';' count as declaration lines; anything
/// else falls through to the later rules.
fn classify_declaration(stripped: &str) -> DeclLine {
    if !stripped.ends_with(';') {
        return DeclLine::NotADeclaration;
    }
    let Some(rest) = strip_type_prefix(stripped) else {
        return DeclLine::NotADeclaration;
    };

    let body = rest[..rest.len() - 1].trim();
    if body.is_empty() || body.starts_with('=') {
        return DeclLine::MissingName;
    }

    let (name, after) = take_identifier(body);
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return DeclLine::NotADeclaration;
    }

    let after = after.trim_start();
    if after.is_empty() {
        return DeclLine::Valid;
    }
    if let Some(value) = after.strip_prefix('=') {
        if value.trim().is_empty() {
            return DeclLine::IncompleteInit;
        }
        return DeclLine::Valid;
    }

    // Something other than '=' after the name, e.g. a method declaration
    DeclLine::NotADeclaration
}

/// `[modifiers] type name(args...)` with both parentheses present
fn is_method_header(stripped: &str) -> bool {
    let rest = strip_modifiers(stripped, &MEMBER_MODIFIERS);
    let (first, rest) = take_identifier(rest);
    if first.is_empty() || !rest.starts_with(char::is_whitespace) {
        return false;
    }
    let (second, rest) = take_identifier(rest.trim_start());
    if second.is_empty() {
        return false;
    }
    let rest = rest.trim_start();
    rest.starts_with('(') && rest.contains(')')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(source: &str) -> Vec<String> {
        check_basic_structure(source)
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    #[test]
    fn test_empty_input_reports_missing_class_only() {
        let msgs = messages("");
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("no class declaration found"));
    }

    #[test]
    fn test_well_formed_program_is_clean() {
        let source = "public class A\n{\n    int x = 5;\n    void M()\n    {\n        Console.WriteLine(x);\n    }\n}\n";
        assert!(messages(source).is_empty(), "{:?}", messages(source));
    }

    #[test]
    fn test_class_header_brace_on_same_line_is_clean() {
        assert!(messages("class A {\n}\n").is_empty());
    }

    #[test]
    fn test_class_missing_brace() {
        let msgs = messages("class A\nint x = 5;\n");
        assert!(msgs.iter().any(|m| m.contains("missing '{' in class declaration")));
    }

    #[test]
    fn test_if_and_else_brace_rules() {
        let source = "class A {\nif (x > 1)\nx = 2;\nelse\nx = 3;\n}\n";
        let msgs = messages(source);
        assert!(msgs.iter().any(|m| m.contains("missing '{' after if")));
        assert!(msgs.iter().any(|m| m.contains("missing '{' after else")));
    }

    #[test]
    fn test_declaration_shape_errors() {
        let msgs = messages("class A {\nint = 4;\nint;\nfloat numero = ;\n}\n");
        assert_eq!(
            msgs.iter().filter(|m| m.contains("without a name")).count(),
            2
        );
        assert!(msgs.iter().any(|m| m.contains("incomplete variable initialization")));
    }

    #[test]
    fn test_missing_semicolon() {
        let msgs = messages("class A {\nx = 5\n}\n");
        assert!(msgs.iter().any(|m| m.contains("missing semicolon")));
    }

    #[test]
    fn test_bare_identifier_statement() {
        let msgs = messages("class A {\nsdfsfsf\n}\n");
        assert!(msgs
            .iter()
            .any(|m| m.contains("invalid or incomplete statement: 'sdfsfsf'")));
    }

    #[test]
    fn test_unmatched_closer_reported_immediately() {
        let msgs = messages("class A {\n}\n}\n");
        assert!(msgs
            .iter()
            .any(|m| m.contains("closing brace '}' without a matching opener")));
    }

    #[test]
    fn test_unclosed_opener_reported_at_end() {
        let msgs = messages("class A {\nvoid M()\n{\n}\n");
        assert_eq!(
            msgs.iter()
                .filter(|m| m.contains("opening brace '{' is never closed"))
                .count(),
            1
        );
    }

    #[test]
    fn test_balanced_brackets_yield_no_bracket_errors() {
        let source = "class A {\nvoid M(int a)\n{\nif (a > 1) {\na = 2;\n}\n}\n}\n";
        let msgs = messages(source);
        assert!(
            !msgs.iter().any(|m| m.contains("brace") || m.contains("parenthesis")),
            "{:?}",
            msgs
        );
    }

    #[test]
    fn test_method_missing_brace() {
        let msgs = messages("class A {\nvoid M()\nint x = 5;\n}\n");
        assert!(msgs.iter().any(|m| m.contains("missing '{' in method declaration")));
    }

    #[test]
    fn test_per_line_findings_are_syntax_stage() {
        let diagnostics = check_basic_structure("class A\nint x = 5;");
        assert!(diagnostics.iter().any(|d| d.stage == Stage::Syntax
            && d.message.contains("missing '{' in class declaration")));
        assert!(!diagnostics.iter().any(|d| d.stage == Stage::Structural));
    }

    #[test]
    fn test_missing_class_is_the_only_structural_finding() {
        let diagnostics = check_basic_structure("x = 5\n");
        let structural: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.stage == Stage::Structural)
            .collect();
        assert_eq!(structural.len(), 1);
        assert!(structural[0].message.contains("no class declaration found"));
        assert!(diagnostics.iter().any(|d| d.stage == Stage::Syntax
            && d.message.contains("missing semicolon")));
    }

    #[test]
    fn test_comment_lines_are_ignored() {
        let msgs = messages("// just a comment\nclass A {\n// another\n}\n");
        assert!(msgs.is_empty(), "{:?}", msgs);
    }
}
