//! Line-oriented lexer: continuation folding and logical-line
//! classification.
//!
//! A logical line starts at column zero; any indented line folds into the
//! open logical line with a single joining space, provided its indent is
//! strictly deeper than the opener's column. Blank lines and `;` comments
//! are skipped and never break a fold.

use crate::ast::{
    ClosureCall, ClosureKind, LineKind, LogicalLine, Trace, TypeTag, GLOBAL_SCOPE,
    ILLEGAL_NAME_CHARS,
};
use crate::error::{Code, Diagnostics};

/// Lex one file into classified logical lines. Problems are reported into
/// `diags`; lines that fail to classify are dropped so later phases can
/// keep draining diagnostics.
pub fn lex(src: &str, file: &str, diags: &mut Diagnostics) -> Vec<LogicalLine> {
    let folded = fold(src, file, diags);

    let mut out = Vec::new();
    // Best-effort scope tracking so lexer diagnostics name the region
    // they occurred in.
    let mut scope = GLOBAL_SCOPE.to_owned();

    for (line, text) in folded {
        let trace = Trace::new(file, line, scope.clone());
        if let Some(kind) = classify(&text, &trace, diags) {
            if let LineKind::Header { name, .. } = &kind {
                scope = if name.is_empty() {
                    GLOBAL_SCOPE.to_owned()
                } else {
                    name.clone()
                };
            }
            out.push(LogicalLine {
                file: file.to_owned(),
                line,
                kind,
            });
        }
    }
    out
}

// ──────────────────────────────────────────────
// Continuation folding
// ──────────────────────────────────────────────

struct Pending {
    line: u32,
    text: String,
    /// Indent column of the opener; continuations must sit strictly
    /// deeper.
    anchor: usize,
}

fn fold(src: &str, file: &str, diags: &mut Diagnostics) -> Vec<(u32, String)> {
    let mut out: Vec<(u32, String)> = Vec::new();
    let mut pending: Option<Pending> = None;

    for (idx, raw) in src.lines().enumerate() {
        let line_no = (idx + 1) as u32;
        let raw = raw.trim_end_matches('\r');
        let content = raw.trim();

        if content.is_empty() || content.starts_with(';') {
            continue;
        }

        let indent = raw.chars().take_while(|c| c.is_whitespace()).count();
        if indent == 0 {
            if let Some(p) = pending.take() {
                out.push((p.line, p.text));
            }
            pending = Some(Pending {
                line: line_no,
                text: content.to_owned(),
                anchor: 0,
            });
            continue;
        }

        match pending.as_mut() {
            Some(p) if indent > p.anchor => {
                p.text.push(' ');
                p.text.push_str(content);
            }
            _ => {
                let trace = Trace::new(file, line_no, GLOBAL_SCOPE);
                diags.report(Code::E00, &trace, content);
            }
        }
    }
    if let Some(p) = pending.take() {
        out.push((p.line, p.text));
    }
    out
}

// ──────────────────────────────────────────────
// Classification
// ──────────────────────────────────────────────

fn classify(text: &str, trace: &Trace, diags: &mut Diagnostics) -> Option<LineKind> {
    if text.starts_with('[') {
        return classify_header(text, trace, diags);
    }
    if text.contains('=') {
        return classify_item(text, trace, diags);
    }
    if text.starts_with(':') {
        return classify_symbols(text, trace, diags);
    }
    diags.report(Code::E00, trace, text);
    None
}

fn classify_header(text: &str, trace: &Trace, diags: &mut Diagnostics) -> Option<LineKind> {
    let close = match text.find(']') {
        Some(i) => i,
        None => {
            diags.report(Code::E00, trace, text);
            return None;
        }
    };
    let name = text[1..close].trim();
    if name.contains(ILLEGAL_NAME_CHARS) {
        diags.report(Code::E03, trace, name);
        return None;
    }

    let rest = text[close + 1..].trim();
    let closures = if rest.is_empty() {
        Vec::new()
    } else if let Some(list) = rest.strip_prefix("::") {
        if list.contains("::") {
            diags.report(Code::E00, trace, rest);
            return None;
        }
        parse_closure_list(list, trace, diags)
    } else {
        diags.report(Code::E00, trace, rest);
        return None;
    };

    Some(LineKind::Header {
        name: name.to_owned(),
        closures,
    })
}

/// Parse the comma-separated closure list of a header. Bad invocations
/// are reported and skipped so the rest of the header still lands.
fn parse_closure_list(list: &str, trace: &Trace, diags: &mut Diagnostics) -> Vec<ClosureCall> {
    let mut calls = Vec::new();
    for part in list.split(',') {
        let mut tokens = part.split_whitespace();
        let name = tokens.next().unwrap_or("");
        let kind = match ClosureKind::from_name(name) {
            Some(k) => k,
            None => {
                diags.report(Code::E04, trace, name);
                continue;
            }
        };
        let mut args = Vec::new();
        let mut bad = false;
        for tok in tokens {
            match tok.strip_prefix(':') {
                Some(sym) if !sym.is_empty() => args.push(sym.to_owned()),
                _ => {
                    diags.report(Code::E05, trace, tok);
                    bad = true;
                }
            }
        }
        if !bad {
            calls.push(ClosureCall {
                kind,
                args,
                line: trace.line,
            });
        }
    }
    calls
}

fn classify_item(text: &str, trace: &Trace, diags: &mut Diagnostics) -> Option<LineKind> {
    let segments: Vec<&str> = text.split('=').collect();
    if segments.len() > 2 {
        // key = x = y -- only the last value is kept
        diags.report(Code::W02, trace, "");
    }
    let key_part = segments[0].trim();
    let rhs = segments.last().map(|s| s.trim()).unwrap_or("");

    let (key, type_tag, eval_marked) = match key_part.split_once(':') {
        Some((k, t)) => {
            if t.contains(':') {
                diags.report(Code::E00, trace, key_part);
                return None;
            }
            let t = t.trim();
            if t.is_empty() {
                // `key := rhs` -- the eval-assignment marker
                (k.trim(), None, true)
            } else {
                match TypeTag::from_name(t) {
                    Some(tag) => (k.trim(), Some(tag), false),
                    None => {
                        diags.report(Code::E00, trace, t);
                        return None;
                    }
                }
            }
        }
        None => (key_part, None, false),
    };

    if key.is_empty() || key.contains(ILLEGAL_NAME_CHARS) {
        diags.report(Code::E02, trace, key);
        return None;
    }

    Some(LineKind::Item {
        key: key.to_owned(),
        type_tag,
        eval_marked,
        rhs: rhs.to_owned(),
    })
}

fn classify_symbols(text: &str, trace: &Trace, diags: &mut Diagnostics) -> Option<LineKind> {
    let mut keys = Vec::new();
    for tok in text.split_whitespace() {
        match tok.strip_prefix(':') {
            Some(sym) if !sym.is_empty() && !sym.contains(ILLEGAL_NAME_CHARS) => {
                keys.push(sym.to_owned());
            }
            _ => diags.report(Code::E05, trace, tok),
        }
    }
    if keys.is_empty() {
        return None;
    }
    Some(LineKind::SymbolDecl { keys })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_ok(src: &str) -> Vec<LogicalLine> {
        let mut diags = Diagnostics::new();
        let lines = lex(src, "test.sini", &mut diags);
        assert!(!diags.has_errors(), "unexpected errors: {:?}", diags);
        lines
    }

    #[test]
    fn folds_indented_continuations_with_single_space() {
        let lines = lex_ok("key =\n  first\n  second\n");
        assert_eq!(lines.len(), 1);
        match &lines[0].kind {
            LineKind::Item { key, rhs, .. } => {
                assert_eq!(key, "key");
                assert_eq!(rhs, "first second");
            }
            other => panic!("expected item, got {:?}", other),
        }
    }

    #[test]
    fn continuation_keeps_opener_line_number() {
        let lines = lex_ok("; banner\nkey =\n    tail\n");
        assert_eq!(lines[0].line, 2);
    }

    #[test]
    fn stray_indent_without_opener_is_e00() {
        let mut diags = Diagnostics::new();
        let lines = lex("  floating\n", "test.sini", &mut diags);
        assert!(lines.is_empty());
        assert!(diags.has_errors());
        assert_eq!(diags.iter().next().map(|d| d.code), Some(Code::E00));
    }

    #[test]
    fn comments_and_blanks_do_not_break_a_fold() {
        let lines = lex_ok("key =\n  a\n; note\n\n  b\n");
        match &lines[0].kind {
            LineKind::Item { rhs, .. } => assert_eq!(rhs, "a b"),
            other => panic!("expected item, got {:?}", other),
        }
    }

    #[test]
    fn header_with_closure_invocations() {
        let lines = lex_ok("[Eirlithrad] :: inline :Weapons\n");
        match &lines[0].kind {
            LineKind::Header { name, closures } => {
                assert_eq!(name, "Eirlithrad");
                assert_eq!(closures.len(), 1);
                assert_eq!(closures[0].kind, ClosureKind::Inline);
                assert_eq!(closures[0].args, vec!["Weapons".to_owned()]);
            }
            other => panic!("expected header, got {:?}", other),
        }
    }

    #[test]
    fn multiple_closures_parse_in_header_order() {
        let lines = lex_ok("[] :: internal, setenv\n");
        match &lines[0].kind {
            LineKind::Header { name, closures } => {
                assert!(name.is_empty());
                let kinds: Vec<_> = closures.iter().map(|c| c.kind).collect();
                assert_eq!(kinds, vec![ClosureKind::Internal, ClosureKind::SetEnv]);
            }
            other => panic!("expected header, got {:?}", other),
        }
    }

    #[test]
    fn unknown_closure_is_e04() {
        let mut diags = Diagnostics::new();
        lex("[s] :: frobnicate\n", "test.sini", &mut diags);
        assert_eq!(diags.iter().next().map(|d| d.code), Some(Code::E04));
    }

    #[test]
    fn bare_closure_argument_is_e05() {
        let mut diags = Diagnostics::new();
        lex("[s] :: as Weapons\n", "test.sini", &mut diags);
        assert_eq!(diags.iter().next().map(|d| d.code), Some(Code::E05));
    }

    #[test]
    fn double_closure_operator_is_e00() {
        let mut diags = Diagnostics::new();
        lex("[s] :: internal :: eval\n", "test.sini", &mut diags);
        assert_eq!(diags.iter().next().map(|d| d.code), Some(Code::E00));
    }

    #[test]
    fn typed_item_accepts_both_spellings() {
        for src in ["damage: i32 = 355\n", "damage :i32 = 355\n"] {
            let lines = lex_ok(src);
            match &lines[0].kind {
                LineKind::Item { key, type_tag, rhs, .. } => {
                    assert_eq!(key, "damage");
                    assert_eq!(*type_tag, Some(TypeTag::I32));
                    assert_eq!(rhs, "355");
                }
                other => panic!("expected item, got {:?}", other),
            }
        }
    }

    #[test]
    fn walrus_marks_eval_assignment() {
        let lines = lex_ok("max_u8 := 2**8 - 1\n");
        match &lines[0].kind {
            LineKind::Item {
                key,
                eval_marked,
                type_tag,
                rhs,
            } => {
                assert_eq!(key, "max_u8");
                assert!(*eval_marked);
                assert!(type_tag.is_none());
                assert_eq!(rhs, "2**8 - 1");
            }
            other => panic!("expected item, got {:?}", other),
        }
    }

    #[test]
    fn unknown_type_tag_is_e00() {
        let mut diags = Diagnostics::new();
        lex("damage: i33 = 5\n", "test.sini", &mut diags);
        assert_eq!(diags.iter().next().map(|d| d.code), Some(Code::E00));
    }

    #[test]
    fn double_assignment_warns_and_keeps_last_value() {
        let mut diags = Diagnostics::new();
        let lines = lex("key = x = y\n", "test.sini", &mut diags);
        assert!(!diags.has_errors());
        assert_eq!(diags.iter().next().map(|d| d.code), Some(Code::W02));
        match &lines[0].kind {
            LineKind::Item { rhs, .. } => assert_eq!(rhs, "y"),
            other => panic!("expected item, got {:?}", other),
        }
    }

    #[test]
    fn symbol_line_declares_each_symbol() {
        let lines = lex_ok(":damage :level\n");
        match &lines[0].kind {
            LineKind::SymbolDecl { keys } => {
                assert_eq!(keys, &["damage".to_owned(), "level".to_owned()]);
            }
            other => panic!("expected symbols, got {:?}", other),
        }
    }

    #[test]
    fn semicolon_inside_a_value_is_literal() {
        let lines = lex_ok("note = keep; this\n");
        match &lines[0].kind {
            LineKind::Item { rhs, .. } => assert_eq!(rhs, "keep; this"),
            other => panic!("expected item, got {:?}", other),
        }
    }

    #[test]
    fn illegal_scope_name_is_e03() {
        let mut diags = Diagnostics::new();
        lex("[bad,name]\n", "test.sini", &mut diags);
        assert_eq!(diags.iter().next().map(|d| d.code), Some(Code::E03));
    }
}
