//! Pass 4a: reference resolution; Pass 4b: arithmetic evaluation.
//!
//! Resolution substitutes `scope::key` words with the target's current
//! text in a single pass over the GLUT, in scope-insertion order.
//! Evaluation then rewrites the items of `eval` scopes through the
//! bounded evaluator, so expressions see resolved numbers, never raw
//! references.

use crate::ast::{Glut, Trace};
use crate::error::{Code, Diagnostic, Diagnostics};

// ──────────────────────────────────────────────────────────────────────
// Pass 4a: substitute scope::key references
// ──────────────────────────────────────────────────────────────────────

/// Walk every surviving item and replace each `scope::key` word with the
/// target's current text. Unresolved references warn (W00 for a missing
/// scope, W01 for a missing key) and stay verbatim. A fully quoted value
/// is never scanned.
pub fn resolve_references(glut: &mut Glut, diags: &mut Diagnostics) {
    let scope_names: Vec<String> = glut.keys().cloned().collect();
    for sname in &scope_names {
        let keys: Vec<String> = match glut.get(sname) {
            Some(s) => s.llut.keys().cloned().collect(),
            None => continue,
        };
        for key in keys {
            let (text, trace) = match glut.get(sname).and_then(|s| s.llut.get(&key)) {
                Some(v) if !v.placeholder => (v.text.clone(), v.trace.clone()),
                _ => continue,
            };
            if !text.contains("::") || is_quoted(&text) {
                continue;
            }
            let resolved = resolve_text(&text, glut, &trace, diags);
            if let Some(v) = glut.get_mut(sname).and_then(|s| s.llut.get_mut(&key)) {
                v.text = resolved;
            }
        }
    }
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

fn resolve_text(text: &str, glut: &Glut, trace: &Trace, diags: &mut Diagnostics) -> String {
    let mut words: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        match word.split_once("::") {
            Some((scope_name, key)) if !scope_name.is_empty() && !key.is_empty() => {
                match glut.get(scope_name) {
                    None => {
                        // Could be a string literal that happens to
                        // contain the operator, so warn rather than fail.
                        diags.report(Code::W00, trace, scope_name);
                        words.push(word.to_owned());
                    }
                    Some(scope) => match scope.llut.get(key) {
                        None => {
                            diags.report(Code::W01, trace, key);
                            words.push(word.to_owned());
                        }
                        Some(v) => words.push(v.text.clone()),
                    },
                }
            }
            _ => words.push(word.to_owned()),
        }
    }
    words.join(" ")
}

// ──────────────────────────────────────────────────────────────────────
// Pass 4b: evaluate the items of eval scopes
// ──────────────────────────────────────────────────────────────────────

/// Rewrite every item of each `eval`-flagged scope with its evaluated
/// result. Plain `=` items whose text is not an expression stay literal;
/// a `:=` item asserts its rhs is an expression, so the literal fallback
/// does not apply to it. Arithmetic failures are E07.
pub fn apply_eval(glut: &mut Glut, diags: &mut Diagnostics) {
    for scope in glut.values_mut() {
        if !scope.eval_scope {
            continue;
        }
        for value in scope.llut.values_mut() {
            if value.placeholder {
                continue;
            }
            match sini_eval::eval_expr(&value.text) {
                Ok(n) => value.text = n.to_string(),
                Err(sini_eval::EvalError::NotAnExpression) if !value.eval_marked => {}
                Err(e) => diags.push(Diagnostic::with_message(
                    Code::E07,
                    &value.trace,
                    format!("evaluation error: {}", e),
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::lexer;
    use crate::pass2_scopes;
    use crate::pass3_closures;

    fn run(src: &str) -> (Glut, Diagnostics) {
        let mut diags = Diagnostics::new();
        let lines = lexer::lex(src, "test.sini", &mut diags);
        let mut glut = pass2_scopes::build_glut(lines, "test.sini", &mut diags);
        let mut env = Environment::new();
        pass3_closures::run_closures(&mut glut, &mut env, &mut diags);
        resolve_references(&mut glut, &mut diags);
        apply_eval(&mut glut, &mut diags);
        (glut, diags)
    }

    #[test]
    fn substitutes_a_cross_scope_reference() {
        let (glut, diags) = run(
            "[Constants] :: internal\nmax_level: u8 = 46\n\
             [Tir Tochair Blade]\nkey = Constants::max_level\n",
        );
        assert!(!diags.has_errors());
        assert_eq!(glut["Tir Tochair Blade"].llut["key"].text, "46");
    }

    #[test]
    fn reference_interpolated_in_a_longer_value() {
        let (glut, diags) = run(
            "[c] :: internal\npi = 3.14\n[out]\nnote = approx c::pi rad\n",
        );
        assert!(!diags.has_errors());
        assert_eq!(glut["out"].llut["note"].text, "approx 3.14 rad");
    }

    #[test]
    fn missing_scope_warns_w00_and_keeps_the_text() {
        let (glut, diags) = run("[out]\nkey = Nowhere::thing\n");
        assert!(diags.iter().any(|d| d.code == Code::W00));
        assert!(!diags.has_errors());
        assert_eq!(glut["out"].llut["key"].text, "Nowhere::thing");
    }

    #[test]
    fn missing_key_warns_w01_and_keeps_the_text() {
        let (glut, diags) = run("[c]\nx = 1\n[out]\nkey = c::y\n");
        assert!(diags.iter().any(|d| d.code == Code::W01));
        assert_eq!(glut["out"].llut["key"].text, "c::y");
    }

    #[test]
    fn quoted_values_are_never_scanned() {
        let (glut, diags) = run("[out]\nkey = \"keep Nowhere::thing intact\"\n");
        assert!(diags.iter().next().is_none());
        assert_eq!(
            glut["out"].llut["key"].text,
            "\"keep Nowhere::thing intact\""
        );
    }

    #[test]
    fn eval_scope_computes_arithmetic() {
        let (glut, diags) = run("[constants] :: eval\nmax_u8 = 2**8 - 1\n");
        assert!(!diags.has_errors());
        assert_eq!(glut["constants"].llut["max_u8"].text, "255");
    }

    #[test]
    fn eval_over_a_resolved_reference() {
        let (glut, diags) = run(
            "[base] :: internal\nunit = 25\n\
             [derived] :: eval\ndamage = base::unit * 11\n",
        );
        assert!(!diags.has_errors());
        assert_eq!(glut["derived"].llut["damage"].text, "275");
    }

    #[test]
    fn eval_leaves_non_expressions_alone() {
        let (glut, diags) = run("[constants] :: eval\nname = iron blade\n");
        assert!(!diags.has_errors());
        assert_eq!(glut["constants"].llut["name"].text, "iron blade");
    }

    #[test]
    fn eval_division_by_zero_is_e07() {
        let (_, diags) = run("[constants] :: eval\nbad = 1 / 0\n");
        assert!(diags
            .iter()
            .any(|d| d.code == Code::E07 && d.message.contains("division by zero")));
    }

    #[test]
    fn walrus_outside_an_eval_scope_stays_literal() {
        let (glut, diags) = run("[plain]\nx := 1 + 1\n");
        assert!(!diags.has_errors());
        assert_eq!(glut["plain"].llut["x"].text, "1 + 1");
    }

    #[test]
    fn walrus_in_an_eval_scope_evaluates() {
        let (glut, diags) = run("[constants] :: eval\nx := 2 + 3\n");
        assert!(!diags.has_errors());
        assert_eq!(glut["constants"].llut["x"].text, "5");
    }

    #[test]
    fn walrus_item_gets_no_literal_fallback() {
        let (_, diags) = run("[constants] :: eval\nx := iron blade\n");
        assert!(diags
            .iter()
            .any(|d| d.code == Code::E07 && d.message.contains("not an arithmetic expression")));
    }

    #[test]
    fn eval_is_idempotent_over_the_glut() {
        let (mut glut, _) = run("[constants] :: eval\nmax_u8 = 2**8 - 1\n");
        let before = glut["constants"].llut["max_u8"].text.clone();
        let mut diags = Diagnostics::new();
        apply_eval(&mut glut, &mut diags);
        assert_eq!(glut["constants"].llut["max_u8"].text, before);
    }
}
