//! Pass 2: build the Global Lookup Table from the logical-line stream.
//!
//! A cursor starts at the implicit `__global__` scope; headers move it,
//! items and symbol declarations insert into the current scope's LLUT.
//! Duplicate scopes (E10) and duplicate keys (E01) are reported and the
//! walk continues, so one run drains every collision.

use crate::ast::{Glut, LineKind, LogicalLine, Scope, Trace, Value, GLOBAL_SCOPE};
use crate::error::{Code, Diagnostics};

pub fn build_glut(lines: Vec<LogicalLine>, root_file: &str, diags: &mut Diagnostics) -> Glut {
    let mut glut = crate::ast::new_glut(root_file);
    let mut current = GLOBAL_SCOPE.to_owned();

    for line in lines {
        let trace = Trace::new(&line.file, line.line, current.clone());
        match line.kind {
            LineKind::Header { name, closures } => {
                if name.is_empty() {
                    // `[]` re-enters the global scope; its closures queue
                    // alongside any from earlier global headers.
                    current = GLOBAL_SCOPE.to_owned();
                    if let Some(scope) = glut.get_mut(GLOBAL_SCOPE) {
                        scope.closures.extend(closures);
                    }
                    continue;
                }
                if glut.contains_key(&name) {
                    diags.report(Code::E10, &trace, &name);
                    current = name;
                    continue;
                }
                let mut scope = Scope::new(&name, Trace::new(&line.file, line.line, &name));
                scope.closures = closures;
                glut.insert(name.clone(), scope);
                current = name;
            }
            LineKind::Item {
                key,
                type_tag,
                eval_marked,
                rhs,
            } => {
                let scope = match glut.get_mut(&current) {
                    Some(s) => s,
                    None => continue,
                };
                if scope.llut.contains_key(&key) {
                    diags.report(Code::E01, &trace, &key);
                    continue;
                }
                let mut value = Value::new(rhs, type_tag, trace);
                value.eval_marked = eval_marked;
                scope.llut.insert(key, value);
            }
            LineKind::SymbolDecl { keys } => {
                let scope = match glut.get_mut(&current) {
                    Some(s) => s,
                    None => continue,
                };
                for key in keys {
                    if scope.llut.contains_key(&key) {
                        diags.report(Code::E01, &trace, &key);
                        continue;
                    }
                    scope.llut.insert(key, Value::placeholder(trace.clone()));
                }
            }
        }
    }
    glut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    fn build(src: &str) -> (Glut, Diagnostics) {
        let mut diags = Diagnostics::new();
        let lines = lexer::lex(src, "test.sini", &mut diags);
        let glut = build_glut(lines, "test.sini", &mut diags);
        (glut, diags)
    }

    #[test]
    fn items_before_any_header_land_in_the_global_scope() {
        let (glut, diags) = build("loose = 1\n[Weapons]\ndamage = 2\n");
        assert!(!diags.has_errors());
        assert!(glut[GLOBAL_SCOPE].llut.contains_key("loose"));
        assert!(glut["Weapons"].llut.contains_key("damage"));
    }

    #[test]
    fn scopes_keep_insertion_order() {
        let (glut, _) = build("[B]\n[A]\n[C]\n");
        let names: Vec<_> = glut.keys().cloned().collect();
        assert_eq!(names, vec![GLOBAL_SCOPE, "B", "A", "C"]);
    }

    #[test]
    fn duplicate_scope_is_e10() {
        let (_, diags) = build("[S]\n[S]\n");
        assert!(diags.iter().any(|d| d.code == Code::E10));
    }

    #[test]
    fn duplicate_key_in_one_scope_is_e01() {
        let (_, diags) = build("[S]\nk = 1\nk = 2\n");
        assert!(diags.iter().any(|d| d.code == Code::E01));
    }

    #[test]
    fn same_key_in_two_scopes_is_fine() {
        let (glut, diags) = build("[A]\nk = 1\n[B]\nk = 2\n");
        assert!(!diags.has_errors());
        assert_eq!(glut["A"].llut["k"].text, "1");
        assert_eq!(glut["B"].llut["k"].text, "2");
    }

    #[test]
    fn global_header_queues_closures_on_the_global_scope() {
        let (glut, diags) = build("[] :: internal, setenv\nsorted = True\n");
        assert!(!diags.has_errors());
        let global = &glut[GLOBAL_SCOPE];
        assert_eq!(global.closures.len(), 2);
        assert!(global.llut.contains_key("sorted"));
    }

    #[test]
    fn symbol_lines_insert_placeholders() {
        let (glut, diags) = build("[W]\n:damage :level\n");
        assert!(!diags.has_errors());
        let scope = &glut["W"];
        assert!(scope.llut["damage"].placeholder);
        assert!(scope.llut["level"].placeholder);
    }

    #[test]
    fn item_trace_names_the_enclosing_scope() {
        let (glut, _) = build("[Melltith]\ndamage = 355\n");
        let v = &glut["Melltith"].llut["damage"];
        assert_eq!(v.trace.scope, "Melltith");
        assert_eq!(v.trace.line, 2);
    }
}
