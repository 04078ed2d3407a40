//! Pass 3: the closure runtime.
//!
//! Runs once the GLUT is complete, so forward references from child to
//! parent scopes work. Within one header, closures run left to right;
//! across scopes, in GLUT insertion order. Every closure mutates its
//! caller in place; `eval` only flags the scope here, the rewrite itself
//! is pass 4b's job.

use crate::ast::{ClosureCall, ClosureKind, Glut, Trace, Value};
use crate::env::Environment;
use crate::error::{Code, Diagnostics};

pub fn run_closures(glut: &mut Glut, env: &mut Environment, diags: &mut Diagnostics) {
    let names: Vec<String> = glut.keys().cloned().collect();
    for name in names {
        let calls = match glut.get_mut(&name) {
            Some(scope) => std::mem::take(&mut scope.closures),
            None => continue,
        };
        for call in calls {
            apply(call, &name, glut, env, diags);
        }
    }
}

fn apply(
    call: ClosureCall,
    caller_name: &str,
    glut: &mut Glut,
    env: &mut Environment,
    diags: &mut Diagnostics,
) {
    let trace = match glut.get(caller_name) {
        Some(scope) => Trace::new(&scope.trace.file, call.line, caller_name),
        None => return,
    };

    match call.kind {
        ClosureKind::Internal => {
            if let Some(scope) = glut.get_mut(caller_name) {
                scope.internal = true;
            }
        }
        ClosureKind::SetEnv => {
            if let Some(scope) = glut.get_mut(caller_name) {
                scope.internal = true;
                let pairs: Vec<(String, String)> = scope
                    .llut
                    .iter()
                    .filter(|(_, v)| !v.placeholder)
                    .map(|(k, v)| (k.clone(), v.text.clone()))
                    .collect();
                for (k, v) in pairs {
                    env.set(&k, &v);
                }
            }
        }
        ClosureKind::Include => {
            // Global-header includes were consumed during pass 1; one
            // surviving here sat on a named scope.
            diags.report(Code::E11, &trace, "");
        }
        ClosureKind::Abstract => {
            if call.args.is_empty() {
                diags.report(Code::W03, &trace, "");
            }
            if let Some(scope) = glut.get_mut(caller_name) {
                scope.abstract_keys = Some(call.args);
            }
        }
        ClosureKind::As => {
            let _ = gather_abstract_values(caller_name, &call.args, glut, &trace, diags);
        }
        ClosureKind::Inline => {
            let gathered = gather_abstract_values(caller_name, &call.args, glut, &trace, diags);
            if let Some(scope) = glut.get_mut(caller_name) {
                scope.internal = true;
            }
            if let Some(values) = gathered {
                let joined = values.join(" ");
                let parent_name = call.args[0].clone();
                let item_trace = Trace::new(&trace.file, call.line, &parent_name);
                if let Some(parent) = glut.get_mut(&parent_name) {
                    parent
                        .llut
                        .insert(caller_name.to_owned(), Value::new(joined, None, item_trace));
                }
            }
        }
        ClosureKind::Eval => {
            if let Some(scope) = glut.get_mut(caller_name) {
                scope.eval_scope = true;
            }
        }
    }
}

/// Shared coverage check for `as` and `inline`: every key the parent
/// declared abstract must exist in the caller's LLUT. Returns the
/// caller's values in the parent's declared order, or `None` when the
/// parent is missing (E12) or any key is unclassified (E06, one per
/// miss).
fn gather_abstract_values(
    caller_name: &str,
    args: &[String],
    glut: &Glut,
    trace: &Trace,
    diags: &mut Diagnostics,
) -> Option<Vec<String>> {
    let parent_name = match args.first() {
        Some(p) => p,
        None => {
            diags.report(Code::E05, trace, "(no scope argument given)");
            return None;
        }
    };
    let parent = match glut.get(parent_name) {
        Some(p) => p,
        None => {
            diags.report(Code::E12, trace, parent_name);
            return None;
        }
    };
    let keys = parent.abstract_keys.clone().unwrap_or_default();
    let caller = glut.get(caller_name)?;

    let mut values = Vec::new();
    let mut complete = true;
    for key in &keys {
        match caller.llut.get(key) {
            Some(v) => values.push(v.text.clone()),
            None => {
                diags.report(Code::E06, trace, key);
                complete = false;
            }
        }
    }
    complete.then_some(values)
}
