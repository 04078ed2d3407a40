//! Pass 6: serialize the surviving scopes to canonical INI.
//!
//! Internal scopes and placeholder declarations never appear. Scope order
//! is GLUT insertion order, or alphabetical when the environment says
//! `sorted`; item order within a scope is always insertion order.

use crate::ast::{Glut, Scope, GLOBAL_SCOPE};
use crate::env::Environment;

pub fn emit(glut: &Glut, env: &Environment) -> String {
    let mut scopes: Vec<&Scope> = glut.values().collect();
    if env.sorted {
        scopes.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let mut out = String::new();
    for scope in scopes {
        if scope.internal {
            continue;
        }
        let items: Vec<_> = scope
            .llut
            .iter()
            .filter(|(_, v)| !v.placeholder)
            .collect();
        // The implicit scope only appears when something actually
        // landed in it.
        if scope.name == GLOBAL_SCOPE && items.is_empty() {
            continue;
        }
        out.push('[');
        out.push_str(&scope.name);
        out.push_str("]\n");
        for (key, value) in items {
            out.push_str(key);
            out.push('=');
            out.push_str(&value.text);
            out.push('\n');
        }
    }
    out
}
