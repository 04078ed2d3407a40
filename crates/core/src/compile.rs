//! The compile pipeline: a thin orchestrator that calls each pass in
//! order and stops at the first phase that produced errors, after letting
//! that phase drain everything it could find.

use std::path::Path;

use crate::ast::Glut;
use crate::env::Environment;
use crate::error::{Diagnostic, Diagnostics};
use crate::source::SourceProvider;
use crate::{pass1_bundle, pass2_scopes, pass3_closures, pass4_resolve, pass5_typecheck, pass6_emit};

/// Scope and item counts over the final GLUT, reported by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub scopes: usize,
    pub internal_scopes: usize,
    pub items: usize,
    pub internal_items: usize,
}

impl Stats {
    pub fn emitted_scopes(&self) -> usize {
        self.scopes - self.internal_scopes
    }

    pub fn emitted_items(&self) -> usize {
        self.items - self.internal_items
    }
}

/// A successful compilation: the INI text plus everything the front end
/// needs to finish the job.
#[derive(Debug)]
pub struct CompileOutput {
    pub ini: String,
    pub warnings: Vec<Diagnostic>,
    pub environment: Environment,
    pub stats: Stats,
}

/// A failed compilation: every diagnostic gathered up to and including
/// the phase that failed, warnings included.
#[derive(Debug)]
pub struct CompileFailure {
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the full pipeline over `root` and its includes.
///
/// Errors are collected per phase, never raised: the `Err` side holds the
/// diagnostic list and no output is produced for it.
pub fn compile(
    root: &Path,
    provider: &dyn SourceProvider,
) -> Result<CompileOutput, CompileFailure> {
    let mut diags = Diagnostics::new();

    // Passes 0+1: read, lex, splice includes
    let lines = pass1_bundle::load_bundle(root, provider, &mut diags);
    if diags.has_errors() {
        return Err(fail(diags));
    }

    // Pass 2: scope tables
    let root_label = root.display().to_string();
    let mut glut = pass2_scopes::build_glut(lines, &root_label, &mut diags);
    if diags.has_errors() {
        return Err(fail(diags));
    }

    // Pass 3: closure runtime
    let mut env = Environment::new();
    pass3_closures::run_closures(&mut glut, &mut env, &mut diags);
    if diags.has_errors() {
        return Err(fail(diags));
    }

    // Pass 4: references, then arithmetic over the resolved values
    pass4_resolve::resolve_references(&mut glut, &mut diags);
    pass4_resolve::apply_eval(&mut glut, &mut diags);
    if diags.has_errors() {
        return Err(fail(diags));
    }

    // Pass 5: declared types
    pass5_typecheck::check_types(&glut, &mut diags);
    if diags.has_errors() {
        return Err(fail(diags));
    }

    // Pass 6: canonical INI
    let stats = gather_stats(&glut);
    let ini = pass6_emit::emit(&glut, &env);
    Ok(CompileOutput {
        ini,
        warnings: diags.warnings(),
        environment: env,
        stats,
    })
}

fn fail(diags: Diagnostics) -> CompileFailure {
    CompileFailure {
        diagnostics: diags.into_vec(),
    }
}

fn gather_stats(glut: &Glut) -> Stats {
    let mut stats = Stats::default();
    for scope in glut.values() {
        let item_count = scope.llut.values().filter(|v| !v.placeholder).count();
        stats.scopes += 1;
        stats.items += item_count;
        if scope.internal {
            stats.internal_scopes += 1;
            stats.internal_items += item_count;
        }
    }
    stats
}
