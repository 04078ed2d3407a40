//! Pass 1: read, lex, and splice `include`d files into one logical-line
//! stream.
//!
//! `include` is the one closure consumed during the build phase: an
//! invocation on a global (`[]`) header makes the reader recursively lex
//! each named file and splice its lines at the include point, depth-first.
//! A visited set elides repeated includes of the same canonical path; an
//! include already on the load stack is a cycle and fails E08.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::ast::{ClosureKind, LineKind, LogicalLine, Trace, GLOBAL_SCOPE};
use crate::error::{Code, Diagnostics};
use crate::lexer;
use crate::source::SourceProvider;

/// Lex the root file and every transitively included file into a single
/// ordered stream. I/O problems surface as E08 diagnostics; the returned
/// stream holds whatever could still be read.
pub fn load_bundle(
    root: &Path,
    provider: &dyn SourceProvider,
    diags: &mut Diagnostics,
) -> Vec<LogicalLine> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut stack: HashSet<PathBuf> = HashSet::new();
    let mut out: Vec<LogicalLine> = Vec::new();

    let site = Trace::new(root.display().to_string(), 0, GLOBAL_SCOPE);
    load_file(
        root,
        &site,
        provider,
        &mut visited,
        &mut stack,
        &mut out,
        diags,
    );
    out
}

#[allow(clippy::too_many_arguments)]
fn load_file(
    path: &Path,
    site: &Trace,
    provider: &dyn SourceProvider,
    visited: &mut HashSet<PathBuf>,
    stack: &mut HashSet<PathBuf>,
    out: &mut Vec<LogicalLine>,
    diags: &mut Diagnostics,
) {
    let canon = match provider.canonicalize(path) {
        Ok(c) => c,
        Err(_) => {
            diags.report(Code::E08, site, path.display().to_string());
            return;
        }
    };

    if stack.contains(&canon) {
        diags.report(
            Code::E08,
            site,
            format!("include cycle detected: {}", path.display()),
        );
        return;
    }
    if visited.contains(&canon) {
        // Already spliced once; elide the repeat.
        return;
    }

    let src = match provider.read_source(path) {
        Ok(s) => s,
        Err(_) => {
            diags.report(Code::E08, site, path.display().to_string());
            return;
        }
    };

    let file_label = path.display().to_string();
    let lines = lexer::lex(&src, &file_label, diags);

    stack.insert(canon.clone());
    visited.insert(canon.clone());
    let base_dir = canon.parent().unwrap_or(Path::new(".")).to_owned();

    for line in lines {
        match line.kind {
            LineKind::Header { ref name, ref closures } if name.is_empty() => {
                let (includes, rest): (Vec<_>, Vec<_>) = closures
                    .iter()
                    .cloned()
                    .partition(|c| c.kind == ClosureKind::Include);
                out.push(LogicalLine {
                    file: line.file.clone(),
                    line: line.line,
                    kind: LineKind::Header {
                        name: name.clone(),
                        closures: rest,
                    },
                });
                for call in includes {
                    let include_site = Trace::new(&line.file, call.line, GLOBAL_SCOPE);
                    for arg in &call.args {
                        let resolved = provider.resolve_include(&base_dir, arg);
                        load_file(
                            &resolved,
                            &include_site,
                            provider,
                            visited,
                            stack,
                            out,
                            diags,
                        );
                    }
                }
            }
            _ => out.push(line),
        }
    }

    stack.remove(&canon);
}
