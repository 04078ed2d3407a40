//! sini-core: the Super INI compiler as a library.
//!
//! Compiles the richer super-ini source language (scopes with closures,
//! typed values, cross-scope references, expression evaluation, multi-file
//! inclusion) down to plain `[scope]` / `key=value` INI.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root:
//!
//! - [`compile()`] -- run the full pipeline over a root file
//! - [`CompileOutput`] / [`CompileFailure`] -- the two outcomes
//! - [`Diagnostic`], [`Code`], [`Severity`] -- collected diagnostics
//! - [`Environment`] -- the `setenv`-driven compiler environment
//! - [`SourceProvider`] with [`FileSystemProvider`] and
//!   [`InMemoryProvider`] -- file I/O abstraction for `include` and tests
//!
//! Individual pass entry functions are also re-exported for selective
//! pipeline execution.

pub mod ast;
pub mod compile;
pub mod env;
pub mod error;
pub mod lexer;
pub mod pass1_bundle;
pub mod pass2_scopes;
pub mod pass3_closures;
pub mod pass4_resolve;
pub mod pass5_typecheck;
pub mod pass6_emit;
pub mod source;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Glut, LineKind, LogicalLine, Scope, Trace, TypeTag, Value, GLOBAL_SCOPE};
pub use compile::{CompileFailure, CompileOutput, Stats};
pub use env::Environment;
pub use error::{Code, Diagnostic, Diagnostics, Severity};
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use compile::compile;
pub use pass1_bundle::load_bundle;
pub use pass2_scopes::build_glut;
pub use pass3_closures::run_closures;
pub use pass4_resolve::{apply_eval, resolve_references};
pub use pass5_typecheck::check_types;
pub use pass6_emit::emit;
