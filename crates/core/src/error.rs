use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ast::Trace;

/// Diagnostic severity. Errors abort compilation at the end of the phase
/// that raised them; warnings never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Stable diagnostic codes. E00..E09 match the original compiler's table;
/// E10..E12 cover invariant violations the original silently tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Code {
    E00,
    E01,
    E02,
    E03,
    E04,
    E05,
    E06,
    E07,
    E08,
    E09,
    E10,
    E11,
    E12,
    W00,
    W01,
    W02,
    W03,
}

impl Code {
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::E00 => "E00",
            Code::E01 => "E01",
            Code::E02 => "E02",
            Code::E03 => "E03",
            Code::E04 => "E04",
            Code::E05 => "E05",
            Code::E06 => "E06",
            Code::E07 => "E07",
            Code::E08 => "E08",
            Code::E09 => "E09",
            Code::E10 => "E10",
            Code::E11 => "E11",
            Code::E12 => "E12",
            Code::W00 => "W00",
            Code::W01 => "W01",
            Code::W02 => "W02",
            Code::W03 => "W03",
        }
    }

    /// The base sentence for this code; call sites append specifics.
    pub fn describe(&self) -> &'static str {
        match self {
            Code::E00 => "undefined sequence",
            Code::E01 => "key is already classified in scope:",
            Code::E02 => "key contains illegal character:",
            Code::E03 => "scope id contains illegal character:",
            Code::E04 => "undefined closure:",
            Code::E05 => "not a symbol:",
            Code::E06 => "must classify key from abstract scope:",
            Code::E07 => "incorrect type, expected",
            Code::E08 => "missing input file",
            Code::E09 => "missing output file",
            Code::E10 => "scope is already defined:",
            Code::E11 => "include is only valid on the global scope",
            Code::E12 => "could not look up scope in closure argument:",
            Code::W00 => "could not look up scope reference",
            Code::W01 => "could not look up key reference",
            Code::W02 => "multiple assignments in one statement",
            Code::W03 => "empty abstract scope declaration",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Code::W00 | Code::W01 | Code::W02 | Code::W03 => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A compiler diagnostic. Carries the source trace of the line or value
/// that raised it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Code,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub scope: String,
}

impl Diagnostic {
    pub fn new(code: Code, trace: &Trace, extra: impl AsRef<str>) -> Self {
        let extra = extra.as_ref();
        let message = if extra.is_empty() {
            code.describe().to_owned()
        } else {
            format!("{} {}", code.describe(), extra)
        };
        Diagnostic {
            severity: code.severity(),
            code,
            message,
            file: trace.file.clone(),
            line: trace.line,
            scope: trace.scope.clone(),
        }
    }

    /// Build a diagnostic whose message replaces the code's base sentence
    /// entirely (used where one code covers several failure shapes, e.g.
    /// E07 for both type mismatches and evaluation errors).
    pub fn with_message(code: Code, trace: &Trace, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: code.severity(),
            code,
            message: message.into(),
            file: trace.file.clone(),
            line: trace.line,
            scope: trace.scope.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Serialize to a JSON object with a fixed key set, for tooling that
    /// consumes diagnostics instead of the rendered text.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "severity": match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            },
            "code":    self.code.as_str(),
            "message": self.message,
            "file":    self.file,
            "line":    self.line,
            "scope":   self.scope,
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        writeln!(f, "{}[{}]: {}", label, self.code.as_str(), self.message)?;
        write!(f, "  --> {}:{} [{}]", self.file, self.line, self.scope)
    }
}

/// Ordered collection of diagnostics gathered across the pipeline.
///
/// Passes push into this instead of returning at the first problem, so a
/// single run surfaces as many diagnostics from a phase as practical.
#[derive(Debug, Default)]
pub struct Diagnostics {
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.list.push(diag);
    }

    pub fn report(&mut self, code: Code, trace: &Trace, extra: impl AsRef<str>) {
        self.push(Diagnostic::new(code, trace, extra));
    }

    pub fn has_errors(&self) -> bool {
        self.list.iter().any(Diagnostic::is_error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.list
            .iter()
            .filter(|d| !d.is_error())
            .cloned()
            .collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.list
    }
}
