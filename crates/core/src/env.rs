//! The compiler environment: a per-compilation record updated by `setenv`
//! scopes. Not process-global, so compilations in one process never bleed
//! into each other.

use std::collections::BTreeMap;

/// Recognized keys are typed fields; everything else is preserved in
/// `extra` and ignored by the core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    /// Output path; a CLI-supplied path wins over this.
    pub output: Option<String>,
    /// Sort scopes alphabetically in the emitted output.
    pub sorted: bool,
    pub extra: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    /// Apply one `setenv` pair. Later writes win.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "output" => self.output = Some(value.to_owned()),
            "sorted" => self.sorted = value.trim().eq_ignore_ascii_case("true"),
            _ => {
                self.extra.insert(key.to_owned(), value.to_owned());
            }
        }
    }
}
