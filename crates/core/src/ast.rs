//! Shared data model for the Super INI compiler.
//!
//! These types are produced by the lexer and scope builder and consumed
//! throughout the later passes. They live here so that pass modules can
//! import them without depending on each other.

use indexmap::IndexMap;

/// Name of the implicit scope that collects items appearing before any
/// header. The empty header `[]` addresses it.
pub const GLOBAL_SCOPE: &str = "__global__";

/// Characters that may not appear in a key or scope name.
pub const ILLEGAL_NAME_CHARS: &[char] = &['=', ',', ':', '\\'];

// ──────────────────────────────────────────────
// Trace
// ──────────────────────────────────────────────

/// Where a parsed object came from: file, line, and enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub file: String,
    pub line: u32,
    pub scope: String,
}

impl Trace {
    pub fn new(file: impl Into<String>, line: u32, scope: impl Into<String>) -> Self {
        Trace {
            file: file.into(),
            line,
            scope: scope.into(),
        }
    }
}

// ──────────────────────────────────────────────
// Type tags
// ──────────────────────────────────────────────

/// A declared value type. Only declared tags are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Int,
    I8,
    I16,
    I32,
    I64,
    U8,
    Float,
    F32,
    F64,
    Str,
    Bool,
}

impl TypeTag {
    /// Parse a tag as written after the key's colon. Unknown tags are the
    /// caller's E00.
    pub fn from_name(name: &str) -> Option<TypeTag> {
        match name {
            "int" => Some(TypeTag::Int),
            "i8" => Some(TypeTag::I8),
            "i16" => Some(TypeTag::I16),
            "i32" => Some(TypeTag::I32),
            "i64" => Some(TypeTag::I64),
            "u8" => Some(TypeTag::U8),
            "float" => Some(TypeTag::Float),
            "f32" => Some(TypeTag::F32),
            "f64" => Some(TypeTag::F64),
            "str" => Some(TypeTag::Str),
            "bool" => Some(TypeTag::Bool),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::I8 => "i8",
            TypeTag::I16 => "i16",
            TypeTag::I32 => "i32",
            TypeTag::I64 => "i64",
            TypeTag::U8 => "u8",
            TypeTag::Float => "float",
            TypeTag::F32 => "f32",
            TypeTag::F64 => "f64",
            TypeTag::Str => "str",
            TypeTag::Bool => "bool",
        }
    }
}

// ──────────────────────────────────────────────
// Values and scopes
// ──────────────────────────────────────────────

/// The right-hand side of an item, as written (after continuation folding)
/// and later rewritten by the eval and resolution passes.
#[derive(Debug, Clone)]
pub struct Value {
    pub text: String,
    /// Declared type tag; `None` for untyped items.
    pub type_tag: Option<TypeTag>,
    /// True for `key := rhs` assignments. Inside an `eval` scope such an
    /// item must evaluate; plain `=` items may fall back to literal text.
    pub eval_marked: bool,
    /// True for bare `:symbol` declarations; placeholders are never emitted.
    pub placeholder: bool,
    pub trace: Trace,
}

impl Value {
    pub fn new(text: impl Into<String>, type_tag: Option<TypeTag>, trace: Trace) -> Self {
        Value {
            text: text.into(),
            type_tag,
            eval_marked: false,
            placeholder: false,
            trace,
        }
    }

    pub fn placeholder(trace: Trace) -> Self {
        Value {
            text: String::new(),
            type_tag: None,
            eval_marked: false,
            placeholder: true,
            trace,
        }
    }
}

/// The closures the compiler knows. An unknown name on a header is E04.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureKind {
    Internal,
    SetEnv,
    Include,
    Abstract,
    As,
    Inline,
    Eval,
}

impl ClosureKind {
    pub fn from_name(name: &str) -> Option<ClosureKind> {
        match name {
            "internal" => Some(ClosureKind::Internal),
            "setenv" => Some(ClosureKind::SetEnv),
            "include" => Some(ClosureKind::Include),
            "abstract" => Some(ClosureKind::Abstract),
            "as" => Some(ClosureKind::As),
            "inline" => Some(ClosureKind::Inline),
            "eval" => Some(ClosureKind::Eval),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClosureKind::Internal => "internal",
            ClosureKind::SetEnv => "setenv",
            ClosureKind::Include => "include",
            ClosureKind::Abstract => "abstract",
            ClosureKind::As => "as",
            ClosureKind::Inline => "inline",
            ClosureKind::Eval => "eval",
        }
    }
}

/// One closure invocation from a scope header, with its symbol arguments
/// in written order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureCall {
    pub kind: ClosureKind,
    pub args: Vec<String>,
    pub line: u32,
}

/// A named container of items. `llut` is the scope's Local Lookup Table:
/// keys are unique and insertion-ordered.
#[derive(Debug, Clone)]
pub struct Scope {
    pub name: String,
    pub llut: IndexMap<String, Value>,
    /// Closure calls pending for the runtime phase, in header order.
    pub closures: Vec<ClosureCall>,
    pub internal: bool,
    /// Required key names, in declared order, once `abstract` has run.
    pub abstract_keys: Option<Vec<String>>,
    /// Set by the `eval` closure; evaluation itself happens in pass 4b.
    pub eval_scope: bool,
    pub trace: Trace,
}

impl Scope {
    pub fn new(name: impl Into<String>, trace: Trace) -> Self {
        Scope {
            name: name.into(),
            llut: IndexMap::new(),
            closures: Vec::new(),
            internal: false,
            abstract_keys: None,
            eval_scope: false,
            trace,
        }
    }
}

/// The Global Lookup Table: scope name to scope, insertion-ordered. The
/// implicit global scope is always present and first.
pub type Glut = IndexMap<String, Scope>;

/// Create a GLUT holding only the implicit global scope.
pub fn new_glut(file: &str) -> Glut {
    let mut glut = Glut::new();
    glut.insert(
        GLOBAL_SCOPE.to_owned(),
        Scope::new(GLOBAL_SCOPE, Trace::new(file, 0, GLOBAL_SCOPE)),
    );
    glut
}

// ──────────────────────────────────────────────
// Lexed lines
// ──────────────────────────────────────────────

/// A classified logical line, after continuation folding. Blank and
/// comment lines never reach this representation.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Header {
        /// Empty for the `[]` global header.
        name: String,
        closures: Vec<ClosureCall>,
    },
    Item {
        key: String,
        type_tag: Option<TypeTag>,
        eval_marked: bool,
        rhs: String,
    },
    /// Bare `:symbol` declarations; one entry per symbol on the line.
    SymbolDecl { keys: Vec<String> },
}

/// A logical line with its origin. `line` is the physical line of the
/// opener; continuations keep the opener's number.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalLine {
    pub file: String,
    pub line: u32,
    pub kind: LineKind,
}
