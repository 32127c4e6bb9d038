//! Symbols and scopes produced by the analyzer.

use std::collections::HashMap;

use minipas_syntax::ast::{Param, Type};

/// Index of a scope in the analyzer's scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub usize);

impl ScopeId {
    /// The shared table of built-in types and I/O procedures.
    pub const BUILTINS: ScopeId = ScopeId(0);
    /// The program's own scope.
    pub const GLOBAL: ScopeId = ScopeId(1);
}

/// The I/O procedures supplied by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Write,
    Writeln,
    Read,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::Write, Builtin::Writeln, Builtin::Read];

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|b| b.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Write => "WRITE",
            Builtin::Writeln => "WRITELN",
            Builtin::Read => "READ",
        }
    }
}

/// A named declaration visible in some scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    BuiltinType(Type),
    BuiltinProcedure(Builtin),
    Var {
        name: String,
        ty: Type,
    },
    /// Array with inclusive bounds `lower..=upper`.
    Array {
        name: String,
        elem: Type,
        lower: i64,
        upper: i64,
    },
    /// `scope` is the procedure's own body scope.
    Procedure {
        name: String,
        params: Vec<Param>,
        scope: ScopeId,
    },
    Function {
        name: String,
        params: Vec<Param>,
        return_type: Type,
        scope: ScopeId,
    },
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::BuiltinType(ty) => ty.name(),
            Symbol::BuiltinProcedure(b) => b.name(),
            Symbol::Var { name, .. }
            | Symbol::Array { name, .. }
            | Symbol::Procedure { name, .. }
            | Symbol::Function { name, .. } => name.as_str(),
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Symbol::BuiltinType(_) => "type",
            Symbol::BuiltinProcedure(_) => "built-in procedure",
            Symbol::Var { .. } => "variable",
            Symbol::Array { .. } => "array",
            Symbol::Procedure { .. } => "procedure",
            Symbol::Function { .. } => "function",
        }
    }
}

/// Identifiers are case-insensitive; every key goes through here.
pub(crate) fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// The symbols declared directly in one program, procedure or function body.
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    /// Program, procedure or function name (or `builtins`).
    pub name: String,
    /// Nesting depth: 0 for the built-in table, 1 for the program.
    pub level: usize,
    /// Lexically enclosing scope.
    pub parent: Option<ScopeId>,
    /// Result type when this scope is a function body.
    pub returns: Option<Type>,
    symbols: HashMap<String, Symbol>,
}

impl Scope {
    pub(crate) fn new(
        id: ScopeId,
        name: impl Into<String>,
        level: usize,
        parent: Option<ScopeId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            parent,
            returns: None,
            symbols: HashMap::new(),
        }
    }

    pub(crate) fn builtins() -> Self {
        let mut scope = Scope::new(ScopeId::BUILTINS, "builtins", 0, None);
        for ty in [Type::Integer, Type::Real, Type::Boolean, Type::String] {
            scope.insert(Symbol::BuiltinType(ty));
        }
        for b in Builtin::ALL {
            scope.insert(Symbol::BuiltinProcedure(b));
        }
        scope
    }

    pub(crate) fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(key(symbol.name()), symbol);
    }

    /// Look up a name declared directly in this scope.
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(&key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(&key(name))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Whether assigning to `name` here sets this function's result.
    pub fn is_result_of(&self, name: &str) -> bool {
        self.returns.is_some() && self.name.eq_ignore_ascii_case(name) && !self.contains(name)
    }
}
