//! minipas semantic analysis: builds one scope per program, procedure and
//! function, resolves every identifier, and rejects illegal programs before
//! they run.

pub mod analyzer;
pub mod symbol;

pub use analyzer::{analyze, Analysis, Analyzer, Routine, MAX_ARRAY_LEN};
pub use symbol::{Builtin, Scope, ScopeId, Symbol};
