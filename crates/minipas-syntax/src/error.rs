//! Error handling types shared by every stage of the minipas pipeline.
//!
//! Every stage stops at the first fault it detects and hands a single [`Error`]
//! back to its caller. Nothing in the library crates prints or exits; turning an
//! error into a diagnostic is the job of the command-line front end.
//!
//! # Error classes
//!
//! - **Lexical** and **Syntax** errors come from the lexer and parser and always
//!   carry the line and column of the offending token.
//! - **Semantic** errors come from the analyzer (undeclared or duplicate names,
//!   arity and type mismatches) and reject a program before it runs.
//! - **Runtime** errors come from the interpreter (bad `READ` input, array
//!   indices out of bounds, division by zero).
//!
//! # Examples
//!
//! ```rust
//! use minipas_syntax::error::{Error, ErrorKind, Result, semantic_error};
//!
//! fn lookup(name: &str) -> Result<i64> {
//!     if name == "x" {
//!         Ok(1)
//!     } else {
//!         semantic_error(format!("Undeclared identifier '{}'", name))
//!     }
//! }
//!
//! let err = lookup("y").unwrap_err();
//! assert_eq!(err.kind, ErrorKind::Semantic);
//!
//! let located = Error::syntax("Expected ';', found 'end'", 3, 7);
//! assert_eq!(located.to_string(), "Expected ';', found 'end' at 3:7");
//! ```

use std::fmt;

/// The pipeline stage class an [`Error`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input characters, strings or comments.
    Lexical,
    /// Grammar violations found by the parser.
    Syntax,
    /// Static faults found by the analyzer before execution.
    Semantic,
    /// Faults that can only be observed while the program runs.
    Runtime,
}

impl ErrorKind {
    /// Short label used when rendering diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "Lex error",
            ErrorKind::Syntax => "Syntax error",
            ErrorKind::Semantic => "Semantic error",
            ErrorKind::Runtime => "Runtime error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An error raised while lexing, parsing, analyzing or running a program.
///
/// # Fields
///
/// - `kind`: which stage class detected the fault
/// - `msg`: human-readable description
/// - `line`: optional 1-based line number in the source
/// - `col`: optional 1-based column number in the source
///
/// Only lexical and syntax errors are located; the AST does not carry
/// positions, so semantic and runtime errors name the offending identifier
/// or operand types instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// Stage class of the error
    pub kind: ErrorKind,

    /// Human-readable error message
    pub msg: String,

    /// Optional line number in source file (1-based)
    pub line: Option<usize>,

    /// Optional column number in source file (1-based)
    pub col: Option<usize>,
}

impl Error {
    /// Creates an error of the given kind without location information.
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            line: None,
            col: None,
        }
    }

    /// Creates an error of the given kind at a 1-based line and column.
    pub fn with_span(kind: ErrorKind, msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            msg: msg.into(),
            line: Some(line),
            col: Some(col),
        }
    }

    pub fn lexical(msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self::with_span(ErrorKind::Lexical, msg, line, col)
    }

    pub fn syntax(msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self::with_span(ErrorKind::Syntax, msg, line, col)
    }

    pub fn semantic(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantic, msg)
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(l), Some(c)) = (self.line, self.col) {
            write!(f, "{} at {}:{}", self.msg, l, c)
        } else {
            write!(f, "{}", self.msg)
        }
    }
}

impl std::error::Error for Error {}

/// A specialized `Result` type for minipas operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for `Err(Error::with_span(kind, msg, line, col))`.
///
/// ```rust
/// use minipas_syntax::error::{error_at, ErrorKind, Result};
///
/// fn reject(line: usize, col: usize) -> Result<()> {
///     error_at(ErrorKind::Lexical, line, col, "Unexpected character '&' at offset 4")
/// }
///
/// assert_eq!(reject(1, 5).unwrap_err().col, Some(5));
/// ```
pub fn error_at<T>(kind: ErrorKind, line: usize, col: usize, msg: impl Into<String>) -> Result<T> {
    Err(Error::with_span(kind, msg, line, col))
}

/// Shorthand for `Err(Error::semantic(msg))`.
pub fn semantic_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::semantic(msg))
}

/// Shorthand for `Err(Error::runtime(msg))`.
pub fn runtime_error<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::runtime(msg))
}
