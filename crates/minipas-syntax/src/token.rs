//! Token definitions for the minipas language.
//!
//! Tokens are the smallest meaningful units of source text. The lexer hands
//! them out one at a time; the parser consumes the collected stream strictly
//! in order.
//!
//! # Token Categories
//!
//! - **Literals**: integer, real, boolean and string constants
//! - **Identifiers**: variable, procedure and function names
//! - **Keywords**: reserved words, matched case-insensitively (`BEGIN`, `begin`)
//! - **Operators** and **delimiters**: `+ - * / := = < > : , ; . .. ( ) [ ]`
//! - **Apostrophe**: the quote that opens and closes a string constant
//! - **Special**: the end-of-input marker
//!
//! # Examples
//!
//! ```rust
//! use minipas_syntax::{Token, TokenKind};
//!
//! let number = Token { kind: TokenKind::IntegerConst(42), line: 2, col: 9 };
//! assert_eq!(number.kind.to_string(), "integer 42");
//! assert_eq!(TokenKind::Assign.to_string(), "':='");
//! ```

use std::fmt;

/// Token types produced by the minipas lexer.
///
/// String constants arrive as three tokens: an [`Apostrophe`](TokenKind::Apostrophe),
/// the [`StringConst`](TokenKind::StringConst) content, and a closing
/// [`Apostrophe`](TokenKind::Apostrophe). The empty string `''` has no content token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// Integer constant such as `42`
    IntegerConst(i64),

    /// Real constant such as `3.14`
    RealConst(f64),

    /// Boolean constant, from the `true` / `false` keywords
    BoolConst(bool),

    /// Content of a single-quoted string, without the quotes
    StringConst(String),

    /// Identifier as written in the source (lookups fold case later)
    Ident(String),

    // === Keywords ===
    Program,
    Var,
    Procedure,
    Function,
    Begin,
    End,
    If,
    Then,
    Else,
    Repeat,
    Until,
    While,
    Do,
    For,
    To,
    Downto,
    Div,
    Array,
    Of,

    // === Type names ===
    Integer,
    Real,
    Boolean,
    String,

    // === Operators ===
    /// Addition `+`
    Plus,

    /// Subtraction or negation `-`
    Minus,

    /// Multiplication `*`
    Star,

    /// Real division `/`
    Slash,

    /// Assignment `:=`
    Assign,

    /// Equality comparison `=`
    Equal,

    /// Less-than comparison `<`
    Less,

    /// Greater-than comparison `>`
    Greater,

    // === Delimiters ===
    Colon,
    Comma,
    Semi,
    Dot,

    /// Range marker `..` in array bounds
    DotDot,

    LParen,
    RParen,
    LBracket,
    RBracket,

    /// Opening or closing `'` of a string constant
    Apostrophe,

    /// End-of-input marker, returned repeatedly once the source is exhausted
    Eof,
}

impl TokenKind {
    /// Looks up a reserved word, ignoring case.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word.to_ascii_lowercase().as_str() {
            "program" => TokenKind::Program,
            "var" => TokenKind::Var,
            "procedure" => TokenKind::Procedure,
            "function" => TokenKind::Function,
            "begin" => TokenKind::Begin,
            "end" => TokenKind::End,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "repeat" => TokenKind::Repeat,
            "until" => TokenKind::Until,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "for" => TokenKind::For,
            "to" => TokenKind::To,
            "downto" => TokenKind::Downto,
            "div" => TokenKind::Div,
            "array" => TokenKind::Array,
            "of" => TokenKind::Of,
            "integer" => TokenKind::Integer,
            "real" => TokenKind::Real,
            "boolean" => TokenKind::Boolean,
            "string" => TokenKind::String,
            "true" => TokenKind::BoolConst(true),
            "false" => TokenKind::BoolConst(false),
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::IntegerConst(n) => return write!(f, "integer {}", n),
            TokenKind::RealConst(r) => return write!(f, "real {}", r),
            TokenKind::BoolConst(b) => return write!(f, "boolean {}", b),
            TokenKind::StringConst(s) => return write!(f, "string '{}'", s),
            TokenKind::Ident(name) => return write!(f, "identifier '{}'", name),
            TokenKind::Eof => return write!(f, "end of input"),
            TokenKind::Program => "program",
            TokenKind::Var => "var",
            TokenKind::Procedure => "procedure",
            TokenKind::Function => "function",
            TokenKind::Begin => "begin",
            TokenKind::End => "end",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::Repeat => "repeat",
            TokenKind::Until => "until",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::For => "for",
            TokenKind::To => "to",
            TokenKind::Downto => "downto",
            TokenKind::Div => "div",
            TokenKind::Array => "array",
            TokenKind::Of => "of",
            TokenKind::Integer => "integer",
            TokenKind::Real => "real",
            TokenKind::Boolean => "boolean",
            TokenKind::String => "string",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Assign => ":=",
            TokenKind::Equal => "=",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Apostrophe => "'",
        };
        write!(f, "'{}'", text)
    }
}

/// A token with its source location.
///
/// `line` and `col` are 1-based and point at the first character of the token,
/// which is what lexer and parser diagnostics report.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type and semantic content of this token
    pub kind: TokenKind,

    /// Line number in the source file (1-based)
    pub line: usize,

    /// Column number in the source file (1-based)
    pub col: usize,
}
