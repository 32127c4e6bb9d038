//! AST (abstract syntax tree) types for the minipas language.
//!
//! Every node owns its children, so a parsed program is a plain tree. All node
//! types derive `PartialEq`, which lets tests compare a parse result against a
//! hand-built tree.

use std::fmt;

/// Scalar types a variable, parameter, array element or function result can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Real,
    Boolean,
    String,
}

impl Type {
    /// Whether a value of type `from` may be stored into a slot of type `self`.
    ///
    /// Integers widen to real; nothing else converts implicitly.
    pub fn accepts(self, from: Type) -> bool {
        self == from || (self == Type::Real && from == Type::Integer)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Integer | Type::Real)
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Integer => "integer",
            Type::Real => "real",
            Type::Boolean => "boolean",
            Type::String => "string",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a variable: a scalar or a one-dimensional array with
/// inclusive bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    Scalar(Type),
    Array { elem: Type, lower: i64, upper: i64 },
}

/// Binary operators. Comparisons only appear inside conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Integer division `div`
    IntDiv,
    /// Real division `/`
    Div,
    Eq,
    Lt,
    Gt,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Lt | BinaryOp::Gt)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::IntDiv => "div",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// A reference to a variable, optionally indexed when it names an array.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub index: Option<Box<Expr>>,
}

impl VarRef {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self { name: name.into(), index: None }
    }

    pub fn indexed(name: impl Into<String>, index: Expr) -> Self {
        Self { name: name.into(), index: Some(Box::new(index)) }
    }
}

/// A procedure or function call, also used for the built-in I/O procedures.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
}

/// Expressions (literals, variable references, operations, calls).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    LiteralInt(i64),
    LiteralReal(f64),
    LiteralBool(bool),
    LiteralString(String),
    Var(VarRef),
    Call(Call),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary { op, operand: Box::new(operand) }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(VarRef::scalar(name))
    }
}

/// Statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Compound(Vec<Stmt>),
    Assign {
        target: VarRef,
        expr: Expr,
    },
    Call(Call),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    /// `repeat body until cond`; the body always runs at least once
    Repeat {
        body: Vec<Stmt>,
        cond: Expr,
    },
    For {
        var: String,
        start: Expr,
        end: Expr,
        descending: bool,
        body: Box<Stmt>,
    },
    NoOp,
}

/// Formal parameter of a procedure or function.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: TypeSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub block: Block,
}

/// Declarations in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Var(VarDecl),
    Procedure(ProcedureDecl),
    Function(FunctionDecl),
}

/// Declarations followed by the compound statement they scope over.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub decls: Vec<Decl>,
    pub body: Vec<Stmt>,
}

/// Root of the tree: `program Name; block .`
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub block: Block,
}
