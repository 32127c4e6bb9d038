//! Value types for the minipas interpreter.

use std::fmt;

use minipas_syntax::ast::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer value
    Int(i64),
    /// A 64-bit floating point value
    Real(f64),
    /// A boolean value
    Bool(bool),
    /// A string value
    Str(String),
    /// The result of a procedure call; never stored in a variable
    None,
}

impl Value {
    /// Initial contents of a freshly allocated slot of type `ty`.
    pub fn default_for(ty: Type) -> Value {
        match ty {
            Type::Integer => Value::Int(0),
            Type::Real => Value::Real(0.0),
            Type::Boolean => Value::Bool(false),
            Type::String => Value::Str(String::new()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Real(_) => "real",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::None => "none",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Real(r) => {
                let text = r.to_string();
                if r.is_finite() && !text.contains('.') {
                    write!(f, "{}.0", text)
                } else {
                    f.write_str(&text)
                }
            }
            Value::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Str(s) => f.write_str(s),
            Value::None => Ok(()),
        }
    }
}
