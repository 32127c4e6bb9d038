//! Activation records for the minipas interpreter.

use std::collections::HashMap;

use crate::value::Value;
use minipas_semantic::{Scope, ScopeId, Symbol};
use minipas_syntax::ast::Type;
use minipas_syntax::error::{runtime_error, Result};

/// Element storage for one array variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayStorage {
    pub elem: Type,
    pub lower: i64,
    pub upper: i64,
    items: Vec<Value>,
}

impl ArrayStorage {
    fn new(elem: Type, lower: i64, upper: i64) -> Self {
        // bounds are validated by the analyzer; widen so a bad pair cannot overflow
        let len = (i128::from(upper) - i128::from(lower) + 1).max(0) as usize;
        Self {
            elem,
            lower,
            upper,
            items: vec![Value::default_for(elem); len],
        }
    }

    fn offset(&self, index: i64) -> Result<usize> {
        if index < self.lower || index > self.upper {
            return runtime_error(format!(
                "Array index {} out of bounds [{}..{}]",
                index, self.lower, self.upper
            ));
        }
        Ok((index - self.lower) as usize)
    }

    pub fn get(&self, index: i64) -> Result<&Value> {
        let at = self.offset(index)?;
        Ok(&self.items[at])
    }

    pub fn set(&mut self, index: i64, value: Value) -> Result<()> {
        let at = self.offset(index)?;
        self.items[at] = value;
        Ok(())
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

/// Storage for one in-progress program, procedure or function invocation.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Scope describing this frame's contents
    pub scope: ScopeId,
    /// Stack index of the lexically enclosing frame (not the caller)
    pub static_link: Option<usize>,
    vars: HashMap<String, Value>,
    arrays: HashMap<String, ArrayStorage>,
    result: Option<Value>,
}

impl Frame {
    /// Allocate default-initialized storage for every variable and array of `scope`.
    pub fn new(scope: &Scope, static_link: Option<usize>) -> Self {
        let mut vars = HashMap::new();
        let mut arrays = HashMap::new();
        for symbol in scope.symbols() {
            match symbol {
                Symbol::Var { name, ty } => {
                    vars.insert(name.to_ascii_lowercase(), Value::default_for(*ty));
                }
                Symbol::Array { name, elem, lower, upper } => {
                    let storage = ArrayStorage::new(*elem, *lower, *upper);
                    arrays.insert(name.to_ascii_lowercase(), storage);
                }
                _ => {}
            }
        }
        Self {
            scope: scope.id,
            static_link,
            vars,
            arrays,
            result: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(&name.to_ascii_lowercase())
    }

    pub(crate) fn set(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_ascii_lowercase(), value);
    }

    pub fn array(&self, name: &str) -> Option<&ArrayStorage> {
        self.arrays.get(&name.to_ascii_lowercase())
    }

    pub(crate) fn array_mut(&mut self, name: &str) -> Option<&mut ArrayStorage> {
        self.arrays.get_mut(&name.to_ascii_lowercase())
    }

    pub(crate) fn set_result(&mut self, value: Value) {
        self.result = Some(value);
    }

    pub(crate) fn take_result(&mut self) -> Option<Value> {
        self.result.take()
    }

    /// Scalar variables sorted by (lowercased) name.
    pub fn vars_snapshot(&self) -> Vec<(String, Value)> {
        let mut vars: Vec<(String, Value)> =
            self.vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars
    }
}
