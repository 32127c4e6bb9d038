//! Single-pass semantic analysis: scope construction, name resolution and
//! the static type rules.

use std::collections::HashMap;

use crate::symbol::{Builtin, Scope, ScopeId, Symbol};
use minipas_syntax::ast::*;
use minipas_syntax::error::{semantic_error, Result};

/// Largest number of elements a single array may declare.
pub const MAX_ARRAY_LEN: u64 = 1 << 20;

/// A procedure or function body, as the interpreter needs it to run a call.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    pub name: String,
    pub params: Vec<Param>,
    /// `None` for procedures.
    pub return_type: Option<Type>,
    pub block: Block,
}

/// Everything the analyzer learned about a program.
#[derive(Debug, Clone)]
pub struct Analysis {
    scopes: Vec<Scope>,
    routines: HashMap<ScopeId, Routine>,
}

impl Default for Analysis {
    /// Only the built-in table; used when evaluating bare expressions.
    fn default() -> Self {
        Self {
            scopes: vec![Scope::builtins()],
            routines: HashMap::new(),
        }
    }
}

impl Analysis {
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn global_scope(&self) -> Option<&Scope> {
        self.scopes.get(ScopeId::GLOBAL.0)
    }

    /// First scope with the given program/procedure/function name.
    pub fn scope_named(&self, name: &str) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// The declaration whose body runs in scope `id`.
    pub fn routine(&self, id: ScopeId) -> Option<&Routine> {
        self.routines.get(&id)
    }

    /// Walk outward from `from` to the first scope declaring `name`.
    pub fn resolve(&self, from: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let scope = self.scope(id);
            if let Some(sym) = scope.lookup_local(name) {
                return Some((id, sym));
            }
            cur = scope.parent;
        }
        None
    }
}

/// Builds scopes for a program and rejects anything that must not run.
pub struct Analyzer {
    analysis: Analysis,
    current: ScopeId,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper around [`Analyzer::analyze`].
pub fn analyze(program: &Program) -> Result<Analysis> {
    Analyzer::new().analyze(program)
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            analysis: Analysis::default(),
            current: ScopeId::BUILTINS,
        }
    }

    pub fn analyze(mut self, program: &Program) -> Result<Analysis> {
        let global = self.push_scope(&program.name, None);
        debug_assert_eq!(global, ScopeId::GLOBAL);
        self.current = global;
        self.visit_block(&program.block)?;
        Ok(self.analysis)
    }

    fn scope(&self) -> &Scope {
        self.analysis.scope(self.current)
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.analysis.scopes[self.current.0]
    }

    fn push_scope(&mut self, name: &str, returns: Option<Type>) -> ScopeId {
        let id = ScopeId(self.analysis.scopes.len());
        let level = self.scope().level + 1;
        let mut scope = Scope::new(id, name, level, Some(self.current));
        scope.returns = returns;
        self.analysis.scopes.push(scope);
        id
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.analysis.resolve(self.current, name).map(|(_, sym)| sym)
    }

    /// Names must be new to the current scope and may never reuse a built-in.
    fn check_fresh(&self, name: &str) -> Result<()> {
        if self.scope().contains(name) || self.analysis.scope(ScopeId::BUILTINS).contains(name) {
            return semantic_error(format!("Duplicate identifier '{}' found", name));
        }
        Ok(())
    }

    fn visit_block(&mut self, block: &Block) -> Result<()> {
        for decl in &block.decls {
            match decl {
                Decl::Var(v) => self.declare_var(v)?,
                Decl::Procedure(p) => self.declare_routine(&p.name, &p.params, None, &p.block)?,
                Decl::Function(f) => {
                    self.declare_routine(&f.name, &f.params, Some(f.return_type), &f.block)?
                }
            }
        }
        for stmt in &block.body {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn declare_var(&mut self, decl: &VarDecl) -> Result<()> {
        self.check_fresh(&decl.name)?;
        let symbol = match &decl.ty {
            TypeSpec::Scalar(ty) => Symbol::Var { name: decl.name.clone(), ty: *ty },
            TypeSpec::Array { elem, lower, upper } => {
                if lower > upper {
                    return semantic_error(format!(
                        "Array '{}' has an empty range [{}..{}]",
                        decl.name, lower, upper
                    ));
                }
                // the difference of two i64 bounds always fits in u64
                let len = upper.abs_diff(*lower).checked_add(1);
                if len.map_or(true, |n| n > MAX_ARRAY_LEN) {
                    return semantic_error(format!(
                        "Array '{}' range [{}..{}] exceeds the limit of {} elements",
                        decl.name, lower, upper, MAX_ARRAY_LEN
                    ));
                }
                Symbol::Array {
                    name: decl.name.clone(),
                    elem: *elem,
                    lower: *lower,
                    upper: *upper,
                }
            }
        };
        self.scope_mut().insert(symbol);
        Ok(())
    }

    fn declare_routine(
        &mut self,
        name: &str,
        params: &[Param],
        return_type: Option<Type>,
        block: &Block,
    ) -> Result<()> {
        self.check_fresh(name)?;
        let child = self.push_scope(name, return_type);
        // registered in the enclosing scope so callers there (and the body) resolve it
        let symbol = match return_type {
            Some(rt) => Symbol::Function {
                name: name.to_string(),
                params: params.to_vec(),
                return_type: rt,
                scope: child,
            },
            None => Symbol::Procedure {
                name: name.to_string(),
                params: params.to_vec(),
                scope: child,
            },
        };
        self.scope_mut().insert(symbol);
        self.analysis.routines.insert(
            child,
            Routine {
                name: name.to_string(),
                params: params.to_vec(),
                return_type,
                block: block.clone(),
            },
        );

        let saved = self.current;
        self.current = child;
        for p in params {
            self.check_fresh(&p.name)?;
            self.scope_mut().insert(Symbol::Var { name: p.name.clone(), ty: p.ty });
        }
        let result = self.visit_block(block);
        self.current = saved;
        result
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Compound(stmts) => {
                for s in stmts {
                    self.check_stmt(s)?;
                }
                Ok(())
            }
            Stmt::Assign { target, expr } => {
                let target_ty = self.target_type(target)?;
                let value_ty = self.type_of(expr)?;
                if !target_ty.accepts(value_ty) {
                    return semantic_error(format!(
                        "Type mismatch: cannot assign {} value to '{}' of type {}",
                        value_ty, target.name, target_ty
                    ));
                }
                Ok(())
            }
            Stmt::Call(call) => self.check_call(call).map(|_| ()),
            Stmt::If { cond, then_branch, else_branch } => {
                self.check_condition(cond)?;
                self.check_stmt(then_branch)?;
                if let Some(e) = else_branch {
                    self.check_stmt(e)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                self.check_condition(cond)?;
                self.check_stmt(body)
            }
            Stmt::Repeat { body, cond } => {
                for s in body {
                    self.check_stmt(s)?;
                }
                self.check_condition(cond)
            }
            Stmt::For { var, start, end, body, .. } => {
                match self.lookup(var) {
                    None => {
                        // undeclared loop counters become integer locals
                        let counter = Symbol::Var { name: var.clone(), ty: Type::Integer };
                        self.scope_mut().insert(counter);
                    }
                    Some(Symbol::Var { ty: Type::Integer, .. }) => {}
                    Some(other) => {
                        return semantic_error(format!(
                            "For-loop variable '{}' must be an integer variable, found {}",
                            var,
                            other.describe()
                        ))
                    }
                }
                for bound in [start, end] {
                    let ty = self.type_of(bound)?;
                    if ty != Type::Integer {
                        return semantic_error(format!(
                            "For-loop bounds must be integer, got {}",
                            ty
                        ));
                    }
                }
                self.check_stmt(body)
            }
            Stmt::NoOp => Ok(()),
        }
    }

    fn check_condition(&self, cond: &Expr) -> Result<()> {
        match self.type_of(cond)? {
            Type::Boolean => Ok(()),
            other => semantic_error(format!("Condition must be boolean, got {}", other)),
        }
    }

    /// Type of an assignment or READ target.
    fn target_type(&self, target: &VarRef) -> Result<Type> {
        if target.index.is_none() && self.scope().is_result_of(&target.name) {
            if let Some(ty) = self.scope().returns {
                return Ok(ty);
            }
        }
        match self.lookup(&target.name) {
            Some(Symbol::Function { name, .. }) => semantic_error(format!(
                "Cannot assign to function '{}' outside its own body",
                name
            )),
            _ => self.var_type(target),
        }
    }

    fn var_type(&self, var: &VarRef) -> Result<Type> {
        let symbol = match self.lookup(&var.name) {
            Some(s) => s,
            None => return semantic_error(format!("Undeclared identifier '{}'", var.name)),
        };
        match (symbol, &var.index) {
            (Symbol::Var { ty, .. }, None) => Ok(*ty),
            (Symbol::Array { elem, .. }, Some(index)) => {
                let index_ty = self.type_of(index)?;
                if index_ty != Type::Integer {
                    return semantic_error(format!(
                        "Array index for '{}' must be integer, got {}",
                        var.name, index_ty
                    ));
                }
                Ok(*elem)
            }
            (Symbol::Array { .. }, None) => {
                semantic_error(format!("Array '{}' must be indexed", var.name))
            }
            (Symbol::Var { .. }, Some(_)) => {
                semantic_error(format!("'{}' is not an array", var.name))
            }
            (other, _) => semantic_error(format!(
                "'{}' is a {}, not a variable",
                var.name,
                other.describe()
            )),
        }
    }

    /// Validate a call; returns the result type for functions.
    fn check_call(&self, call: &Call) -> Result<Option<Type>> {
        let symbol = match self.lookup(&call.name) {
            Some(s) => s,
            None => {
                return semantic_error(format!("Undeclared procedure or function '{}'", call.name))
            }
        };
        let (params, result) = match symbol {
            Symbol::BuiltinProcedure(b) => {
                self.check_builtin_call(*b, call)?;
                return Ok(None);
            }
            Symbol::Procedure { params, .. } => (params, None),
            Symbol::Function { params, return_type, .. } => (params, Some(*return_type)),
            other => {
                return semantic_error(format!(
                    "'{}' is a {}, not a procedure or function",
                    call.name,
                    other.describe()
                ))
            }
        };
        if params.len() != call.args.len() {
            return semantic_error(format!(
                "'{}' expects {} argument(s), got {}",
                call.name,
                params.len(),
                call.args.len()
            ));
        }
        for (param, arg) in params.iter().zip(&call.args) {
            let arg_ty = self.type_of(arg)?;
            if param.ty == Type::Integer && arg_ty == Type::Real {
                return semantic_error(format!(
                    "Cannot pass real value to integer parameter '{}' of '{}'",
                    param.name, call.name
                ));
            }
            if !param.ty.accepts(arg_ty) {
                return semantic_error(format!(
                    "Type mismatch for parameter '{}' of '{}': expected {}, got {}",
                    param.name, call.name, param.ty, arg_ty
                ));
            }
        }
        Ok(result)
    }

    fn check_builtin_call(&self, builtin: Builtin, call: &Call) -> Result<()> {
        match builtin {
            Builtin::Write | Builtin::Writeln => {
                for arg in &call.args {
                    self.type_of(arg)?;
                }
            }
            Builtin::Read => {
                if call.args.is_empty() {
                    return semantic_error("READ expects at least one variable");
                }
                for arg in &call.args {
                    match arg {
                        Expr::Var(target) => {
                            self.target_type(target)?;
                        }
                        _ => return semantic_error("READ arguments must be variables"),
                    }
                }
            }
        }
        Ok(())
    }

    /// Static type of an expression under the promotion rules.
    pub(crate) fn type_of(&self, expr: &Expr) -> Result<Type> {
        match expr {
            Expr::LiteralInt(_) => Ok(Type::Integer),
            Expr::LiteralReal(_) => Ok(Type::Real),
            Expr::LiteralBool(_) => Ok(Type::Boolean),
            Expr::LiteralString(_) => Ok(Type::String),
            Expr::Var(var) => self.var_type(var),
            Expr::Call(call) => match self.check_call(call)? {
                Some(ty) => Ok(ty),
                None => semantic_error(format!("'{}' does not return a value", call.name)),
            },
            Expr::Unary { op, operand } => {
                let ty = self.type_of(operand)?;
                if !ty.is_numeric() {
                    let sym = if *op == UnaryOp::Minus { "-" } else { "+" };
                    return semantic_error(format!(
                        "Unary '{}' requires a numeric operand, got {}",
                        sym, ty
                    ));
                }
                Ok(ty)
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = self.type_of(lhs)?;
                let r = self.type_of(rhs)?;
                binary_type(*op, l, r)
            }
        }
    }
}

fn binary_type(op: BinaryOp, l: Type, r: Type) -> Result<Type> {
    let numeric = l.is_numeric() && r.is_numeric();
    let promoted = if l == Type::Real || r == Type::Real { Type::Real } else { Type::Integer };
    match op {
        BinaryOp::Add if l == Type::String && r == Type::String => Ok(Type::String),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul if numeric => Ok(promoted),
        BinaryOp::Div if numeric => Ok(Type::Real),
        BinaryOp::IntDiv if l == Type::Integer && r == Type::Integer => Ok(Type::Integer),
        BinaryOp::IntDiv => semantic_error(format!(
            "Operator 'div' requires integer operands, got {} and {}",
            l, r
        )),
        BinaryOp::Eq | BinaryOp::Lt | BinaryOp::Gt if numeric || l == r => Ok(Type::Boolean),
        BinaryOp::Eq | BinaryOp::Lt | BinaryOp::Gt => {
            semantic_error(format!("Cannot compare {} with {}", l, r))
        }
        _ => semantic_error(format!(
            "Operator '{}' cannot be applied to {} and {}",
            op.symbol(),
            l,
            r
        )),
    }
}
