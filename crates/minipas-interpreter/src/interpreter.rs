//! Main interpreter engine and built-in I/O procedures.

use std::cmp::Ordering;
use std::thread;

use crate::console::{Console, StdConsole};
use crate::frame::Frame;
use crate::value::Value;
use minipas_semantic::{Analysis, Builtin, Scope, Symbol};
use minipas_syntax::ast::*;
use minipas_syntax::error::{runtime_error, Error, Result};

/// Nested calls beyond this depth fail instead of exhausting the native stack.
pub const MAX_CALL_DEPTH: usize = 256;

/// Native stack of the thread a program runs on. Unoptimized builds spend
/// tens of KiB of native stack per nested call inside deep expressions.
pub const RUN_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct ExecStats {
    /// Statements executed, including nested ones
    pub statements_executed: usize,
    /// Procedure and function calls, built-ins excluded
    pub calls_made: usize,
    /// Deepest frame stack seen
    pub max_depth: usize,
}

/// Operands of an arithmetic operator after promotion.
enum Numeric {
    Ints(i64, i64),
    Reals(f64, f64),
}

fn numeric_pair(l: &Value, r: &Value) -> Option<Numeric> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(Numeric::Ints(*a, *b)),
        (Value::Int(a), Value::Real(b)) => Some(Numeric::Reals(*a as f64, *b)),
        (Value::Real(a), Value::Int(b)) => Some(Numeric::Reals(*a, *b as f64)),
        (Value::Real(a), Value::Real(b)) => Some(Numeric::Reals(*a, *b)),
        _ => None,
    }
}

/// Convert a value for storage into a slot of type `ty`, widening integers to real.
fn coerce(value: Value, ty: Type) -> Result<Value> {
    match (value, ty) {
        (Value::Int(n), Type::Real) => Ok(Value::Real(n as f64)),
        (v @ Value::Int(_), Type::Integer)
        | (v @ Value::Real(_), Type::Real)
        | (v @ Value::Bool(_), Type::Boolean)
        | (v @ Value::Str(_), Type::String) => Ok(v),
        (v, ty) => runtime_error(format!(
            "Type mismatch: cannot store {} value in {} slot",
            v.type_name(),
            ty
        )),
    }
}

fn as_bool(value: Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => runtime_error(format!("Condition must be boolean, got {}", other.type_name())),
    }
}

fn as_index(value: Value) -> Result<i64> {
    match value {
        Value::Int(n) => Ok(n),
        other => runtime_error(format!("Array index must be integer, got {}", other.type_name())),
    }
}

fn parse_input(token: &str, ty: Type) -> Result<Value> {
    let parsed = match ty {
        Type::Integer => token.parse::<i64>().ok().map(Value::Int),
        Type::Real => token.parse::<f64>().ok().map(Value::Real),
        Type::Boolean if token.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
        Type::Boolean if token.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
        Type::Boolean => None,
        Type::String => Some(Value::Str(token.to_string())),
    };
    parsed.ok_or_else(|| Error::runtime(format!("READ: cannot convert '{}' to {}", token, ty)))
}

pub struct Interpreter<C: Console = StdConsole> {
    console: C,
    /// Live activation records; index 0 is the program's frame
    frames: Vec<Frame>,
    /// The program's frame after the last run, kept for inspection
    globals: Option<Frame>,
    stats: ExecStats,
}

impl Default for Interpreter<StdConsole> {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter<StdConsole> {
    pub fn new() -> Self {
        Self::with_console(StdConsole)
    }
}

impl<C: Console> Interpreter<C> {
    pub fn with_console(console: C) -> Self {
        Self {
            console,
            frames: Vec::new(),
            globals: None,
            stats: ExecStats::default(),
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn stats(&self) -> ExecStats {
        self.stats.clone()
    }

    /// Final value of a global scalar after the last run.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.as_ref()?.get(name).cloned()
    }

    /// Final contents of a global array after the last run.
    pub fn global_array(&self, name: &str) -> Option<Vec<Value>> {
        self.globals.as_ref()?.array(name).map(|a| a.items().to_vec())
    }

    pub fn globals_snapshot(&self) -> Vec<(String, Value)> {
        self.globals.as_ref().map(Frame::vars_snapshot).unwrap_or_default()
    }

    /// Run an analyzed program to completion.
    ///
    /// The program runs on a dedicated thread with a [`RUN_STACK_SIZE`] stack,
    /// so recursion up to [`MAX_CALL_DEPTH`] fits no matter which thread calls this.
    pub fn interpret(&mut self, program: &Program, analysis: &Analysis) -> Result<()>
    where
        C: Send,
    {
        let global = analysis
            .global_scope()
            .ok_or_else(|| Error::runtime("Program has not been analyzed"))?;
        self.frames.clear();
        self.globals = None;
        self.stats = ExecStats::default();

        let outcome = thread::scope(|s| -> Result<()> {
            let runner = thread::Builder::new()
                .name("minipas-run".to_string())
                .stack_size(RUN_STACK_SIZE)
                .spawn_scoped(s, || self.run_program(global, program, analysis))
                .map_err(|e| Error::runtime(format!("Failed to start interpreter thread: {}", e)))?;
            runner.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        });

        self.frames.truncate(1);
        self.globals = self.frames.pop();
        outcome
    }

    fn run_program(&mut self, global: &Scope, program: &Program, cx: &Analysis) -> Result<()> {
        self.push_frame(Frame::new(global, None))?;
        self.exec_block(cx, &program.block)
    }

    /// Evaluate a bare expression outside any program.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        let cx = Analysis::default();
        self.eval_expr(&cx, expr)
    }

    fn push_frame(&mut self, frame: Frame) -> Result<()> {
        if self.frames.len() >= MAX_CALL_DEPTH {
            return runtime_error(format!(
                "Call stack overflow: more than {} nested calls",
                MAX_CALL_DEPTH
            ));
        }
        self.frames.push(frame);
        self.stats.max_depth = self.stats.max_depth.max(self.frames.len());
        Ok(())
    }

    /// Walk the static chain from the innermost frame to the first frame
    /// whose scope declares `name`.
    fn locate(&self, cx: &Analysis, name: &str) -> Option<usize> {
        let mut cur = self.frames.len().checked_sub(1);
        while let Some(i) = cur {
            let frame = &self.frames[i];
            if cx.scope(frame.scope).contains(name) {
                return Some(i);
            }
            cur = frame.static_link;
        }
        None
    }

    fn exec_block(&mut self, cx: &Analysis, block: &Block) -> Result<()> {
        for s in &block.body {
            self.exec_stmt(cx, s)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, cx: &Analysis, stmt: &Stmt) -> Result<()> {
        self.stats.statements_executed += 1;
        match stmt {
            Stmt::Compound(stmts) => {
                for s in stmts {
                    self.exec_stmt(cx, s)?;
                }
                Ok(())
            }
            Stmt::Assign { target, expr } => {
                let v = self.eval_expr(cx, expr)?;
                self.assign(cx, target, v)
            }
            Stmt::Call(call) => self.call(cx, call).map(|_| ()),
            Stmt::If { cond, then_branch, else_branch } => {
                if as_bool(self.eval_expr(cx, cond)?)? {
                    self.exec_stmt(cx, then_branch)
                } else if let Some(e) = else_branch {
                    self.exec_stmt(cx, e)
                } else {
                    Ok(())
                }
            }
            Stmt::While { cond, body } => {
                while as_bool(self.eval_expr(cx, cond)?)? {
                    self.exec_stmt(cx, body)?;
                }
                Ok(())
            }
            Stmt::Repeat { body, cond } => loop {
                for s in body {
                    self.exec_stmt(cx, s)?;
                }
                if as_bool(self.eval_expr(cx, cond)?)? {
                    return Ok(());
                }
            },
            Stmt::For { var, start, end, descending, body } => {
                let s = self.eval_expr(cx, start)?;
                let e = self.eval_expr(cx, end)?;
                let (s, e) = match (s, e) {
                    (Value::Int(a), Value::Int(b)) => (a, b),
                    (a, b) => {
                        return runtime_error(format!(
                            "For-loop bounds must be integer, got {} and {}",
                            a.type_name(),
                            b.type_name()
                        ))
                    }
                };
                let counter = VarRef::scalar(var.clone());
                let steps: Box<dyn Iterator<Item = i64>> =
                    if *descending { Box::new((e..=s).rev()) } else { Box::new(s..=e) };
                for i in steps {
                    self.assign(cx, &counter, Value::Int(i))?;
                    self.exec_stmt(cx, body)?;
                }
                Ok(())
            }
            Stmt::NoOp => Ok(()),
        }
    }

    fn assign(&mut self, cx: &Analysis, target: &VarRef, value: Value) -> Result<()> {
        let index = match &target.index {
            Some(e) => Some(as_index(self.eval_expr(cx, e)?)?),
            None => None,
        };
        if index.is_none() {
            if let Some(top) = self.frames.last_mut() {
                let scope = cx.scope(top.scope);
                if let (true, Some(ty)) = (scope.is_result_of(&target.name), scope.returns) {
                    top.set_result(coerce(value, ty)?);
                    return Ok(());
                }
            }
        }
        let at = self
            .locate(cx, &target.name)
            .ok_or_else(|| Error::runtime(format!("Undefined variable '{}'", target.name)))?;
        let frame = &mut self.frames[at];
        match (cx.scope(frame.scope).lookup_local(&target.name), index) {
            (Some(Symbol::Var { ty, .. }), None) => {
                frame.set(&target.name, coerce(value, *ty)?);
                Ok(())
            }
            (Some(Symbol::Array { elem, .. }), Some(i)) => {
                let v = coerce(value, *elem)?;
                match frame.array_mut(&target.name) {
                    Some(storage) => storage.set(i, v),
                    None => runtime_error(format!("Array '{}' has no storage", target.name)),
                }
            }
            _ => runtime_error(format!("Cannot assign to '{}'", target.name)),
        }
    }

    fn eval_var(&mut self, cx: &Analysis, var: &VarRef) -> Result<Value> {
        let index = match &var.index {
            Some(e) => Some(as_index(self.eval_expr(cx, e)?)?),
            None => None,
        };
        let at = self
            .locate(cx, &var.name)
            .ok_or_else(|| Error::runtime(format!("Undefined variable '{}'", var.name)))?;
        let frame = &self.frames[at];
        match (cx.scope(frame.scope).lookup_local(&var.name), index) {
            (Some(Symbol::Var { .. }), None) => frame
                .get(&var.name)
                .cloned()
                .ok_or_else(|| Error::runtime(format!("Variable '{}' has no storage", var.name))),
            (Some(Symbol::Array { .. }), Some(i)) => match frame.array(&var.name) {
                Some(storage) => storage.get(i).cloned(),
                None => runtime_error(format!("Array '{}' has no storage", var.name)),
            },
            (Some(Symbol::Var { .. }), Some(_)) => {
                runtime_error(format!("'{}' is not an array", var.name))
            }
            _ => runtime_error(format!("'{}' is not a variable", var.name)),
        }
    }

    fn eval_expr(&mut self, cx: &Analysis, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::LiteralInt(n) => Ok(Value::Int(*n)),
            Expr::LiteralReal(r) => Ok(Value::Real(*r)),
            Expr::LiteralBool(b) => Ok(Value::Bool(*b)),
            Expr::LiteralString(s) => Ok(Value::Str(s.clone())),
            Expr::Var(var) => self.eval_var(cx, var),
            Expr::Call(call) => self.call(cx, call),
            Expr::Unary { op, operand } => match (op, self.eval_expr(cx, operand)?) {
                (UnaryOp::Plus, v @ (Value::Int(_) | Value::Real(_))) => Ok(v),
                (UnaryOp::Minus, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
                (UnaryOp::Minus, Value::Real(r)) => Ok(Value::Real(-r)),
                (_, other) => runtime_error(format!(
                    "Unary operator expects a number, got {}",
                    other.type_name()
                )),
            },
            Expr::Binary { op, lhs, rhs } => {
                let l = self.eval_expr(cx, lhs)?;
                let r = self.eval_expr(cx, rhs)?;
                Self::binary(*op, l, r)
            }
        }
    }

    fn binary(op: BinaryOp, l: Value, r: Value) -> Result<Value> {
        if op.is_comparison() {
            let ord = Self::compare(&l, &r)?;
            let result = match op {
                BinaryOp::Eq => ord == Some(Ordering::Equal),
                BinaryOp::Lt => ord == Some(Ordering::Less),
                _ => ord == Some(Ordering::Greater),
            };
            return Ok(Value::Bool(result));
        }
        match (op, numeric_pair(&l, &r)) {
            (BinaryOp::Add, Some(Numeric::Ints(a, b))) => Ok(Value::Int(a.wrapping_add(b))),
            (BinaryOp::Add, Some(Numeric::Reals(a, b))) => Ok(Value::Real(a + b)),
            (BinaryOp::Sub, Some(Numeric::Ints(a, b))) => Ok(Value::Int(a.wrapping_sub(b))),
            (BinaryOp::Sub, Some(Numeric::Reals(a, b))) => Ok(Value::Real(a - b)),
            (BinaryOp::Mul, Some(Numeric::Ints(a, b))) => Ok(Value::Int(a.wrapping_mul(b))),
            (BinaryOp::Mul, Some(Numeric::Reals(a, b))) => Ok(Value::Real(a * b)),
            (BinaryOp::IntDiv | BinaryOp::Div, Some(Numeric::Ints(_, 0))) => {
                runtime_error("Division by zero")
            }
            (BinaryOp::IntDiv, Some(Numeric::Ints(a, b))) => Ok(Value::Int(a.wrapping_div(b))),
            (BinaryOp::Div, Some(Numeric::Ints(a, b))) => Ok(Value::Real(a as f64 / b as f64)),
            (BinaryOp::Div, Some(Numeric::Reals(_, b))) if b == 0.0 => {
                runtime_error("Division by zero")
            }
            (BinaryOp::Div, Some(Numeric::Reals(a, b))) => Ok(Value::Real(a / b)),
            (BinaryOp::IntDiv, _) => runtime_error(format!(
                "Operator 'div' requires integer operands, got {} and {}",
                l.type_name(),
                r.type_name()
            )),
            (BinaryOp::Add, None) => match (l, r) {
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (a, b) => {
                    runtime_error(format!("Cannot add {} and {}", a.type_name(), b.type_name()))
                }
            },
            _ => runtime_error(format!(
                "Operator '{}' cannot be applied to {} and {}",
                op.symbol(),
                l.type_name(),
                r.type_name()
            )),
        }
    }

    /// Ordering after numeric promotion; `None` for unordered reals (NaN).
    fn compare(l: &Value, r: &Value) -> Result<Option<Ordering>> {
        match (numeric_pair(l, r), l, r) {
            (Some(Numeric::Ints(a, b)), _, _) => Ok(Some(a.cmp(&b))),
            (Some(Numeric::Reals(a, b)), _, _) => Ok(a.partial_cmp(&b)),
            (None, Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            (None, Value::Bool(a), Value::Bool(b)) => Ok(Some(a.cmp(b))),
            _ => runtime_error(format!("Cannot compare {} with {}", l.type_name(), r.type_name())),
        }
    }

    fn call(&mut self, cx: &Analysis, call: &Call) -> Result<Value> {
        if let Some(builtin) = Builtin::from_name(&call.name) {
            return self.call_builtin(cx, builtin, &call.args);
        }
        let decl_frame = self
            .locate(cx, &call.name)
            .ok_or_else(|| {
                Error::runtime(format!("Undefined procedure or function '{}'", call.name))
            })?;
        let callee = match cx.scope(self.frames[decl_frame].scope).lookup_local(&call.name) {
            Some(Symbol::Procedure { scope, .. }) | Some(Symbol::Function { scope, .. }) => *scope,
            _ => return runtime_error(format!("'{}' is not a procedure or function", call.name)),
        };
        let routine = cx
            .routine(callee)
            .ok_or_else(|| Error::runtime(format!("No body found for '{}'", call.name)))?;
        if routine.params.len() != call.args.len() {
            return runtime_error(format!(
                "'{}' expects {} argument(s), got {}",
                call.name,
                routine.params.len(),
                call.args.len()
            ));
        }

        // arguments are evaluated in the caller's frame
        let mut frame = Frame::new(cx.scope(callee), Some(decl_frame));
        for (param, arg) in routine.params.iter().zip(&call.args) {
            let v = self.eval_expr(cx, arg)?;
            frame.set(&param.name, coerce(v, param.ty)?);
        }

        self.stats.calls_made += 1;
        self.push_frame(frame)?;
        let outcome = self.exec_block(cx, &routine.block);
        let mut frame = self.frames.pop().ok_or_else(|| Error::runtime("Frame stack underflow"))?;
        outcome?;

        match routine.return_type {
            None => Ok(Value::None),
            Some(_) => frame
                .take_result()
                .ok_or_else(|| {
                    Error::runtime(format!("Function '{}' did not assign a result", routine.name))
                }),
        }
    }

    fn call_builtin(&mut self, cx: &Analysis, builtin: Builtin, args: &[Expr]) -> Result<Value> {
        match builtin {
            Builtin::Write | Builtin::Writeln => {
                let mut out = String::new();
                for a in args {
                    let v = self.eval_expr(cx, a)?;
                    out.push_str(&v.to_string());
                }
                if builtin == Builtin::Writeln {
                    out.push('\n');
                }
                self.console.write(&out)?;
            }
            Builtin::Read => self.call_read(cx, args)?,
        }
        Ok(Value::None)
    }

    /// READ: one input line, whitespace separated, converted by target type.
    fn call_read(&mut self, cx: &Analysis, args: &[Expr]) -> Result<()> {
        let line = self
            .console
            .read_line()?
            .ok_or_else(|| Error::runtime("READ: unexpected end of input"))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < args.len() {
            return runtime_error(format!(
                "READ: expected {} value(s), got {}",
                args.len(),
                tokens.len()
            ));
        }
        for (arg, token) in args.iter().zip(tokens) {
            let target = match arg {
                Expr::Var(target) => target,
                _ => return runtime_error("READ arguments must be variables"),
            };
            let ty = self.target_type(cx, target)?;
            let value = parse_input(token, ty)?;
            self.assign(cx, target, value)?;
        }
        Ok(())
    }

    fn target_type(&self, cx: &Analysis, target: &VarRef) -> Result<Type> {
        if target.index.is_none() {
            if let Some(top) = self.frames.last() {
                let scope = cx.scope(top.scope);
                if let (true, Some(ty)) = (scope.is_result_of(&target.name), scope.returns) {
                    return Ok(ty);
                }
            }
        }
        let at = self
            .locate(cx, &target.name)
            .ok_or_else(|| Error::runtime(format!("Undefined variable '{}'", target.name)))?;
        match cx.scope(self.frames[at].scope).lookup_local(&target.name) {
            Some(Symbol::Var { ty, .. }) => Ok(*ty),
            Some(Symbol::Array { elem, .. }) => Ok(*elem),
            _ => runtime_error(format!("'{}' is not a variable", target.name)),
        }
    }
}
