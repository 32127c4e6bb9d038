//! Recursive-descent parser producing the minipas AST.

use minipas_syntax::ast::*;
use minipas_syntax::error::{error_at, ErrorKind, Result};
use minipas_syntax::token::{Token, TokenKind};

/// Parser over a fully lexed token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser. A missing trailing `Eof` is supplied so lookahead never runs dry.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let (line, col) = tokens.last().map(|t| (t.line, t.col)).unwrap_or((1, 1));
            tokens.push(Token { kind: TokenKind::Eof, line, col });
        }
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_next_kind(&self) -> &TokenKind {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let tk = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tk
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn fail<T>(&self, msg: impl Into<String>) -> Result<T> {
        let tk = self.peek();
        error_at(ErrorKind::Syntax, tk.line, tk.col, msg)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            self.fail(format!("Expected {}, found {}", kind, self.peek_kind()))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => self.fail(format!("Expected identifier, found {}", other)),
        }
    }

    /// Parse a complete program; any token after the final `.` is an error.
    pub fn parse_program(&mut self) -> Result<Program> {
        self.expect(TokenKind::Program)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Semi)?;
        let block = self.parse_block()?;
        self.expect(TokenKind::Dot)?;
        if !self.check(&TokenKind::Eof) {
            return self.fail(format!("Unexpected {} after end of program", self.peek_kind()));
        }
        Ok(Program { name, block })
    }

    /// Parse a bare expression that must span the whole token stream.
    pub fn parse_standalone_expr(&mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        if !self.check(&TokenKind::Eof) {
            return self.fail(format!("Unexpected {} after expression", self.peek_kind()));
        }
        Ok(expr)
    }

    fn parse_block(&mut self) -> Result<Block> {
        let decls = self.parse_declarations()?;
        let body = self.parse_compound()?;
        Ok(Block { decls, body })
    }

    fn parse_declarations(&mut self) -> Result<Vec<Decl>> {
        let mut decls = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Var => {
                    self.advance();
                    // at least one group per `var`
                    loop {
                        self.parse_var_group(&mut decls)?;
                        if !matches!(self.peek_kind(), TokenKind::Ident(_)) {
                            break;
                        }
                    }
                }
                TokenKind::Procedure => {
                    let p = self.parse_procedure()?;
                    decls.push(Decl::Procedure(p));
                }
                TokenKind::Function => {
                    let f = self.parse_function()?;
                    decls.push(Decl::Function(f));
                }
                _ => break,
            }
        }
        Ok(decls)
    }

    fn parse_ident_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.expect_ident()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    fn parse_var_group(&mut self, decls: &mut Vec<Decl>) -> Result<()> {
        let names = self.parse_ident_list()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type_spec()?;
        self.expect(TokenKind::Semi)?;
        decls.extend(names.into_iter().map(|name| Decl::Var(VarDecl { name, ty: ty.clone() })));
        Ok(())
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec> {
        if !self.check(&TokenKind::Array) {
            return Ok(TypeSpec::Scalar(self.parse_scalar_type()?));
        }
        self.advance();
        self.expect(TokenKind::LBracket)?;
        let lower = self.parse_bound()?;
        self.expect(TokenKind::DotDot)?;
        let upper = self.parse_bound()?;
        self.expect(TokenKind::RBracket)?;
        self.expect(TokenKind::Of)?;
        let elem = self.parse_scalar_type()?;
        Ok(TypeSpec::Array { elem, lower, upper })
    }

    fn parse_bound(&mut self) -> Result<i64> {
        let negative = self.check(&TokenKind::Minus);
        if negative {
            self.advance();
        }
        match self.peek_kind().clone() {
            TokenKind::IntegerConst(n) => {
                self.advance();
                Ok(if negative { n.wrapping_neg() } else { n })
            }
            other => self.fail(format!("Expected integer array bound, found {}", other)),
        }
    }

    fn parse_scalar_type(&mut self) -> Result<Type> {
        let ty = match self.peek_kind() {
            TokenKind::Integer => Type::Integer,
            TokenKind::Real => Type::Real,
            TokenKind::Boolean => Type::Boolean,
            TokenKind::String => Type::String,
            other => return self.fail(format!("Expected type name, found {}", other)),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if !self.check(&TokenKind::LParen) {
            return Ok(params);
        }
        self.advance();
        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(params);
        }
        loop {
            let names = self.parse_ident_list()?;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_scalar_type()?;
            params.extend(names.into_iter().map(|name| Param { name, ty }));
            if !self.check(&TokenKind::Semi) {
                break;
            }
            self.advance();
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn parse_procedure(&mut self) -> Result<ProcedureDecl> {
        self.expect(TokenKind::Procedure)?;
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        self.expect(TokenKind::Semi)?;
        let block = self.parse_block()?;
        self.expect(TokenKind::Semi)?;
        Ok(ProcedureDecl { name, params, block })
    }

    fn parse_function(&mut self) -> Result<FunctionDecl> {
        self.expect(TokenKind::Function)?;
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        self.expect(TokenKind::Colon)?;
        let return_type = self.parse_scalar_type()?;
        self.expect(TokenKind::Semi)?;
        let block = self.parse_block()?;
        self.expect(TokenKind::Semi)?;
        Ok(FunctionDecl { name, params, return_type, block })
    }

    fn parse_compound(&mut self) -> Result<Vec<Stmt>> {
        self.expect(TokenKind::Begin)?;
        let stmts = self.parse_stmt_list()?;
        self.expect(TokenKind::End)?;
        Ok(stmts)
    }

    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = vec![self.parse_stmt()?];
        while self.check(&TokenKind::Semi) {
            self.advance();
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek_kind().clone() {
            TokenKind::Begin => Ok(Stmt::Compound(self.parse_compound()?)),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::For => self.parse_for(),
            TokenKind::Ident(name) => match self.peek_next_kind() {
                TokenKind::LParen => Ok(Stmt::Call(self.parse_call()?)),
                TokenKind::Assign | TokenKind::LBracket => {
                    let target = self.parse_variable()?;
                    self.expect(TokenKind::Assign)?;
                    let expr = self.parse_expr()?;
                    Ok(Stmt::Assign { target, expr })
                }
                _ => {
                    // parameterless call such as `writeln`
                    self.advance();
                    Ok(Stmt::Call(Call { name, args: Vec::new() }))
                }
            },
            _ => Ok(Stmt::NoOp),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::If)?;
        let cond = self.parse_condition()?;
        self.expect(TokenKind::Then)?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::If { cond, then_branch, else_branch })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::While)?;
        let cond = self.parse_condition()?;
        self.expect(TokenKind::Do)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::While { cond, body })
    }

    fn parse_repeat(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::Repeat)?;
        let body = self.parse_stmt_list()?;
        self.expect(TokenKind::Until)?;
        let cond = self.parse_condition()?;
        Ok(Stmt::Repeat { body, cond })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::For)?;
        let var = self.expect_ident()?;
        self.expect(TokenKind::Assign)?;
        let start = self.parse_expr()?;
        let descending = match self.peek_kind() {
            TokenKind::To => false,
            TokenKind::Downto => true,
            other => return self.fail(format!("Expected 'to' or 'downto', found {}", other)),
        };
        self.advance();
        let end = self.parse_expr()?;
        self.expect(TokenKind::Do)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::For { var, start, end, descending, body })
    }

    /// `["("] expr relop expr [")"]`. A leading `(` is first read as wrapping the
    /// whole comparison; if that fails it is re-read as part of the left operand.
    fn parse_condition(&mut self) -> Result<Expr> {
        if self.check(&TokenKind::LParen) {
            let start = self.pos;
            self.advance();
            if let Ok(cond) = self.parse_comparison() {
                if self.check(&TokenKind::RParen) {
                    self.advance();
                    return Ok(cond);
                }
            }
            self.pos = start;
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let lhs = self.parse_expr()?;
        let op = match self.peek_kind() {
            TokenKind::Equal => BinaryOp::Eq,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::Greater => BinaryOp::Gt,
            other => {
                return self.fail(format!(
                    "Expected comparison operator ('=', '<' or '>'), found {}",
                    other
                ))
            }
        };
        self.advance();
        let rhs = self.parse_expr()?;
        Ok(Expr::binary(op, lhs, rhs))
    }

    fn parse_call(&mut self) -> Result<Call> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(Call { name, args })
    }

    fn parse_variable(&mut self) -> Result<VarRef> {
        let name = self.expect_ident()?;
        if !self.check(&TokenKind::LBracket) {
            return Ok(VarRef::scalar(name));
        }
        self.advance();
        let index = self.parse_expr()?;
        self.expect(TokenKind::RBracket)?;
        Ok(VarRef::indexed(name, index))
    }

    /// `expr := term (("+"|"-") term)*`
    pub fn parse_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Div => BinaryOp::IntDiv,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_factor()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        match self.peek_kind().clone() {
            TokenKind::Plus => {
                self.advance();
                Ok(Expr::unary(UnaryOp::Plus, self.parse_factor()?))
            }
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::unary(UnaryOp::Minus, self.parse_factor()?))
            }
            TokenKind::IntegerConst(n) => {
                self.advance();
                Ok(Expr::LiteralInt(n))
            }
            TokenKind::RealConst(r) => {
                self.advance();
                Ok(Expr::LiteralReal(r))
            }
            TokenKind::BoolConst(b) => {
                self.advance();
                Ok(Expr::LiteralBool(b))
            }
            TokenKind::Apostrophe => self.parse_string(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(_) => {
                if self.peek_next_kind() == &TokenKind::LParen {
                    Ok(Expr::Call(self.parse_call()?))
                } else {
                    Ok(Expr::Var(self.parse_variable()?))
                }
            }
            other => self.fail(format!("Expected expression, found {}", other)),
        }
    }

    fn parse_string(&mut self) -> Result<Expr> {
        self.expect(TokenKind::Apostrophe)?;
        let text = match self.peek_kind().clone() {
            TokenKind::StringConst(s) => {
                self.advance();
                s
            }
            _ => String::new(),
        };
        self.expect(TokenKind::Apostrophe)?;
        Ok(Expr::LiteralString(text))
    }
}
