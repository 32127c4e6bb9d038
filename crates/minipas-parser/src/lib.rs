pub mod parser;

pub use parser::Parser;

#[cfg(test)]
mod tests {
    use super::*;
    use minipas_lexer::Lexer;
    use minipas_syntax::ast::*;
    use minipas_syntax::error::ErrorKind;

    fn parse_expr_str(input: &str) -> Expr {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize().expect("Lexing should succeed");
        let mut parser = Parser::new(tokens);
        parser.parse_standalone_expr().expect("Parsing should succeed")
    }

    fn parse_program_str(input: &str) -> Program {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize().expect("Lexing should succeed");
        let mut parser = Parser::new(tokens);
        parser.parse_program().expect("Parsing should succeed")
    }

    fn parse_program_err(input: &str) -> minipas_syntax::error::Error {
        let tokens = Lexer::new(input).tokenize().expect("Lexing should succeed");
        Parser::new(tokens).parse_program().expect_err("Parsing should fail")
    }

    fn body_of(input: &str) -> Vec<Stmt> {
        parse_program_str(&format!("program t; begin {} end.", input)).block.body
    }

    #[test]
    fn test_literal_expressions() {
        assert_eq!(parse_expr_str("42"), Expr::LiteralInt(42));
        assert_eq!(parse_expr_str("2.5"), Expr::LiteralReal(2.5));
        assert_eq!(parse_expr_str("'hello'"), Expr::LiteralString("hello".to_string()));
        assert_eq!(parse_expr_str("''"), Expr::LiteralString(String::new()));
        assert_eq!(parse_expr_str("TRUE"), Expr::LiteralBool(true));
    }

    #[test]
    fn test_operator_precedence() {
        let expected = Expr::binary(
            BinaryOp::Add,
            Expr::LiteralInt(1),
            Expr::binary(BinaryOp::Mul, Expr::LiteralInt(2), Expr::LiteralInt(3)),
        );
        assert_eq!(parse_expr_str("1 + 2 * 3"), expected);
        assert_eq!(
            parse_expr_str("(1 + 2) * 3"),
            Expr::binary(
                BinaryOp::Mul,
                Expr::binary(BinaryOp::Add, Expr::LiteralInt(1), Expr::LiteralInt(2)),
                Expr::LiteralInt(3),
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(
            parse_expr_str("10 - 4 - 3"),
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, Expr::LiteralInt(10), Expr::LiteralInt(4)),
                Expr::LiteralInt(3),
            )
        );
        assert_eq!(
            parse_expr_str("8 div 2 / 2"),
            Expr::binary(
                BinaryOp::Div,
                Expr::binary(BinaryOp::IntDiv, Expr::LiteralInt(8), Expr::LiteralInt(2)),
                Expr::LiteralInt(2),
            )
        );
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(
            parse_expr_str("-+3"),
            Expr::unary(UnaryOp::Minus, Expr::unary(UnaryOp::Plus, Expr::LiteralInt(3)))
        );
    }

    #[test]
    fn test_calls_and_indexing() {
        assert_eq!(
            parse_expr_str("Max(a, data[i + 1])"),
            Expr::Call(Call {
                name: "Max".to_string(),
                args: vec![
                    Expr::var("a"),
                    Expr::Var(VarRef::indexed(
                        "data",
                        Expr::binary(BinaryOp::Add, Expr::var("i"), Expr::LiteralInt(1)),
                    )),
                ],
            })
        );
    }

    #[test]
    fn test_minimal_program() {
        let program = parse_program_str("program Empty; begin end.");
        assert_eq!(program.name, "Empty");
        assert_eq!(program.block, Block { decls: vec![], body: vec![Stmt::NoOp] });
    }

    #[test]
    fn test_declarations() {
        let program = parse_program_str(
            "program Decls;
             var a, b : integer;
                 data : array [1..5] of real;
             procedure Show(x : integer; y, z : real);
             begin end;
             function Twice(n : integer) : integer;
             begin Twice := n * 2 end;
             begin end.",
        );
        let decls = program.block.decls;
        assert_eq!(decls.len(), 5);
        let int_var = |name: &str| {
            Decl::Var(VarDecl { name: name.into(), ty: TypeSpec::Scalar(Type::Integer) })
        };
        assert_eq!(decls[0], int_var("a"));
        assert_eq!(decls[1], int_var("b"));
        assert_eq!(
            decls[2],
            Decl::Var(VarDecl {
                name: "data".into(),
                ty: TypeSpec::Array { elem: Type::Real, lower: 1, upper: 5 }
            })
        );
        match &decls[3] {
            Decl::Procedure(p) => {
                assert_eq!(p.name, "Show");
                assert_eq!(
                    p.params,
                    vec![
                        Param { name: "x".into(), ty: Type::Integer },
                        Param { name: "y".into(), ty: Type::Real },
                        Param { name: "z".into(), ty: Type::Real },
                    ]
                );
            }
            other => panic!("Expected procedure, got {:?}", other),
        }
        match &decls[4] {
            Decl::Function(f) => {
                assert_eq!(f.return_type, Type::Integer);
                assert_eq!(
                    f.block.body,
                    vec![Stmt::Assign {
                        target: VarRef::scalar("Twice"),
                        expr: Expr::binary(BinaryOp::Mul, Expr::var("n"), Expr::LiteralInt(2)),
                    }]
                );
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_array_bounds() {
        let program = parse_program_str("program A; var v : array [-2..2] of boolean; begin end.");
        assert_eq!(
            program.block.decls[0],
            Decl::Var(VarDecl {
                name: "v".into(),
                ty: TypeSpec::Array { elem: Type::Boolean, lower: -2, upper: 2 }
            })
        );
    }

    #[test]
    fn test_control_flow_statements() {
        let body = body_of("if x > 1 then y := 1 else y := 2");
        assert_eq!(
            body[0],
            Stmt::If {
                cond: Expr::binary(BinaryOp::Gt, Expr::var("x"), Expr::LiteralInt(1)),
                then_branch: Box::new(Stmt::Assign {
                    target: VarRef::scalar("y"),
                    expr: Expr::LiteralInt(1),
                }),
                else_branch: Some(Box::new(Stmt::Assign {
                    target: VarRef::scalar("y"),
                    expr: Expr::LiteralInt(2),
                })),
            }
        );

        let body = body_of("repeat x := x + 1; y := x until x = 6");
        match &body[0] {
            Stmt::Repeat { body, cond } => {
                assert_eq!(body.len(), 2);
                assert_eq!(*cond, Expr::binary(BinaryOp::Eq, Expr::var("x"), Expr::LiteralInt(6)));
            }
            other => panic!("Expected repeat, got {:?}", other),
        }

        let body = body_of("for i := 1 to 5 do data[i] := i");
        assert_eq!(
            body[0],
            Stmt::For {
                var: "i".into(),
                start: Expr::LiteralInt(1),
                end: Expr::LiteralInt(5),
                descending: false,
                body: Box::new(Stmt::Assign {
                    target: VarRef::indexed("data", Expr::var("i")),
                    expr: Expr::var("i"),
                }),
            }
        );

        let body = body_of("for i := 5 downto 1 do ; while i < 3 do begin end");
        assert!(matches!(body[0], Stmt::For { descending: true, .. }));
        assert!(matches!(
            &body[1],
            Stmt::While { body, .. } if **body == Stmt::Compound(vec![Stmt::NoOp])
        ));
    }

    #[test]
    fn test_parenthesized_conditions() {
        let wrapped = body_of("while (x < 10) do x := x + 1");
        let bare = body_of("while x < 10 do x := x + 1");
        assert_eq!(wrapped, bare);

        // the parenthesis belongs to the left operand here
        let body = body_of("if (a + b) > c then x := 1");
        match &body[0] {
            Stmt::If { cond, .. } => assert_eq!(
                *cond,
                Expr::binary(
                    BinaryOp::Gt,
                    Expr::binary(BinaryOp::Add, Expr::var("a"), Expr::var("b")),
                    Expr::var("c"),
                )
            ),
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_calls_as_statements() {
        let body = body_of("writeln('a', 1); writeln; Reset()");
        assert_eq!(
            body,
            vec![
                Stmt::Call(Call {
                    name: "writeln".into(),
                    args: vec![Expr::LiteralString("a".into()), Expr::LiteralInt(1)],
                }),
                Stmt::Call(Call { name: "writeln".into(), args: vec![] }),
                Stmt::Call(Call { name: "Reset".into(), args: vec![] }),
            ]
        );
    }

    #[test]
    fn test_structurally_equal_programs() {
        let src = "program P; var x : integer; begin x := 1 end.";
        assert_eq!(parse_program_str(src), parse_program_str(src));
        assert_eq!(
            parse_program_str(src),
            parse_program_str("PROGRAM P;VAR x:INTEGER;BEGIN x:=1 END.")
        );
    }

    #[test]
    fn test_syntax_errors() {
        let err = parse_program_err("program P; begin x := 1 end");
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert!(err.msg.contains("Expected '.'"), "{}", err.msg);
        assert!(err.msg.contains("end of input"), "{}", err.msg);

        let err = parse_program_err("program P; begin x := 1; end. extra");
        assert!(err.msg.contains("after end of program"), "{}", err.msg);

        let err = parse_program_err("program P; begin if x then y := 1 end.");
        assert!(err.msg.contains("comparison operator"), "{}", err.msg);

        let err = parse_program_err("program P; var x : integer begin end.");
        assert!(err.msg.contains("Expected ';', found 'begin'"), "{}", err.msg);
        assert_eq!(err.line, Some(1));
    }
}
