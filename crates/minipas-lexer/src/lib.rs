//! minipas lexer: converts source text into tokens, one at a time.
use minipas_syntax::error::{error_at, Error, ErrorKind, Result};
use minipas_syntax::token::{Token, TokenKind};

/// Where the scanner stands relative to a single-quoted string constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringState {
    Outside,
    /// Opening quote emitted; content comes next.
    Opened,
    /// Content emitted; the closing quote comes next.
    Content,
}

/// Streaming character scanner that produces tokens with positions.
pub struct Lexer {
    src: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    string: StringState,
}

impl Lexer {
    /// Create a new lexer over the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            src: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            string: StringState::Outside,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }
    fn peek_next(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }
    fn advance(&mut self) -> Option<char> {
        let ch = self.src.get(self.pos).copied();
        if let Some(c) = ch {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        ch
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '{' {
                let (line, col) = (self.line, self.col);
                self.advance();
                loop {
                    match self.advance() {
                        Some('}') => break,
                        Some(_) => {}
                        None => {
                            return error_at(ErrorKind::Lexical, line, col, "Unterminated comment")
                        }
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn read_number(&mut self) -> Result<TokenKind> {
        let (line, col) = (self.line, self.col);
        let mut s = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            s.push(c);
            self.advance();
        }
        // `1..5` is a range, not the real `1.`
        if self.peek() == Some('.') && self.peek_next() != Some('.') {
            s.push('.');
            self.advance();
            while let Some(c) = self.peek().filter(char::is_ascii_digit) {
                s.push(c);
                self.advance();
            }
            let val: f64 = s.parse().map_err(|_| {
                Error::lexical(format!("Invalid real constant '{}'", s), line, col)
            })?;
            return Ok(TokenKind::RealConst(val));
        }
        let val: i64 = s.parse().map_err(|_| {
            Error::lexical(format!("Invalid integer constant '{}'", s), line, col)
        })?;
        Ok(TokenKind::IntegerConst(val))
    }

    fn read_ident_or_keyword(&mut self) -> TokenKind {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::keyword(&s).unwrap_or(TokenKind::Ident(s))
    }

    fn read_string_content(&mut self, line: usize, col: usize) -> Result<TokenKind> {
        let mut s = String::new();
        loop {
            match self.peek() {
                Some('\'') => return Ok(TokenKind::StringConst(s)),
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => return error_at(ErrorKind::Lexical, line, col, "Unterminated string"),
            }
        }
    }

    /// Inside a string the only tokens are the content and the closing quote.
    fn next_in_string(&mut self) -> Result<Token> {
        let (line, col) = (self.line, self.col);
        let kind = match (self.string, self.peek()) {
            (_, Some('\'')) => {
                self.advance();
                self.string = StringState::Outside;
                TokenKind::Apostrophe
            }
            (StringState::Opened, Some(_)) => {
                let kind = self.read_string_content(line, col)?;
                self.string = StringState::Content;
                kind
            }
            _ => return error_at(ErrorKind::Lexical, line, col, "Unterminated string"),
        };
        Ok(Token { kind, line, col })
    }

    /// Produce the next token. Once the input is exhausted every call returns `Eof`.
    pub fn next_token(&mut self) -> Result<Token> {
        if self.string != StringState::Outside {
            return self.next_in_string();
        }
        self.skip_whitespace_and_comments()?;
        let line = self.line;
        let col = self.col;
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(':') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Assign
                } else {
                    TokenKind::Colon
                }
            }
            Some('.') => {
                self.advance();
                if self.peek() == Some('.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            Some('\'') => {
                self.advance();
                self.string = StringState::Opened;
                TokenKind::Apostrophe
            }
            Some(c) if c.is_ascii_digit() => self.read_number()?,
            Some(c) if c.is_ascii_alphabetic() => self.read_ident_or_keyword(),
            Some(c) => {
                let kind = match c {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Star,
                    '/' => TokenKind::Slash,
                    '=' => TokenKind::Equal,
                    '<' => TokenKind::Less,
                    '>' => TokenKind::Greater,
                    ',' => TokenKind::Comma,
                    ';' => TokenKind::Semi,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    other => {
                        return error_at(
                            ErrorKind::Lexical,
                            line,
                            col,
                            format!("Unexpected character '{}' at offset {}", other, self.pos),
                        );
                    }
                };
                self.advance();
                kind
            }
        };
        Ok(Token { kind, line, col })
    }

    /// Tokenize the entire input into a vector of tokens ending with Eof.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tk = self.next_token()?;
            let done = tk.kind == TokenKind::Eof;
            tokens.push(tk);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        lexer
            .tokenize()
            .expect("Lexing should succeed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_arithmetic() {
        let expected = vec![
            TokenKind::IntegerConst(3),
            TokenKind::Plus,
            TokenKind::IntegerConst(4),
            TokenKind::Eof,
        ];
        assert_eq!(kinds("3+4"), expected);
        assert_eq!(kinds(" 3 + 4 "), expected);
    }

    #[test]
    fn test_real_and_range() {
        assert_eq!(kinds("3.14"), vec![TokenKind::RealConst(3.14), TokenKind::Eof]);
        assert_eq!(
            kinds("1..5"),
            vec![
                TokenKind::IntegerConst(1),
                TokenKind::DotDot,
                TokenKind::IntegerConst(5),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_keywords_ignore_case() {
        assert_eq!(
            kinds("BEGIN End bEgIn"),
            vec![TokenKind::Begin, TokenKind::End, TokenKind::Begin, TokenKind::Eof]
        );
        assert_eq!(
            kinds("TRUE false"),
            vec![TokenKind::BoolConst(true), TokenKind::BoolConst(false), TokenKind::Eof]
        );
        assert_eq!(kinds("Counter"), vec![TokenKind::Ident("Counter".to_string()), TokenKind::Eof]);
    }

    #[test]
    fn test_assign_is_greedy() {
        assert_eq!(
            kinds("x := 1; y : integer"),
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::Assign,
                TokenKind::IntegerConst(1),
                TokenKind::Semi,
                TokenKind::Ident("y".to_string()),
                TokenKind::Colon,
                TokenKind::Integer,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("{ a comment } 1 {another}"),
            vec![TokenKind::IntegerConst(1), TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_tokens() {
        assert_eq!(
            kinds("'hello world'"),
            vec![
                TokenKind::Apostrophe,
                TokenKind::StringConst("hello world".to_string()),
                TokenKind::Apostrophe,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("''"),
            vec![TokenKind::Apostrophe, TokenKind::Apostrophe, TokenKind::Eof]
        );
        // whitespace inside a string is content, not skipped
        assert_eq!(
            kinds("'  { x }'"),
            vec![
                TokenKind::Apostrophe,
                TokenKind::StringConst("  { x }".to_string()),
                TokenKind::Apostrophe,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_positions() {
        let mut lexer = Lexer::new("program\n  x");
        let first = lexer.next_token().unwrap();
        assert_eq!((first.line, first.col), (1, 1));
        let second = lexer.next_token().unwrap();
        assert_eq!((second.line, second.col), (2, 3));
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x");
        lexer.next_token().unwrap();
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_error_cases() {
        let err = Lexer::new("x := 1 & 2").tokenize().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert!(err.msg.contains("'&'"));
        assert!(err.msg.contains("offset 7"));
        assert_eq!((err.line, err.col), (Some(1), Some(8)));

        assert!(Lexer::new("'open").tokenize().is_err());
        assert!(Lexer::new("{ never closed").tokenize().is_err());
    }
}
