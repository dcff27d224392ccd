use proteus_ast::Span;
use crate::token::{Token, TokenKind};

/// The lexer/tokenizer for Proteus.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            file_id,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        if let Some(error_token) = self.skip_whitespace_and_comments() {
            return error_token;
        }

        let start = self.current_pos;

        match self.current_char {
            None => Token::new(TokenKind::Eof, Span::new(start, start, self.file_id), String::new()),
            Some(ch) => match ch {
                '"' | '\'' => self.read_string_literal(ch),
                '0'..='9' => self.read_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.read_identifier_or_keyword(),

                '+' => self.single(TokenKind::Plus, "+"),
                '-' => self.single(TokenKind::Minus, "-"),
                '*' => self.single(TokenKind::Star, "*"),
                '/' => self.single(TokenKind::Slash, "/"),
                '=' => self.with_eq(TokenKind::Eq, "=", TokenKind::EqEq, "=="),
                '<' => self.with_eq(TokenKind::Lt, "<", TokenKind::LtEq, "<="),
                '>' => self.with_eq(TokenKind::Gt, ">", TokenKind::GtEq, ">="),
                '!' => {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        Token::new(TokenKind::BangEq, Span::new(start, self.current_pos, self.file_id), "!=".to_string())
                    } else {
                        Token::new(
                            TokenKind::Error,
                            Span::new(start, self.current_pos, self.file_id),
                            "Unexpected character: !".to_string(),
                        )
                    }
                }

                '(' => self.single(TokenKind::LParen, "("),
                ')' => self.single(TokenKind::RParen, ")"),
                '{' => self.single(TokenKind::LBrace, "{"),
                '}' => self.single(TokenKind::RBrace, "}"),
                ';' => self.single(TokenKind::Semicolon, ";"),
                ',' => self.single(TokenKind::Comma, ","),
                '.' => self.single(TokenKind::Dot, "."),

                _ if ch.is_alphabetic() => self.read_identifier_or_keyword(),

                _ => {
                    self.advance();
                    Token::new(
                        TokenKind::Error,
                        Span::new(start, self.current_pos, self.file_id),
                        format!("Unexpected character: {}", ch),
                    )
                }
            },
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn single(&mut self, kind: TokenKind, text: &str) -> Token {
        let start = self.current_pos;
        self.advance();
        Token::new(kind, Span::new(start, self.current_pos, self.file_id), text.to_string())
    }

    /// One-character operator that may be followed by `=`.
    fn with_eq(&mut self, plain: TokenKind, plain_text: &str, eq: TokenKind, eq_text: &str) -> Token {
        let start = self.current_pos;
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            Token::new(eq, Span::new(start, self.current_pos, self.file_id), eq_text.to_string())
        } else {
            Token::new(plain, Span::new(start, self.current_pos, self.file_id), plain_text.to_string())
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek() == Some('/') {
                        self.skip_single_line_comment();
                    } else if self.peek() == Some('*') {
                        let start = self.current_pos;
                        if !self.skip_multi_line_comment() {
                            return Some(Token::new(
                                TokenKind::Error,
                                Span::new(start, self.current_pos, self.file_id),
                                "Unterminated multi-line comment".to_string(),
                            ));
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        None
    }

    fn skip_single_line_comment(&mut self) {
        // Skip //
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_multi_line_comment(&mut self) -> bool {
        // Skip /*
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance();
                self.advance();
                return true;
            }
            self.advance();
        }
        false
    }

    fn read_string_literal(&mut self, quote: char) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance();
                let span = Span::new(start, self.current_pos, self.file_id);
                // Literals become NUL-terminated data, so an interior NUL would truncate them
                if value.contains('\0') {
                    return Token::new(
                        TokenKind::Error,
                        span,
                        "String literal cannot contain a NUL character".to_string(),
                    );
                }
                return Token::new(TokenKind::StringLiteral, span, value);
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    let unescaped = match escaped {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        '0' => '\0',
                        _ => escaped,
                    };
                    value.push(unescaped);
                    self.advance();
                }
            } else if ch == '\n' {
                break;
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Token::new(
            TokenKind::Error,
            Span::new(start, self.current_pos, self.file_id),
            "Unterminated string literal".to_string(),
        )
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;
        let mut value = String::new();
        let mut is_double = false;

        self.read_digits(&mut value);

        if self.current_char == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            is_double = true;
            value.push('.');
            self.advance();
            self.read_digits(&mut value);
        }

        if matches!(self.current_char, Some('e') | Some('E')) {
            let sign = self.peek();
            if sign.is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-') {
                is_double = true;
                value.push('e');
                self.advance();
                if let Some(c @ ('+' | '-')) = self.current_char {
                    value.push(c);
                    self.advance();
                }
                self.read_digits(&mut value);
            }
        }

        let span = Span::new(start, self.current_pos, self.file_id);
        if is_double {
            Token::new(TokenKind::DoubleLiteral, span, value)
        } else {
            Token::new(TokenKind::IntLiteral, span, value)
        }
    }

    fn read_digits(&mut self, value: &mut String) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match value.as_str() {
            "extern" => TokenKind::Extern,
            "return" => TokenKind::Return,
            "int" => TokenKind::Int,
            "double" => TokenKind::Double,
            "string" => TokenKind::String,
            "object" => TokenKind::Object,
            "bool" => TokenKind::Bool,
            "void" => TokenKind::Void,
            _ => TokenKind::Identifier,
        };

        Token::new(kind, Span::new(start, self.current_pos, self.file_id), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        let source = "extern return int double string object bool void";
        let tokens = kinds(source);

        assert_eq!(
            tokens,
            vec![
                TokenKind::Extern,
                TokenKind::Return,
                TokenKind::Int,
                TokenKind::Double,
                TokenKind::String,
                TokenKind::Object,
                TokenKind::Bool,
                TokenKind::Void,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let source = "123 45.67 1_000 2e3 7.";
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();

        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[0].value, "123");
        assert_eq!(tokens[1].kind, TokenKind::DoubleLiteral);
        assert_eq!(tokens[1].value, "45.67");
        assert_eq!(tokens[2].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[2].value, "1000");
        assert_eq!(tokens[3].kind, TokenKind::DoubleLiteral);
        assert_eq!(tokens[3].value, "2e3");
        // `7.` is an integer followed by a dot
        assert_eq!(tokens[4].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[5].kind, TokenKind::Dot);
    }

    #[test]
    fn test_strings() {
        let source = r#""hello" 'wor\nld'"#;
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].value, "hello");
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].value, "wor\nld");
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc");
        let tokens = lexer.tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].value, "Unterminated string literal");
    }

    #[test]
    fn test_operators() {
        let source = "+ - * / = == != < <= > >=";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Eq,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_reference_chain() {
        let source = "a.b.c = 5;";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        let source = "x // line\n/* block\n */ y";
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].value, "x");
        assert_eq!(tokens[1].value, "y");
    }

    #[test]
    fn test_nul_in_string_is_rejected() {
        let mut lexer = Lexer::new(r#""a\0b" x"#);
        let tokens = lexer.tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].span, Span::new(0, 6, 0));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_spans() {
        let mut lexer = Lexer::with_file_id("ab  cd", 3);
        let tokens = lexer.tokenize();

        assert_eq!(tokens[0].span, Span::new(0, 2, 3));
        assert_eq!(tokens[1].span, Span::new(4, 6, 3));
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("#");
        let tokens = lexer.tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].value, "Unexpected character: #");
    }
}
