//! Core Parser struct and statement parsing

use super::*;

/// Recursive descent parser for Proteus
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
}

impl Parser {
    /// Creates a new parser from a token stream
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            let file_id = tokens.last().map_or(0, |t| t.span.file_id);
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(end, end, file_id),
                value: String::new(),
            });
        }
        Self { tokens, current: 0 }
    }

    /// Parses a complete program
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let start_span = self.current_token().span;
        let mut stmts = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        if errors.is_empty() {
            let end_span = stmts.last().map_or(start_span, |s: &Node<Stmt>| s.span);
            Ok(Program::new(Block::new(stmts), start_span.merge(&end_span)))
        } else {
            Err(errors)
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;

        let stmt = match self.current_token().kind {
            TokenKind::Extern => Stmt::Extern(self.parse_extern_decl()?),
            TokenKind::Return => {
                self.advance();
                let value = self.parse_expression()?;
                self.consume(TokenKind::Semicolon)?;
                Stmt::Return(value)
            }
            _ if self.current_token().kind.is_type_keyword() => {
                if self.peek_kind(2) == Some(&TokenKind::LParen) {
                    Stmt::Function(self.parse_function_decl()?)
                } else {
                    Stmt::VarDecl(self.parse_var_decl()?)
                }
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume(TokenKind::Semicolon)?;
                Stmt::Expr(expr)
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(stmt, span))
    }

    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> ParseResult<Node<Block>> {
        let start = self.consume(TokenKind::LBrace)?.span;
        let mut stmts = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_statement()?);
        }

        let end = self.consume(TokenKind::RBrace)?.span;
        Ok(Node::new(Block::new(stmts), start.merge(&end)))
    }

    fn parse_var_decl(&mut self) -> ParseResult<VarDecl> {
        let ty = self.parse_type_tag()?;
        let name = self.parse_identifier()?;

        let init = if self.check(&TokenKind::Eq) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon)?;
        Ok(VarDecl { ty, name, init })
    }

    fn parse_extern_decl(&mut self) -> ParseResult<ExternDecl> {
        self.consume(TokenKind::Extern)?;
        let ret = self.parse_type_tag()?;
        let name = self.parse_identifier()?;
        let params = self.parse_params()?;
        self.consume(TokenKind::Semicolon)?;
        Ok(ExternDecl { ret, name, params })
    }

    fn parse_function_decl(&mut self) -> ParseResult<FunctionDecl> {
        let ret = self.parse_type_tag()?;
        let name = self.parse_identifier()?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(FunctionDecl { ret, name, params, body })
    }
}
