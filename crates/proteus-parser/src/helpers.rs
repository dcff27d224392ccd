//! Helper methods and utilities

use super::*;

impl Parser {
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Node<Ident>> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Node::new(
            Ident::new(token.value.clone()),
            token.span,
        ))
    }

    pub(crate) fn parse_type_tag(&mut self) -> ParseResult<Node<TypeTag>> {
        let token = self.current_token();
        match TypeTag::from_keyword(&token.value) {
            Some(tag) if token.kind.is_type_keyword() => {
                let span = token.span;
                self.advance();
                Ok(Node::new(tag, span))
            }
            _ => Err(self.error(format!("Expected type, found {:?}", token.kind))),
        }
    }

    /// `( type name, ... )`
    pub(crate) fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.consume(TokenKind::LParen)?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            let ty = self.parse_type_tag()?;
            let name = self.parse_identifier()?;
            params.push(Param { ty, name });
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RParen)?;
        Ok(params)
    }

    pub(crate) fn get_infix_precedence(&self) -> u8 {
        match self.current_token().kind {
            TokenKind::Eq => 1,
            TokenKind::EqEq | TokenKind::BangEq => 2,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => 3,
            TokenKind::Plus | TokenKind::Minus => 4,
            TokenKind::Star | TokenKind::Slash => 5,
            _ => 0,
        }
    }

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + offset).map(|t| &t.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, found {:?}", kind, self.current_token().kind)))
        }
    }

    pub(crate) fn error(&self, message: String) -> ParseError {
        let token = self.current_token();
        // Surface the lexer's own message for bad tokens
        let message = if token.kind == TokenKind::Error {
            token.value.clone()
        } else {
            message
        };
        ParseError::new(message, token.span)
    }

    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if matches!(self.previous_token().kind, TokenKind::Semicolon | TokenKind::RBrace) {
                return;
            }

            let kind = &self.current_token().kind;
            if matches!(kind, TokenKind::Extern | TokenKind::Return) || kind.is_type_keyword() {
                return;
            }

            self.advance();
        }
    }
}
