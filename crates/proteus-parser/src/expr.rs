//! Expression parsing

use super::*;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        self.parse_expression_with_precedence(1)
    }

    pub(crate) fn parse_expression_with_precedence(&mut self, min_precedence: u8) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_prefix_expression()?;

        loop {
            let precedence = self.get_infix_precedence();

            if precedence == 0 || precedence < min_precedence {
                break;
            }

            left = self.parse_infix_expression(left, precedence)?;
        }

        Ok(left)
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let expr = match self.current_token().kind {
            TokenKind::IntLiteral => {
                let value = self.advance().value.clone();
                let n = value
                    .parse::<i64>()
                    .map_err(|_| ParseError::new(format!("Integer literal out of range: {}", value), start))?;
                Expr::Integer(n)
            }
            TokenKind::DoubleLiteral => {
                let value = self.advance().value.clone();
                let n = value
                    .parse::<f64>()
                    .map_err(|_| ParseError::new(format!("Invalid number: {}", value), start))?;
                Expr::Double(n)
            }
            TokenKind::StringLiteral => Expr::Str(self.advance().value.clone()),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RParen)?;
                inner.value
            }
            // Negation folds into literals, otherwise `0 - expr`
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expression_with_precedence(6)?;
                match operand.value {
                    Expr::Integer(n) => Expr::Integer(n.wrapping_neg()),
                    Expr::Double(n) => Expr::Double(-n),
                    other => Expr::Binary {
                        left: Box::new(Node::new(Expr::Integer(0), start)),
                        op: BinaryOp::Sub,
                        right: Box::new(Node::new(other, operand.span)),
                    },
                }
            }
            TokenKind::Identifier => {
                let reference = self.parse_reference()?;
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_arguments()?;
                    Expr::Call { callee: reference, args }
                } else if reference.is_single() {
                    Expr::Ident(reference.first().value.clone())
                } else {
                    Expr::Reference(reference)
                }
            }
            _ => {
                return Err(self.error(format!(
                    "Expected expression, found {:?}",
                    self.current_token().kind
                )))
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(expr, span))
    }

    fn parse_infix_expression(&mut self, left: Node<Expr>, precedence: u8) -> ParseResult<Node<Expr>> {
        let start = left.span;

        let expr = match self.current_token().kind {
            // Right associative
            TokenKind::Eq => {
                let eq_span = self.advance().span;
                let target = match left.value {
                    Expr::Ident(ident) => Reference::single(Node::new(ident, left.span)),
                    Expr::Reference(reference) => reference,
                    _ => {
                        return Err(ParseError::new("Invalid assignment target", eq_span))
                    }
                };
                let value = Box::new(self.parse_expression_with_precedence(precedence)?);
                Expr::Assignment { target, value }
            }
            _ => {
                let op_kind = self.advance().kind.clone();
                let op = match op_kind {
                    TokenKind::Plus => BinaryOp::Add,
                    TokenKind::Minus => BinaryOp::Sub,
                    TokenKind::Star => BinaryOp::Mul,
                    TokenKind::Slash => BinaryOp::Div,
                    TokenKind::EqEq => BinaryOp::Eq,
                    TokenKind::BangEq => BinaryOp::Ne,
                    TokenKind::Lt => BinaryOp::Lt,
                    TokenKind::LtEq => BinaryOp::Le,
                    TokenKind::Gt => BinaryOp::Gt,
                    TokenKind::GtEq => BinaryOp::Ge,
                    _ => return Err(self.error("Expected binary operator".to_string())),
                };
                // Left associative
                let right = Box::new(self.parse_expression_with_precedence(precedence + 1)?);
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right,
                }
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(expr, span))
    }

    /// `ident ( . ident )*`
    fn parse_reference(&mut self) -> ParseResult<Reference> {
        let mut reference = Reference::single(self.parse_identifier()?);
        while self.check(&TokenKind::Dot) {
            self.advance();
            reference.push(self.parse_identifier()?);
        }
        Ok(reference)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Node<Expr>>> {
        self.consume(TokenKind::LParen)?;
        let mut args = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expression()?);
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }

        self.consume(TokenKind::RParen)?;
        Ok(args)
    }
}
