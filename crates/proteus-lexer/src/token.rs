use proteus_ast::Span;

/// Represents the different kinds of tokens in Proteus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Extern,
    Return,

    // Type keywords
    Int,
    Double,
    String,
    Object,
    Bool,
    Void,

    // Literals
    IntLiteral,
    DoubleLiteral,
    StringLiteral,

    // Identifier
    Identifier,

    // Operators
    Plus,              // +
    Minus,             // -
    Star,              // *
    Slash,             // /
    Eq,                // =
    EqEq,              // ==
    BangEq,            // !=
    Lt,                // <
    Gt,                // >
    LtEq,              // <=
    GtEq,              // >=

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    Semicolon,         // ;
    Comma,             // ,
    Dot,               // .

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Whether the token names a type (`int`, `object`, ...).
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Double
                | TokenKind::String
                | TokenKind::Object
                | TokenKind::Bool
                | TokenKind::Void
        )
    }
}

/// Represents a token with its kind, span, and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self { kind, span, value }
    }
}
