//! rill parser.
//!
//! Recursive-descent over the lexer's [`TokenList`], building an
//! arena-allocated AST. Binary operators are parsed with one method per
//! precedence level; assignment and the ternary are right-associative and
//! lowest. Template interpolations are re-lexed recursively through
//! `rill_lexer`.
//!
//! The parser reports one [`ParseError`] per call and never panics on
//! malformed input.

mod cursor;
mod error;
mod grammar;
mod stack;

pub use error::ParseError;

use cursor::Cursor;
use rill_ir::{Arena, Name, Program, Span, StringInterner, Token, TokenKind, TokenList};

/// Contextual keywords that lex as identifiers.
#[derive(Copy, Clone)]
struct ContextualNames {
    of: Name,
}

/// Recursive-descent parser.
///
/// Holds a cursor over the token stream and a mutable borrow of the arena
/// nodes are allocated into.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: &'a mut Arena,
    interner: &'a StringInterner,
    names: ContextualNames,
}

/// Parse a full program into a fresh arena.
pub fn parse(
    tokens: &TokenList,
    interner: &StringInterner,
) -> Result<(Arena, Program), ParseError> {
    let mut arena = Arena::new();
    let program = parse_into(&mut arena, tokens, interner)?;
    Ok((arena, program))
}

/// Parse a full program into an existing arena.
pub fn parse_into(
    arena: &mut Arena,
    tokens: &TokenList,
    interner: &StringInterner,
) -> Result<Program, ParseError> {
    let mut parser = Parser::new(tokens, arena, interner);
    parser.parse_program()
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a TokenList, arena: &'a mut Arena, interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena,
            interner,
            names: ContextualNames {
                of: interner.intern("of"),
            },
        }
    }

    // Cursor passthroughs used throughout the grammar modules.

    #[inline]
    fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    fn eat(&mut self, kind: &TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    #[inline]
    fn advance(&mut self) -> Token {
        self.cursor.advance()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    /// Consume a token of the given kind or fail with its description.
    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(ParseError::unexpected(kind.describe(), self.cursor.current()))
    }

    /// Consume an identifier token, returning its name.
    fn expect_ident(&mut self) -> Result<(Name, Span), ParseError> {
        if let TokenKind::Ident(name) = *self.cursor.current_kind() {
            let span = self.cursor.current_span();
            self.advance();
            return Ok((name, span));
        }
        Err(ParseError::unexpected(
            "an identifier",
            self.cursor.current(),
        ))
    }

    /// Consume a statement terminator.
    ///
    /// A `;` is consumed when present; a following `}` or end of input is
    /// accepted without one. Anything else is an error (no general ASI).
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        if self.eat(&TokenKind::Semi) {
            return Ok(());
        }
        if self.check(&TokenKind::RBrace) || self.cursor.at_eof() {
            return Ok(());
        }
        Err(ParseError::unexpected("`;`", self.cursor.current()))
    }

    fn unexpected<T>(&self, expected: &str) -> Result<T, ParseError> {
        Err(ParseError::unexpected(expected, self.cursor.current()))
    }
}

#[cfg(test)]
mod tests;
