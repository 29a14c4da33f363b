//! Token cursor for navigating the token stream.

use rill_ir::{Span, Token, TokenKind, TokenList};

/// Cursor over a token list.
///
/// Provides access, lookahead, and consumption. The position can be saved
/// and restored for speculative parsing (arrow-function parameter lists).
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of the token stream.
    ///
    /// The token list always ends with `Eof`, so `current` is always valid.
    pub fn new(tokens: &'a TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    /// Current position, for snapshot/restore.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Restore a previously saved position.
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos < self.tokens.len());
        self.pos = pos;
    }

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        // The last token is Eof and advance() refuses to move past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Get the current token's kind.
    #[inline]
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Get the previous token's span (DUMMY at the start).
    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    /// Peek `n` tokens ahead without consuming (0 = current).
    #[inline]
    pub fn peek_kind(&self, n: usize) -> &TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    /// Check the current token against an expected kind.
    ///
    /// Payload-carrying kinds (numbers, strings, identifiers) should be
    /// matched with `matches!` on `current_kind` instead.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consume and return the current token.
    #[inline]
    pub fn advance(&mut self) -> Token {
        let token = *self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches.
    #[inline]
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// True at the trailing `Eof` token.
    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }
}
