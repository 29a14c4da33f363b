//! Binding patterns and parameter lists.

use crate::{ParseError, Parser};
use rill_ir::{
    Param, ParamRange, Pattern, PatternId, PatternKind, PatternProp, TokenKind,
};

impl Parser<'_> {
    /// Parse a binding pattern: identifier, array, or object destructuring.
    pub(crate) fn parse_binding_pattern(&mut self) -> Result<PatternId, ParseError> {
        let start = self.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::Ident(name) => {
                let name = *name;
                self.advance();
                PatternKind::Ident(name)
            }
            TokenKind::LBracket => self.parse_array_pattern()?,
            TokenKind::LBrace => self.parse_object_pattern()?,
            _ => return self.unexpected("a binding pattern"),
        };
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_pattern(Pattern::new(kind, span)))
    }

    /// Parse a binding pattern with an optional `= default`.
    ///
    /// Used for parameters and destructuring elements; declarator
    /// initializers are not defaults and are handled by the caller.
    pub(crate) fn parse_pattern_with_default(&mut self) -> Result<PatternId, ParseError> {
        let id = self.parse_binding_pattern()?;
        if self.eat(&TokenKind::Eq) {
            let default = self.parse_expr()?;
            let updated = self.arena.pattern(id).with_default(default);
            // Re-allocate: arena nodes are immutable once placed.
            return Ok(self.arena.alloc_pattern(updated));
        }
        Ok(id)
    }

    fn parse_array_pattern(&mut self) -> Result<PatternKind, ParseError> {
        self.expect(&TokenKind::LBracket)?;
        let mut elements: Vec<PatternId> = Vec::new();
        let mut rest = PatternId::INVALID;
        while !self.check(&TokenKind::RBracket) {
            if self.eat(&TokenKind::DotDotDot) {
                rest = self.parse_binding_pattern()?;
                break;
            }
            elements.push(self.parse_pattern_with_default()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        let elements = self.arena.alloc_pattern_list(&elements);
        Ok(PatternKind::Array { elements, rest })
    }

    fn parse_object_pattern(&mut self) -> Result<PatternKind, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut props: Vec<PatternProp> = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let key = match self.cursor.current_kind() {
                TokenKind::Ident(name) | TokenKind::Str(name) => {
                    let name = *name;
                    self.advance();
                    name
                }
                _ => return self.unexpected("a property name"),
            };

            let binding = if self.eat(&TokenKind::Colon) {
                self.parse_pattern_with_default()?
            } else {
                // Shorthand `{ name }` or `{ name = default }`.
                let span = self.cursor.previous_span();
                let mut pattern = Pattern::new(PatternKind::Ident(key), span);
                if self.eat(&TokenKind::Eq) {
                    let default = self.parse_expr()?;
                    pattern = pattern.with_default(default);
                }
                self.arena.alloc_pattern(pattern)
            };
            props.push(PatternProp { key, binding });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let props = self.arena.alloc_pattern_props(&props);
        Ok(PatternKind::Object(props))
    }

    /// Parse a parenthesized parameter list (the `(` is already consumed).
    ///
    /// Rest parameters must come last; each parameter is a pattern with an
    /// optional default.
    pub(crate) fn parse_params(&mut self) -> Result<ParamRange, ParseError> {
        let mut params: Vec<Param> = Vec::new();
        while !self.check(&TokenKind::RParen) {
            if self.eat(&TokenKind::DotDotDot) {
                let pattern = self.parse_binding_pattern()?;
                params.push(Param { pattern, rest: true });
                break;
            }
            let pattern = self.parse_pattern_with_default()?;
            params.push(Param {
                pattern,
                rest: false,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(self.arena.alloc_params(&params))
    }
}
