//! Primary expressions: literals, identifiers, array/object literals,
//! function expressions.

use crate::{ParseError, Parser};
use rill_ir::{
    Element, Expr, ExprId, ExprKind, FuncId, FunctionBody, FunctionDef, FunctionKind, Name,
    Property, TokenKind,
};

impl Parser<'_> {
    pub(crate) fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let span = self.current_span();
        let kind = match *self.cursor.current_kind() {
            TokenKind::Number(n) => {
                self.advance();
                ExprKind::Number(n)
            }
            TokenKind::BigInt(v) => {
                self.advance();
                ExprKind::BigInt(v)
            }
            TokenKind::Str(name) => {
                self.advance();
                ExprKind::Str(name)
            }
            TokenKind::Template(raw) => {
                self.advance();
                return self.parse_template_literal(raw, span);
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::This => {
                self.advance();
                ExprKind::This
            }
            TokenKind::Ident(name) => {
                self.advance();
                ExprKind::Ident(name)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => return self.parse_array_literal(),
            TokenKind::LBrace => return self.parse_object_literal(),
            TokenKind::Function => {
                let func = self.parse_function_def(FunctionKind::Expression, false)?;
                ExprKind::Function(func)
            }
            TokenKind::Async if matches!(self.cursor.peek_kind(1), TokenKind::Function) => {
                self.advance();
                let func = self.parse_function_def(FunctionKind::Expression, true)?;
                ExprKind::Function(func)
            }
            _ => return self.unexpected("an expression"),
        };
        let span = span.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_expr(Expr::new(kind, span)))
    }

    fn parse_array_literal(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::LBracket)?;
        let mut elems: Vec<Element> = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            let spread = self.eat(&TokenKind::DotDotDot);
            let expr = self.parse_expr()?;
            elems.push(Element { expr, spread });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RBracket)?.span;
        let elems = self.arena.alloc_elems(&elems);
        Ok(self
            .arena
            .alloc_expr(Expr::new(ExprKind::Array(elems), start.merge(end))))
    }

    /// Object literals. Shorthand (`{ name }`) and method shorthand
    /// (`{ greet() {...} }`) desugar to plain key/value properties.
    fn parse_object_literal(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;
        let mut props: Vec<Property> = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let key_span = self.current_span();
            let key = match self.cursor.current_kind() {
                TokenKind::Ident(name) | TokenKind::Str(name) => {
                    let name = *name;
                    self.advance();
                    name
                }
                _ => return self.unexpected("a property name"),
            };

            let value = if self.eat(&TokenKind::Colon) {
                self.parse_expr()?
            } else if self.check(&TokenKind::LParen) {
                // Method shorthand.
                self.expect(&TokenKind::LParen)?;
                let params = self.parse_params()?;
                let body = FunctionBody::Block(self.parse_braced_stmts()?);
                let span = key_span.merge(self.cursor.previous_span());
                let func = self.arena.alloc_func(FunctionDef {
                    kind: FunctionKind::Expression,
                    is_async: false,
                    name: key,
                    params,
                    body,
                    span,
                });
                self.arena
                    .alloc_expr(Expr::new(ExprKind::Function(func), span))
            } else {
                // Shorthand property.
                self.arena
                    .alloc_expr(Expr::new(ExprKind::Ident(key), key_span))
            };
            props.push(Property { key, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RBrace)?.span;
        let props = self.arena.alloc_props(&props);
        Ok(self
            .arena
            .alloc_expr(Expr::new(ExprKind::Object(props), start.merge(end))))
    }

    /// Parse `function [name](params) { body }`.
    ///
    /// Declarations require a name; expressions may omit it.
    pub(crate) fn parse_function_def(
        &mut self,
        kind: FunctionKind,
        is_async: bool,
    ) -> Result<FuncId, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::Function)?;
        let name = if let TokenKind::Ident(name) = *self.cursor.current_kind() {
            self.advance();
            name
        } else if kind == FunctionKind::Declaration {
            return self.unexpected("a function name");
        } else {
            Name::EMPTY
        };
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_params()?;
        let body = FunctionBody::Block(self.parse_braced_stmts()?);
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_func(FunctionDef {
            kind,
            is_async,
            name,
            params,
            body,
            span,
        }))
    }
}
