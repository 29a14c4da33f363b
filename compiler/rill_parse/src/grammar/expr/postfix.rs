//! Call, member, index, and `new` expressions.

use crate::{ParseError, Parser};
use rill_ir::{ElemRange, Element, Expr, ExprId, ExprKind, Name, TokenKind};

impl Parser<'_> {
    /// Parse a primary expression followed by any chain of calls, member
    /// accesses, and index accesses.
    pub(crate) fn parse_call_member(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let (property, prop_span) = self.parse_property_name()?;
                    let span = self.arena.expr(expr).span.merge(prop_span);
                    expr = self.arena.alloc_expr(Expr::new(
                        ExprKind::Member {
                            object: expr,
                            property,
                        },
                        span,
                    ));
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let end = self.expect(&TokenKind::RBracket)?.span;
                    let span = self.arena.expr(expr).span.merge(end);
                    expr = self.arena.alloc_expr(Expr::new(
                        ExprKind::Index {
                            object: expr,
                            index,
                        },
                        span,
                    ));
                }
                TokenKind::LParen => {
                    let args = self.parse_args()?;
                    let span = self.arena.expr(expr).span.merge(self.cursor.previous_span());
                    expr = self
                        .arena
                        .alloc_expr(Expr::new(ExprKind::Call { callee: expr, args }, span));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// `new Callee(args)`. The callee may be a member chain but not a call,
    /// so `new ns.Person("x")` constructs `ns.Person`.
    fn parse_new(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.expect(&TokenKind::New)?;

        let mut callee = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let (property, prop_span) = self.parse_property_name()?;
                    let span = self.arena.expr(callee).span.merge(prop_span);
                    callee = self.arena.alloc_expr(Expr::new(
                        ExprKind::Member {
                            object: callee,
                            property,
                        },
                        span,
                    ));
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let end = self.expect(&TokenKind::RBracket)?.span;
                    let span = self.arena.expr(callee).span.merge(end);
                    callee = self.arena.alloc_expr(Expr::new(
                        ExprKind::Index {
                            object: callee,
                            index,
                        },
                        span,
                    ));
                }
                _ => break,
            }
        }

        let args = if self.check(&TokenKind::LParen) {
            self.parse_args()?
        } else {
            ElemRange::EMPTY
        };
        let span = start.merge(self.cursor.previous_span());
        Ok(self
            .arena
            .alloc_expr(Expr::new(ExprKind::New { callee, args }, span)))
    }

    /// Parse `( arg, ...spread, ... )` into an element range.
    pub(crate) fn parse_args(&mut self) -> Result<ElemRange, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut elems: Vec<Element> = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let spread = self.eat(&TokenKind::DotDotDot);
            let expr = self.parse_expr()?;
            elems.push(Element { expr, spread });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(self.arena.alloc_elems(&elems))
    }

    /// Property names after `.` — identifiers, plus keywords that are valid
    /// member names in this position (`promise.catch`, `promise.finally`).
    fn parse_property_name(&mut self) -> Result<(Name, rill_ir::Span), ParseError> {
        let span = self.current_span();
        let text = match self.cursor.current_kind() {
            TokenKind::Ident(name) => {
                let name = *name;
                self.advance();
                return Ok((name, span));
            }
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Default => "default",
            TokenKind::New => "new",
            TokenKind::In => "in",
            TokenKind::Do => "do",
            TokenKind::Case => "case",
            TokenKind::Try => "try",
            TokenKind::Throw => "throw",
            TokenKind::Typeof => "typeof",
            _ => return self.unexpected("a property name"),
        };
        self.advance();
        Ok((self.interner.intern(text), span))
    }
}
