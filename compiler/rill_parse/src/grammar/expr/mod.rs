//! Expression parsing.
//!
//! One method per precedence level:
//! assignment (right-assoc) → ternary → `||` → `&&` → equality →
//! relational → additive → multiplicative → `**` (right-assoc) → unary →
//! postfix update → call/member → primary.

mod postfix;
mod primary;

use crate::stack::ensure_sufficient_stack;
use crate::{ParseError, Parser};
use rill_ir::{
    AssignOp, BinaryOp, Expr, ExprId, ExprKind, FunctionBody, FunctionDef, FunctionKind,
    LogicalOp, Param, TokenKind, UnaryOp, UpdateOp,
};

impl Parser<'_> {
    /// Parse an expression (assignment level; the comma operator is not in
    /// the subset, so commas always separate).
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    fn parse_assignment(&mut self) -> Result<ExprId, ParseError> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }

        let left = self.parse_conditional()?;

        let op = match self.cursor.current_kind() {
            TokenKind::Eq => Some(AssignOp::Assign),
            TokenKind::PlusEq => Some(AssignOp::Add),
            TokenKind::MinusEq => Some(AssignOp::Sub),
            TokenKind::StarEq => Some(AssignOp::Mul),
            TokenKind::SlashEq => Some(AssignOp::Div),
            TokenKind::PercentEq => Some(AssignOp::Rem),
            TokenKind::StarStarEq => Some(AssignOp::Pow),
            _ => None,
        };
        let Some(op) = op else { return Ok(left) };

        self.check_assign_target(left)?;
        self.advance();
        let value = self.parse_assignment()?;
        let span = self.arena.expr(left).span.merge(self.arena.expr(value).span);
        Ok(self.arena.alloc_expr(Expr::new(
            ExprKind::Assign {
                op,
                target: left,
                value,
            },
            span,
        )))
    }

    /// Reject assignment/update targets that are not a name or member slot.
    fn check_assign_target(&self, target: ExprId) -> Result<(), ParseError> {
        let expr = self.arena.expr(target);
        match expr.kind {
            ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. } => Ok(()),
            _ => Err(ParseError::message("invalid assignment target", expr.span)),
        }
    }

    /// Detect and parse arrow functions ahead of the precedence chain.
    ///
    /// `x => ...` needs one token of lookahead; `(...) => ...` is parsed
    /// speculatively with cursor rollback when the parenthesized run turns
    /// out to be an ordinary expression.
    fn try_parse_arrow(&mut self) -> Result<Option<ExprId>, ParseError> {
        match (self.cursor.current_kind(), self.cursor.peek_kind(1)) {
            (TokenKind::Ident(_), TokenKind::Arrow) => {
                self.parse_single_param_arrow(false).map(Some)
            }
            (TokenKind::Async, TokenKind::Ident(_))
                if matches!(self.cursor.peek_kind(2), TokenKind::Arrow) =>
            {
                self.advance();
                self.parse_single_param_arrow(true).map(Some)
            }
            (TokenKind::LParen, _) => self.try_parse_paren_arrow(false),
            (TokenKind::Async, TokenKind::LParen) => {
                let snapshot = self.cursor.position();
                self.advance();
                match self.try_parse_paren_arrow(true)? {
                    Some(expr) => Ok(Some(expr)),
                    None => {
                        self.cursor.set_position(snapshot);
                        Ok(None)
                    }
                }
            }
            _ => Ok(None),
        }
    }

    fn parse_single_param_arrow(&mut self, is_async: bool) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let (name, span) = self.expect_ident()?;
        let pattern = self
            .arena
            .alloc_pattern(rill_ir::Pattern::new(rill_ir::PatternKind::Ident(name), span));
        let params = self.arena.alloc_params(&[Param {
            pattern,
            rest: false,
        }]);
        self.expect(&TokenKind::Arrow)?;
        self.finish_arrow(start, is_async, params)
    }

    fn try_parse_paren_arrow(&mut self, is_async: bool) -> Result<Option<ExprId>, ParseError> {
        let snapshot = self.cursor.position();
        let start = self.current_span();
        self.advance(); // `(`

        // Speculative: a failed parameter list or a missing `=>` means this
        // was a parenthesized expression all along.
        let params = match self.parse_params() {
            Ok(params) => params,
            Err(_) => {
                self.cursor.set_position(snapshot);
                return Ok(None);
            }
        };
        if !self.eat(&TokenKind::Arrow) {
            self.cursor.set_position(snapshot);
            return Ok(None);
        }
        self.finish_arrow(start, is_async, params).map(Some)
    }

    fn finish_arrow(
        &mut self,
        start: rill_ir::Span,
        is_async: bool,
        params: rill_ir::ParamRange,
    ) -> Result<ExprId, ParseError> {
        let body = if self.check(&TokenKind::LBrace) {
            FunctionBody::Block(self.parse_braced_stmts()?)
        } else {
            FunctionBody::Expr(self.parse_expr()?)
        };
        let span = start.merge(self.cursor.previous_span());
        let func = self.arena.alloc_func(FunctionDef {
            kind: FunctionKind::Arrow,
            is_async,
            name: rill_ir::Name::EMPTY,
            params,
            body,
            span,
        });
        Ok(self.arena.alloc_expr(Expr::new(ExprKind::Function(func), span)))
    }

    fn parse_conditional(&mut self) -> Result<ExprId, ParseError> {
        let cond = self.parse_logical_or()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        let consequent = self.parse_assignment()?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = self
            .arena
            .expr(cond)
            .span
            .merge(self.arena.expr(alternate).span);
        Ok(self.arena.alloc_expr(Expr::new(
            ExprKind::Conditional {
                cond,
                consequent,
                alternate,
            },
            span,
        )))
    }

    fn parse_logical_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_logical_and()?;
        while self.eat(&TokenKind::PipePipe) {
            let right = self.parse_logical_and()?;
            left = self.alloc_logical(LogicalOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            left = self.alloc_logical(LogicalOp::And, left, right);
        }
        Ok(left)
    }

    fn alloc_logical(&mut self, op: LogicalOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.arena.expr(left).span.merge(self.arena.expr(right).span);
        self.arena
            .alloc_expr(Expr::new(ExprKind::Logical { op, left, right }, span))
    }

    fn alloc_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.arena.expr(left).span.merge(self.arena.expr(right).span);
        self.arena
            .alloc_expr(Expr::new(ExprKind::Binary { op, left, right }, span))
    }

    fn parse_equality(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::EqEq => BinaryOp::EqLoose,
                TokenKind::BangEq => BinaryOp::NeLoose,
                TokenKind::EqEqEq => BinaryOp::EqStrict,
                TokenKind::BangEqEq => BinaryOp::NeStrict,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = self.alloc_binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Ge => BinaryOp::Ge,
                TokenKind::In => BinaryOp::In,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = self.alloc_binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.alloc_binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_exponent()?;
        loop {
            let op = match self.cursor.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.parse_exponent()?;
            left = self.alloc_binary(op, left, right);
        }
        Ok(left)
    }

    /// `**` binds tighter than `*`/`/` and is right-associative.
    fn parse_exponent(&mut self) -> Result<ExprId, ParseError> {
        let base = self.parse_unary()?;
        if self.eat(&TokenKind::StarStar) {
            let exponent = self.parse_exponent()?;
            return Ok(self.alloc_binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let op = match self.cursor.current_kind() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Typeof => Some(UnaryOp::TypeOf),
            TokenKind::Await => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(self.arena.expr(operand).span);
                return Ok(self.arena.alloc_expr(Expr::new(ExprKind::Await(operand), span)));
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.check(&TokenKind::PlusPlus) {
                    UpdateOp::Inc
                } else {
                    UpdateOp::Dec
                };
                self.advance();
                let target = self.parse_unary()?;
                self.check_assign_target(target)?;
                let span = start.merge(self.arena.expr(target).span);
                return Ok(self.arena.alloc_expr(Expr::new(
                    ExprKind::Update {
                        op,
                        prefix: true,
                        target,
                    },
                    span,
                )));
            }
            _ => None,
        };

        let Some(op) = op else {
            return self.parse_postfix_update();
        };

        // Fold negated number literals so `-0.5` is a single node.
        if op == UnaryOp::Neg {
            if let TokenKind::Number(n) = *self.cursor.peek_kind(1) {
                self.advance();
                let lit_span = self.current_span();
                self.advance();
                let span = start.merge(lit_span);
                return Ok(self.arena.alloc_expr(Expr::new(ExprKind::Number(-n), span)));
            }
        }

        self.advance();
        let operand = self.parse_unary()?;
        let span = start.merge(self.arena.expr(operand).span);
        Ok(self
            .arena
            .alloc_expr(Expr::new(ExprKind::Unary { op, operand }, span)))
    }

    fn parse_postfix_update(&mut self) -> Result<ExprId, ParseError> {
        let expr = self.parse_call_member()?;
        let op = match self.cursor.current_kind() {
            TokenKind::PlusPlus => Some(UpdateOp::Inc),
            TokenKind::MinusMinus => Some(UpdateOp::Dec),
            _ => None,
        };
        if let Some(op) = op {
            self.check_assign_target(expr)?;
            let end = self.current_span();
            self.advance();
            let span = self.arena.expr(expr).span.merge(end);
            return Ok(self.arena.alloc_expr(Expr::new(
                ExprKind::Update {
                    op,
                    prefix: false,
                    target: expr,
                },
                span,
            )));
        }
        Ok(expr)
    }
}
