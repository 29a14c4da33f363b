//! Statement grammar.

use crate::{ParseError, Parser};
use rill_ir::{
    CatchClause, CatchId, DeclKind, DeclRange, Declarator, ExprId, FunctionKind, PatternId, Stmt,
    StmtId, StmtKind, SwitchCase, TokenKind,
};

impl Parser<'_> {
    pub(crate) fn parse_stmt(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::LBrace => {
                let range = self.parse_braced_stmts()?;
                StmtKind::Block(range)
            }
            TokenKind::Var => self.parse_var_stmt(DeclKind::Var)?,
            TokenKind::Let => self.parse_var_stmt(DeclKind::Let)?,
            TokenKind::Const => self.parse_var_stmt(DeclKind::Const)?,
            TokenKind::Function => {
                let func = self.parse_function_def(FunctionKind::Declaration, false)?;
                StmtKind::FunctionDecl(func)
            }
            TokenKind::Async if matches!(self.cursor.peek_kind(1), TokenKind::Function) => {
                self.advance();
                let func = self.parse_function_def(FunctionKind::Declaration, true)?;
                StmtKind::FunctionDecl(func)
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semi)
                    || self.check(&TokenKind::RBrace)
                    || self.cursor.at_eof()
                {
                    ExprId::INVALID
                } else {
                    self.parse_expr()?
                };
                self.expect_semi()?;
                StmtKind::Return(value)
            }
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::While => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let body = self.parse_stmt()?;
                StmtKind::While { cond, body }
            }
            TokenKind::Do => {
                self.advance();
                let body = self.parse_stmt()?;
                self.expect(&TokenKind::While)?;
                self.expect(&TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                self.expect_semi()?;
                StmtKind::DoWhile { body, cond }
            }
            TokenKind::Break => {
                self.advance();
                self.expect_semi()?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.expect_semi()?;
                StmtKind::Continue
            }
            TokenKind::Switch => self.parse_switch_stmt()?,
            TokenKind::Throw => {
                self.advance();
                let value = self.parse_expr()?;
                self.expect_semi()?;
                StmtKind::Throw(value)
            }
            TokenKind::Try => self.parse_try_stmt()?,
            TokenKind::Semi => {
                self.advance();
                StmtKind::Empty
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect_semi()?;
                StmtKind::Expr(expr)
            }
        };
        let span = start.merge(self.cursor.previous_span());
        Ok(self.arena.alloc_stmt(Stmt::new(kind, span)))
    }

    fn parse_var_stmt(&mut self, kind: DeclKind) -> Result<StmtKind, ParseError> {
        self.advance();
        let decls = self.parse_var_declarators(kind)?;
        self.expect_semi()?;
        Ok(StmtKind::VarDecl { kind, decls })
    }

    /// Parse the declarator list after a `var`/`let`/`const` keyword.
    ///
    /// Does not consume the terminator, so `for`-headers can reuse it.
    fn parse_var_declarators(&mut self, kind: DeclKind) -> Result<DeclRange, ParseError> {
        let mut decls: Vec<Declarator> = Vec::new();
        loop {
            let pattern = self.parse_binding_pattern()?;
            let init = if self.eat(&TokenKind::Eq) {
                self.parse_expr()?
            } else {
                if kind == DeclKind::Const {
                    return Err(ParseError::message(
                        "missing initializer in const declaration",
                        self.current_span(),
                    ));
                }
                ExprId::INVALID
            };
            decls.push(Declarator { pattern, init });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(self.arena.alloc_decls(&decls))
    }

    fn parse_if_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let cons = self.parse_stmt()?;
        let alt = if self.eat(&TokenKind::Else) {
            self.parse_stmt()?
        } else {
            StmtId::INVALID
        };
        Ok(StmtKind::If { cond, cons, alt })
    }

    /// `for` statements: C-style, `for..in`, and `for..of`.
    fn parse_for_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        self.expect(&TokenKind::LParen)?;

        // Declared-binding headers may be any of the three forms.
        let decl_kind = match self.cursor.current_kind() {
            TokenKind::Var => Some(DeclKind::Var),
            TokenKind::Let => Some(DeclKind::Let),
            TokenKind::Const => Some(DeclKind::Const),
            _ => None,
        };

        if let Some(kind) = decl_kind {
            let kind_span = self.current_span();
            self.advance();
            let pattern = self.parse_binding_pattern()?;

            if self.eat(&TokenKind::In) {
                let object = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let body = self.parse_stmt()?;
                return Ok(StmtKind::ForIn {
                    kind,
                    pattern,
                    object,
                    body,
                });
            }
            if self.eat_contextual_of() {
                let iterable = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let body = self.parse_stmt()?;
                return Ok(StmtKind::ForOf {
                    kind,
                    pattern,
                    iterable,
                    body,
                });
            }

            // C-style: finish the declarator list as the init statement.
            let init = self.finish_for_init_decl(kind, kind_span, pattern)?;
            return self.parse_for_tail(init);
        }

        if self.eat(&TokenKind::Semi) {
            return self.parse_for_tail(StmtId::INVALID);
        }

        let start = self.current_span();
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::Semi)?;
        let span = start.merge(self.cursor.previous_span());
        let init = self.arena.alloc_stmt(Stmt::new(StmtKind::Expr(expr), span));
        self.parse_for_tail(init)
    }

    /// Finish a C-style `for` init that started with a declared pattern.
    fn finish_for_init_decl(
        &mut self,
        kind: DeclKind,
        start: rill_ir::Span,
        pattern: PatternId,
    ) -> Result<StmtId, ParseError> {
        let mut decls: Vec<Declarator> = Vec::new();
        let init = if self.eat(&TokenKind::Eq) {
            self.parse_expr()?
        } else {
            ExprId::INVALID
        };
        decls.push(Declarator { pattern, init });
        while self.eat(&TokenKind::Comma) {
            let pattern = self.parse_binding_pattern()?;
            let init = if self.eat(&TokenKind::Eq) {
                self.parse_expr()?
            } else {
                ExprId::INVALID
            };
            decls.push(Declarator { pattern, init });
        }
        self.expect(&TokenKind::Semi)?;
        let decls = self.arena.alloc_decls(&decls);
        let span = start.merge(self.cursor.previous_span());
        Ok(self
            .arena
            .alloc_stmt(Stmt::new(StmtKind::VarDecl { kind, decls }, span)))
    }

    /// Parse `test; update) body` after the init slot.
    fn parse_for_tail(&mut self, init: StmtId) -> Result<StmtKind, ParseError> {
        let test = if self.check(&TokenKind::Semi) {
            ExprId::INVALID
        } else {
            self.parse_expr()?
        };
        self.expect(&TokenKind::Semi)?;
        let update = if self.check(&TokenKind::RParen) {
            ExprId::INVALID
        } else {
            self.parse_expr()?
        };
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_stmt()?;
        Ok(StmtKind::For {
            init,
            test,
            update,
            body,
        })
    }

    /// Consume the contextual `of` keyword if present.
    fn eat_contextual_of(&mut self) -> bool {
        if let TokenKind::Ident(name) = *self.cursor.current_kind() {
            if name == self.names.of {
                self.advance();
                return true;
            }
        }
        false
    }

    fn parse_switch_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let disc = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;

        let mut cases: Vec<SwitchCase> = Vec::new();
        let mut seen_default = false;
        while !self.check(&TokenKind::RBrace) && !self.cursor.at_eof() {
            let test = if self.eat(&TokenKind::Case) {
                let test = self.parse_expr()?;
                self.expect(&TokenKind::Colon)?;
                test
            } else if self.check(&TokenKind::Default) {
                if seen_default {
                    return Err(ParseError::message(
                        "duplicate default clause in switch",
                        self.current_span(),
                    ));
                }
                seen_default = true;
                self.advance();
                self.expect(&TokenKind::Colon)?;
                ExprId::INVALID
            } else {
                return self.unexpected("`case` or `default`");
            };

            // Clause bodies run until the next clause; fall-through is the
            // evaluator's job, not the parser's.
            let mut body: Vec<StmtId> = Vec::new();
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.cursor.at_eof()
            {
                body.push(self.parse_stmt()?);
            }
            let body = self.arena.alloc_stmt_list(&body);
            cases.push(SwitchCase { test, body });
        }
        self.expect(&TokenKind::RBrace)?;
        let cases = self.arena.alloc_cases(&cases);
        Ok(StmtKind::Switch { disc, cases })
    }

    fn parse_try_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        let block = self.parse_braced_stmts()?;

        let handler = if self.eat(&TokenKind::Catch) {
            let param = if self.eat(&TokenKind::LParen) {
                let param = self.parse_binding_pattern()?;
                self.expect(&TokenKind::RParen)?;
                param
            } else {
                PatternId::INVALID
            };
            let body = self.parse_braced_stmts()?;
            self.arena.alloc_catch(CatchClause { param, body })
        } else {
            CatchId::INVALID
        };

        let (finalizer, has_finally) = if self.eat(&TokenKind::Finally) {
            (self.parse_braced_stmts()?, true)
        } else {
            (rill_ir::StmtRange::EMPTY, false)
        };

        if !handler.is_valid() && !has_finally {
            return self.unexpected("`catch` or `finally`");
        }

        Ok(StmtKind::Try {
            block,
            handler,
            finalizer,
            has_finally,
        })
    }
}
