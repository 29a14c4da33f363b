//! Grammar rules.
//!
//! # Module Structure
//!
//! - `stmt.rs`: statement grammar (declarations, control flow, try/catch)
//! - `expr/`: expression grammar (precedence chain, primaries, postfix)
//! - `pattern.rs`: binding patterns and parameter lists
//! - `template.rs`: template-literal splitting and interpolation re-lexing

mod expr;
mod pattern;
mod stmt;
mod template;

use crate::{ParseError, Parser};
use rill_ir::{Program, StmtId, TokenKind};

impl Parser<'_> {
    /// Parse the whole token stream as a program (root statement list).
    pub(crate) fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut stmts: Vec<StmtId> = Vec::new();
        while !self.cursor.at_eof() {
            stmts.push(self.parse_stmt()?);
        }
        let body = self.arena.alloc_stmt_list(&stmts);
        Ok(Program { body })
    }

    /// Parse `{ stmt* }`, returning the inner statement list.
    pub(crate) fn parse_braced_stmts(&mut self) -> Result<rill_ir::StmtRange, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts: Vec<StmtId> = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.cursor.at_eof() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(self.arena.alloc_stmt_list(&stmts))
    }
}
