//! Per-phase problem taxonomy.
//!
//! Lex and parse problems abort their phase entirely; eval problems are
//! whatever escaped every `try` on the way out. Each renders with source
//! context (line, column, caret underline) for the CLI.

mod render;

pub use render::render_with_source;

use rill_eval::EvalError;
use rill_lexer::LexError;
use rill_parse::ParseError;

/// Anything that can stop a run, tagged by phase.
#[derive(Debug, thiserror::Error)]
pub enum Problem {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Eval(#[from] EvalError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Problem {
    /// The span the problem points at, if it carries one.
    pub fn span(&self) -> Option<rill_ir::Span> {
        match self {
            Problem::Lex(e) => Some(e.span),
            Problem::Parse(e) => Some(e.span),
            Problem::Eval(e) => e.span,
            Problem::Io(_) => None,
        }
    }
}
