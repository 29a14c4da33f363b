//! Raw logos token recognizer.
//!
//! Strings, templates, and block comments are scanned by callbacks over
//! `lex.remainder()` so that unterminated forms surface as typed errors
//! instead of generic unexpected-character failures.

use logos::{FilterResult, Lexer, Logos};

use crate::lex_error::LexErrorKind;

fn block_comment(lex: &mut Lexer<RawToken>) -> FilterResult<(), LexErrorKind> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(LexErrorKind::UnterminatedBlockComment)
        }
    }
}

/// Scan the remainder until an unescaped `quote` byte.
///
/// Byte-wise scanning is safe here: the terminator is ASCII, and skipping
/// two bytes after a backslash can only land inside a multi-byte character,
/// whose continuation bytes never match an ASCII quote.
fn scan_until(lex: &mut Lexer<RawToken>, quote: u8, allow_newline: bool) -> Option<()> {
    let rem = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rem.len() {
        match rem[i] {
            b'\\' => i += 2,
            b'\n' if !allow_newline => return None,
            b if b == quote => {
                lex.bump(i + 1);
                return Some(());
            }
            _ => i += 1,
        }
    }
    lex.bump(rem.len());
    None
}

fn single_string(lex: &mut Lexer<RawToken>) -> Result<(), LexErrorKind> {
    scan_until(lex, b'\'', false).ok_or(LexErrorKind::UnterminatedString)
}

fn double_string(lex: &mut Lexer<RawToken>) -> Result<(), LexErrorKind> {
    scan_until(lex, b'"', false).ok_or(LexErrorKind::UnterminatedString)
}

fn template(lex: &mut Lexer<RawToken>) -> Result<(), LexErrorKind> {
    scan_until(lex, b'`', true).ok_or(LexErrorKind::UnterminatedTemplate)
}

/// Raw token shapes before escape cooking and interning.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(error = LexErrorKind)]
pub(crate) enum RawToken {
    #[token("/*", block_comment)]
    BlockComment,

    // Literals. The bigint form is longer than the plain-number prefix, so
    // longest-match keeps `123n` out of the Number arm.
    #[regex(r"[0-9]+n")]
    BigInt,
    #[regex(r"(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")]
    Number,
    #[token("'", single_string)]
    SingleString,
    #[token("\"", double_string)]
    DoubleString,
    #[token("`", template)]
    Template,

    // Keywords
    #[token("var")]
    Var,
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("throw")]
    Throw,
    #[token("new")]
    New,
    #[token("typeof")]
    Typeof,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("this")]
    This,
    #[token("in")]
    In,
    #[token("async")]
    Async,
    #[token("await")]
    Await,

    // `of` and `undefined` are contextual and lex as identifiers.
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    DotDotDot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("=>")]
    Arrow,

    // Operators
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("**=")]
    StarStarEq,
    #[token("==")]
    EqEq,
    #[token("===")]
    EqEqEq,
    #[token("!=")]
    BangEq,
    #[token("!==")]
    BangEqEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("**")]
    StarStar,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,
}
