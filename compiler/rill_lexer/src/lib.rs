//! rill lexer.
//!
//! Two-phase lexing: a logos recognizer produces raw tokens, then a convert
//! pass cooks escapes, parses numeric payloads, and interns strings into
//! [`TokenKind`]s. A fresh call to [`tokenize`] re-scans from the start.
//!
//! Template literals are deliberately kept raw: the whole `` `...` `` run is
//! one [`TokenKind::Template`] token whose `${...}` spans the parser re-lexes
//! recursively (see `rill_parse`).

mod escape;
mod lex_error;
mod raw_token;

pub use escape::cook_string_body;
pub use lex_error::{LexError, LexErrorKind};

use logos::Logos;
use rill_ir::{Span, StringInterner, Token, TokenKind, TokenList};

use raw_token::RawToken;

/// Tokenize a source string.
///
/// The returned list always ends with an `Eof` token. Fails on the first
/// unrecognized character, unterminated string/template/comment, or
/// malformed literal, carrying the offending span.
pub fn tokenize(source: &str, interner: &StringInterner) -> Result<TokenList, LexError> {
    let mut tokens = TokenList::new();
    let mut lexer = RawToken::lexer(source);
    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        match result {
            Ok(raw) => {
                let kind = convert(raw, lexer.slice(), span, interner)?;
                tokens.push(Token::new(kind, span));
            }
            Err(kind) => return Err(LexError::new(kind, span)),
        }
    }
    let end = Span::from_range(source.len()..source.len());
    tokens.push(Token::new(TokenKind::Eof, end));
    Ok(tokens)
}

/// Convert a raw token to a final `TokenKind`, cooking and interning payloads.
fn convert(
    raw: RawToken,
    slice: &str,
    span: Span,
    interner: &StringInterner,
) -> Result<TokenKind, LexError> {
    let kind = match raw {
        RawToken::Number => {
            let value: f64 = slice
                .parse()
                .map_err(|_| LexError::new(LexErrorKind::InvalidNumber, span))?;
            TokenKind::Number(value)
        }
        RawToken::BigInt => {
            let digits = &slice[..slice.len() - 1];
            let value: i64 = digits
                .parse()
                .map_err(|_| LexError::new(LexErrorKind::InvalidNumber, span))?;
            TokenKind::BigInt(value)
        }
        RawToken::SingleString | RawToken::DoubleString => {
            let body = &slice[1..slice.len() - 1];
            let cooked = cook_string_body(body).map_err(|kind| LexError::new(kind, span))?;
            TokenKind::Str(interner.intern_owned(cooked))
        }
        RawToken::Template => {
            // Raw body, escapes intact; the parser cooks text segments after
            // splitting out `${...}` interpolations.
            let body = &slice[1..slice.len() - 1];
            TokenKind::Template(interner.intern(body))
        }
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        // This arm is unreachable: the callback either skips or errors.
        RawToken::BlockComment => TokenKind::Eof,

        RawToken::Var => TokenKind::Var,
        RawToken::Let => TokenKind::Let,
        RawToken::Const => TokenKind::Const,
        RawToken::Function => TokenKind::Function,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::For => TokenKind::For,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Switch => TokenKind::Switch,
        RawToken::Case => TokenKind::Case,
        RawToken::Default => TokenKind::Default,
        RawToken::Try => TokenKind::Try,
        RawToken::Catch => TokenKind::Catch,
        RawToken::Finally => TokenKind::Finally,
        RawToken::Throw => TokenKind::Throw,
        RawToken::New => TokenKind::New,
        RawToken::Typeof => TokenKind::Typeof,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::This => TokenKind::This,
        RawToken::In => TokenKind::In,
        RawToken::Async => TokenKind::Async,
        RawToken::Await => TokenKind::Await,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::DotDotDot => TokenKind::DotDotDot,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,
        RawToken::Arrow => TokenKind::Arrow,

        RawToken::Eq => TokenKind::Eq,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::StarStarEq => TokenKind::StarStarEq,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::EqEqEq => TokenKind::EqEqEq,
        RawToken::BangEq => TokenKind::BangEq,
        RawToken::BangEqEq => TokenKind::BangEqEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Le => TokenKind::Le,
        RawToken::Ge => TokenKind::Ge,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::StarStar => TokenKind::StarStar,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::Bang => TokenKind::Bang,
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let interner = StringInterner::new();
        tokenize(source, &interner)
            .map(|list| list.iter().map(|t| t.kind).collect())
            .unwrap_or_else(|e| panic!("lex failed: {e}"))
    }

    #[test]
    fn lexes_a_declaration() {
        let interner = StringInterner::new();
        let tokens = tokenize("let sum = 10 + 5;", &interner).map_err(|e| e.to_string());
        let Ok(tokens) = tokens else {
            panic!("lex failed");
        };
        assert_eq!(tokens.len(), 8);
        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[1].kind, TokenKind::Ident(interner.intern("sum")));
        assert_eq!(tokens[2].kind, TokenKind::Eq);
        assert_eq!(tokens[3].kind, TokenKind::Number(10.0));
        assert_eq!(tokens[4].kind, TokenKind::Plus);
        assert_eq!(tokens[5].kind, TokenKind::Number(5.0));
        assert_eq!(tokens[6].kind, TokenKind::Semi);
        assert_eq!(tokens[7].kind, TokenKind::Eof);
    }

    #[test]
    fn skips_both_comment_forms() {
        assert_eq!(
            kinds("// line\n1 /* block\n spanning */ + 2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Plus,
                TokenKind::Number(2.0),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn number_forms() {
        assert_eq!(
            kinds("123e5 123e-5 0.001 .5 3.14"),
            vec![
                TokenKind::Number(123e5),
                TokenKind::Number(123e-5),
                TokenKind::Number(0.001),
                TokenKind::Number(0.5),
                TokenKind::Number(3.14),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn bigint_suffix() {
        assert_eq!(
            kinds("9007199254740991n"),
            vec![TokenKind::BigInt(9_007_199_254_740_991), TokenKind::Eof]
        );
    }

    #[test]
    fn strings_cook_escapes() {
        let interner = StringInterner::new();
        let tokens = tokenize(r#" "It's \"quoted\"" 'single' "#, &interner)
            .unwrap_or_else(|e| panic!("lex failed: {e}"));
        assert_eq!(
            tokens[0].kind,
            TokenKind::Str(interner.intern("It's \"quoted\""))
        );
        assert_eq!(tokens[1].kind, TokenKind::Str(interner.intern("single")));
    }

    #[test]
    fn template_stays_raw() {
        let interner = StringInterner::new();
        let tokens = tokenize(r"`a\n${x}`", &interner).unwrap_or_else(|e| panic!("lex: {e}"));
        assert_eq!(
            tokens[0].kind,
            TokenKind::Template(interner.intern(r"a\n${x}"))
        );
    }

    #[test]
    fn multi_char_operators_win() {
        let interner = StringInterner::new();
        let tokens = tokenize("a === b !== c ** d => e", &interner)
            .unwrap_or_else(|e| panic!("lex: {e}"));
        let ops: Vec<TokenKind> = tokens
            .iter()
            .map(|t| t.kind)
            .filter(|k| !matches!(k, TokenKind::Ident(_)))
            .collect();
        assert_eq!(
            ops,
            vec![
                TokenKind::EqEqEq,
                TokenKind::BangEqEq,
                TokenKind::StarStar,
                TokenKind::Arrow,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn keywords_vs_identifiers() {
        let interner = StringInterner::new();
        let tokens =
            tokenize("let letter of offset", &interner).unwrap_or_else(|e| panic!("lex: {e}"));
        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[1].kind, TokenKind::Ident(interner.intern("letter")));
        // `of` is contextual and lexes as an identifier.
        assert_eq!(tokens[2].kind, TokenKind::Ident(interner.intern("of")));
        assert_eq!(tokens[3].kind, TokenKind::Ident(interner.intern("offset")));
    }

    #[test]
    fn unterminated_string_reports_position() {
        let interner = StringInterner::new();
        let err = tokenize("let s = 'oops", &interner);
        assert_eq!(
            err.map(|_| ()).map_err(|e| e.kind),
            Err(LexErrorKind::UnterminatedString)
        );
    }

    #[test]
    fn unterminated_template_and_comment() {
        let interner = StringInterner::new();
        let t = tokenize("`abc", &interner);
        assert_eq!(
            t.map(|_| ()).map_err(|e| e.kind),
            Err(LexErrorKind::UnterminatedTemplate)
        );
        let c = tokenize("/* abc", &interner);
        assert_eq!(
            c.map(|_| ()).map_err(|e| e.kind),
            Err(LexErrorKind::UnterminatedBlockComment)
        );
    }

    #[test]
    fn unexpected_character() {
        let interner = StringInterner::new();
        let err = tokenize("let x = #;", &interner);
        assert_eq!(
            err.map(|_| ()).map_err(|e| e.kind),
            Err(LexErrorKind::UnexpectedChar)
        );
    }
}
