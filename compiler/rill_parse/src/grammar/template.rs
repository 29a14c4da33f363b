//! Template literal parsing.
//!
//! The lexer hands templates over as a single raw token. This module splits
//! the body on `${...}` spans (escape-, quote-, and brace-aware), cooks the
//! text segments, and re-lexes each interpolation with a fresh sub-lexer and
//! sub-parser into the same arena. Sub-token spans are shifted back into
//! whole-source coordinates so downstream diagnostics stay accurate.

use crate::cursor::Cursor;
use crate::{ParseError, Parser};
use rill_ir::{Expr, ExprId, ExprKind, Name, Span, TemplatePart, Token, TokenList};

impl Parser<'_> {
    /// Parse a raw template body into `TemplateFull` or `Template` nodes.
    ///
    /// `token_span` covers the whole literal including the backticks, so the
    /// body starts at `token_span.start + 1`.
    pub(crate) fn parse_template_literal(
        &mut self,
        raw: Name,
        token_span: Span,
    ) -> Result<ExprId, ParseError> {
        let body = self.interner.resolve(raw);
        let bytes = body.as_bytes();

        let mut texts: Vec<String> = Vec::new();
        let mut exprs: Vec<ExprId> = Vec::new();
        let mut seg_start = 0usize;
        let mut i = 0usize;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    texts.push(self.cook_segment(&body[seg_start..i], token_span)?);
                    let inner_start = i + 2;
                    let inner_end = find_interpolation_end(bytes, inner_start)
                        .ok_or_else(|| {
                            ParseError::message(
                                "unterminated template interpolation",
                                token_span,
                            )
                        })?;
                    let offset = token_span.start + 1 + u32::try_from(inner_start).unwrap_or(0);
                    let expr =
                        self.parse_interpolation(&body[inner_start..inner_end], offset)?;
                    exprs.push(expr);
                    i = inner_end + 1;
                    seg_start = i;
                }
                _ => i += 1,
            }
        }
        texts.push(self.cook_segment(&body[seg_start..], token_span)?);

        if exprs.is_empty() {
            let full = self.interner.intern_owned(texts.pop().unwrap_or_default());
            return Ok(self
                .arena
                .alloc_expr(Expr::new(ExprKind::TemplateFull(full), token_span)));
        }

        let head = self.interner.intern_owned(texts.remove(0));
        let parts: Vec<TemplatePart> = exprs
            .into_iter()
            .zip(texts)
            .map(|(expr, text)| TemplatePart {
                expr,
                text_after: self.interner.intern_owned(text),
            })
            .collect();
        let parts = self.arena.alloc_parts(&parts);
        Ok(self
            .arena
            .alloc_expr(Expr::new(ExprKind::Template { head, parts }, token_span)))
    }

    fn cook_segment(&self, raw: &str, span: Span) -> Result<String, ParseError> {
        rill_lexer::cook_string_body(raw)
            .map_err(|kind| ParseError::message(kind.to_string(), span))
    }

    /// Lex and parse one interpolation source fragment.
    ///
    /// `base_offset` is the fragment's byte offset in the whole source; all
    /// sub-token spans are shifted by it.
    fn parse_interpolation(&mut self, src: &str, base_offset: u32) -> Result<ExprId, ParseError> {
        let lexed = rill_lexer::tokenize(src, self.interner).map_err(|e| {
            ParseError::message(
                format!("in template interpolation: {}", e.kind),
                e.span.offset_by(base_offset),
            )
        })?;

        let mut tokens = TokenList::new();
        for token in lexed.iter() {
            tokens.push(Token::new(token.kind, token.span.offset_by(base_offset)));
        }

        let mut sub = Parser {
            cursor: Cursor::new(&tokens),
            arena: &mut *self.arena,
            interner: self.interner,
            names: self.names,
        };
        let expr = sub.parse_expr()?;
        if !sub.cursor.at_eof() {
            return Err(ParseError::unexpected(
                "end of interpolation",
                sub.cursor.current(),
            ));
        }
        Ok(expr)
    }
}

/// Find the byte index of the `}` closing an interpolation that starts at
/// `start` (just past `${`).
///
/// Tracks brace depth and skips string literals so `${fn("}")}` closes in
/// the right place. Nested template literals inside interpolations are not
/// supported and report as unterminated.
fn find_interpolation_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'`' => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::find_interpolation_end;

    #[test]
    fn simple_close() {
        assert_eq!(find_interpolation_end(b"name}", 0), Some(4));
    }

    #[test]
    fn nested_braces() {
        let src = b"obj({a: 1})} tail";
        assert_eq!(find_interpolation_end(src, 0), Some(11));
    }

    #[test]
    fn brace_inside_string_is_skipped() {
        let src = br#"fn("}")} tail"#;
        assert_eq!(find_interpolation_end(src, 0), Some(7));
    }

    #[test]
    fn unterminated_returns_none() {
        assert_eq!(find_interpolation_end(b"a + b", 0), None);
    }
}
