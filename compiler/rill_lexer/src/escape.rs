//! Escape sequence cooking for string and template bodies.

use crate::lex_error::LexErrorKind;

/// Cook the escapes in a string/template body (the text between quotes).
///
/// Unknown single-character escapes resolve to the character itself, the way
/// JavaScript treats them. Malformed `\u`/`\x` escapes are errors.
pub fn cook_string_body(raw: &str) -> Result<String, LexErrorKind> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => return Err(LexErrorKind::InvalidEscape),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            // Escaped line break is a line continuation.
            Some('\n') => {}
            Some('x') => {
                let hi = chars.next().ok_or(LexErrorKind::InvalidEscape)?;
                let lo = chars.next().ok_or(LexErrorKind::InvalidEscape)?;
                let code = hex_pair(hi, lo)?;
                out.push(char::from(code));
            }
            Some('u') => {
                let c = cook_unicode(&mut chars)?;
                out.push(c);
            }
            // \\, \', \", \`, \$ and anything else: the character itself.
            Some(other) => out.push(other),
        }
    }
    Ok(out)
}

fn hex_pair(hi: char, lo: char) -> Result<u8, LexErrorKind> {
    let hi = hi.to_digit(16).ok_or(LexErrorKind::InvalidEscape)?;
    let lo = lo.to_digit(16).ok_or(LexErrorKind::InvalidEscape)?;
    #[allow(clippy::cast_possible_truncation)]
    Ok((hi * 16 + lo) as u8)
}

/// Cook `\uXXXX` or `\u{...}` after the `u` has been consumed.
fn cook_unicode(chars: &mut std::str::Chars<'_>) -> Result<char, LexErrorKind> {
    let mut clone = chars.clone();
    let code = if clone.next() == Some('{') {
        *chars = clone;
        let mut code = 0u32;
        let mut any = false;
        loop {
            match chars.next() {
                Some('}') if any => break,
                Some(c) => {
                    let digit = c.to_digit(16).ok_or(LexErrorKind::InvalidEscape)?;
                    code = code
                        .checked_mul(16)
                        .and_then(|c| c.checked_add(digit))
                        .ok_or(LexErrorKind::InvalidEscape)?;
                    any = true;
                }
                None => return Err(LexErrorKind::InvalidEscape),
            }
        }
        code
    } else {
        let mut code = 0u32;
        for _ in 0..4 {
            let c = chars.next().ok_or(LexErrorKind::InvalidEscape)?;
            let digit = c.to_digit(16).ok_or(LexErrorKind::InvalidEscape)?;
            code = code * 16 + digit;
        }
        code
    };
    char::from_u32(code).ok_or(LexErrorKind::InvalidEscape)
}
