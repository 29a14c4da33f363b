//! Source-context rendering for problems.

use rill_ir::line_col;

use super::Problem;

/// Render a problem with a source excerpt and caret underline:
///
/// ```text
/// error: ReferenceError: x is not defined
///   --> line 3, column 13
///    |
///  3 | console.log(x);
///    |             ^
/// ```
pub fn render_with_source(problem: &Problem, source: &str) -> String {
    let mut out = format!("error: {problem}");
    let Some(span) = problem.span() else {
        return out;
    };

    let pos = line_col(source, span.start);
    out.push_str(&format!("\n  --> line {}, column {}", pos.line, pos.column));

    let Some(line_text) = source.lines().nth(pos.line as usize - 1) else {
        return out;
    };
    let gutter = pos.line.to_string();
    let pad = " ".repeat(gutter.len());
    out.push_str(&format!("\n {pad} |"));
    out.push_str(&format!("\n {gutter} | {line_text}"));

    let caret_offset = " ".repeat(pos.column as usize - 1);
    let width = (span.len() as usize).clamp(1, line_text.len().saturating_sub(pos.column as usize - 1).max(1));
    let carets = "^".repeat(width);
    out.push_str(&format!("\n {pad} | {caret_offset}{carets}"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Problem;
    use rill_ir::Span;
    use rill_lexer::{LexError, LexErrorKind};

    #[test]
    fn renders_line_and_caret() {
        let source = "let a = 1;\nlet b = 'oops;\n";
        let problem = Problem::Lex(LexError::new(
            LexErrorKind::UnterminatedString,
            Span::new(19, 26),
        ));
        let rendered = render_with_source(&problem, source);
        assert!(rendered.contains("unterminated string literal"));
        assert!(rendered.contains("line 2, column 9"));
        assert!(rendered.contains("let b = 'oops;"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn spanless_problems_render_bare() {
        let problem = Problem::Eval(rill_eval::errors::type_error("boom"));
        let rendered = render_with_source(&problem, "x;");
        assert_eq!(rendered, "error: TypeError: boom");
    }
}
