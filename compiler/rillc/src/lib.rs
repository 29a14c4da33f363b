//! rillc - driver for the rill interpreter.
//!
//! Wires lexer → parser → evaluator, with a pluggable console sink and an
//! optional hook to seed extra globals. The CLI in `main.rs` is a thin
//! wrapper over [`run_source`] and the dump helpers.

pub mod problem;

use std::rc::Rc;

use rill_eval::{ConsoleSink, Interpreter, SharedConsole, Value};
use rill_ir::StringInterner;

pub use problem::{render_with_source, Problem};

/// Run a program from source text.
///
/// Returns the completion value: the value of the program's last expression
/// statement (`undefined` for declaration-only programs). Console output
/// accumulates in the provided sink.
pub fn run_source(source: &str, console: SharedConsole) -> Result<Value, Problem> {
    run_source_with(source, console, |_| {})
}

/// Run a program with a hook to seed extra globals before execution.
pub fn run_source_with(
    source: &str,
    console: SharedConsole,
    seed: impl FnOnce(&mut Interpreter),
) -> Result<Value, Problem> {
    let interner = Rc::new(StringInterner::new());

    tracing::debug!(bytes = source.len(), "lexing");
    let tokens = rill_lexer::tokenize(source, &interner)?;

    tracing::debug!(tokens = tokens.len(), "parsing");
    let (arena, program) = rill_parse::parse(&tokens, &interner)?;

    tracing::debug!(exprs = arena.expr_count(), "evaluating");
    let mut interp = Interpreter::new(Rc::new(arena), interner, console);
    seed(&mut interp);
    let value = interp.run_program(&program)?;
    Ok(value)
}

/// Run a file from disk.
pub fn run_file(path: &str, console: SharedConsole) -> Result<Value, Problem> {
    let source = std::fs::read_to_string(path)?;
    run_source(&source, console)
}

/// Evaluate source and render the completion value for display.
///
/// The `rill eval` subcommand uses this: `rill eval '1 + 2'` prints `3`.
pub fn eval_expression(source: &str) -> Result<String, Problem> {
    let interner = Rc::new(StringInterner::new());
    let tokens = rill_lexer::tokenize(source, &interner)?;
    let (arena, program) = rill_parse::parse(&tokens, &interner)?;
    let console = Rc::new(ConsoleSink::Stdout);
    let mut interp = Interpreter::new(Rc::new(arena), interner.clone(), console);
    let value = interp.run_program(&program)?;
    Ok(rill_eval::coerce::inspect(&value, &interner))
}

/// Lex source and render one token per line (the `rill lex` subcommand).
pub fn dump_tokens(source: &str) -> Result<String, Problem> {
    let interner = StringInterner::new();
    let tokens = rill_lexer::tokenize(source, &interner)?;
    let mut out = String::new();
    for token in tokens.iter() {
        out.push_str(&format!("{:>5}..{:<5} {:?}\n", token.span.start, token.span.end, token.kind));
    }
    Ok(out)
}

/// Parse source and render the statement tree (the `rill parse` subcommand).
pub fn dump_ast(source: &str) -> Result<String, Problem> {
    let interner = StringInterner::new();
    let tokens = rill_lexer::tokenize(source, &interner)?;
    let (arena, program) = rill_parse::parse(&tokens, &interner)?;
    let mut out = String::new();
    for &id in arena.stmt_list(program.body) {
        out.push_str(&format!("{:?}\n", arena.stmt(id)));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn run_source_returns_the_completion_value() {
        let console = Rc::new(ConsoleSink::Silent);
        let value = run_source("1 + 2;", console);
        assert!(matches!(value, Ok(Value::Number(n)) if n == 3.0));
    }

    #[test]
    fn console_output_accumulates_in_the_sink() {
        let console = Rc::new(ConsoleSink::buffer());
        let result = run_source("console.log('a'); console.log('b');", console.clone());
        assert!(result.is_ok());
        assert_eq!(console.text(), "a\nb");
    }

    #[test]
    fn seeded_globals_are_visible() {
        let console = Rc::new(ConsoleSink::buffer());
        let result = run_source_with("console.log(injected + 1);", console.clone(), |interp| {
            interp.define_global("injected", Value::number(41.0));
        });
        assert!(result.is_ok());
        assert_eq!(console.text(), "42");
    }

    #[test]
    fn problems_carry_their_phase() {
        let console = Rc::new(ConsoleSink::Silent);
        assert!(matches!(
            run_source("'unterminated", console.clone()),
            Err(Problem::Lex(_))
        ));
        assert!(matches!(
            run_source("let = 1;", console.clone()),
            Err(Problem::Parse(_))
        ));
        assert!(matches!(
            run_source("missing;", console),
            Err(Problem::Eval(_))
        ));
    }

    #[test]
    fn eval_expression_renders_values() {
        assert_eq!(eval_expression("1 + 2;").ok(), Some("3".to_string()));
        assert_eq!(
            eval_expression("[1, 2, 3].map(n => n * 2);").ok(),
            Some("[ 2, 4, 6 ]".to_string())
        );
    }

    #[test]
    fn dumps_are_line_per_item() {
        let tokens = dump_tokens("let x = 1;").unwrap_or_default();
        assert_eq!(tokens.lines().count(), 6); // let x = 1 ; eof
        let ast = dump_ast("let x = 1;").unwrap_or_default();
        assert_eq!(ast.lines().count(), 1);
    }
}
