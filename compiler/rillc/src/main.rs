//! rill CLI.

use std::rc::Rc;

use rill_eval::ConsoleSink;
use rillc::{dump_ast, dump_tokens, eval_expression, render_with_source, run_file, Problem};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "run" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: rill run <file.js>");
                std::process::exit(1);
            };
            let console = Rc::new(ConsoleSink::Stdout);
            if let Err(problem) = run_file(path, console) {
                report(&problem, std::fs::read_to_string(path).ok().as_deref());
                std::process::exit(1);
            }
        }
        "lex" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: rill lex <file.js>");
                std::process::exit(1);
            };
            with_source(path, |source| dump_tokens(source).map(|out| print!("{out}")));
        }
        "parse" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: rill parse <file.js>");
                std::process::exit(1);
            };
            with_source(path, |source| dump_ast(source).map(|out| print!("{out}")));
        }
        "eval" => {
            let Some(expr) = args.get(2) else {
                eprintln!("Usage: rill eval <expression>");
                std::process::exit(1);
            };
            match eval_expression(expr) {
                Ok(rendered) => println!("{rendered}"),
                Err(problem) => {
                    report(&problem, Some(expr));
                    std::process::exit(1);
                }
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Read a file and run a phase over it, reporting problems with context.
fn with_source(path: &str, f: impl FnOnce(&str) -> Result<(), Problem>) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {path}: {e}");
            std::process::exit(1);
        }
    };
    if let Err(problem) = f(&source) {
        report(&problem, Some(&source));
        std::process::exit(1);
    }
}

fn report(problem: &Problem, source: Option<&str>) {
    match source {
        Some(source) => eprintln!("{}", render_with_source(problem, source)),
        None => eprintln!("error: {problem}"),
    }
}

/// `RILL_LOG=debug rill run app.js` turns on tracing output.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("RILL_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    eprintln!("rill - a tree-walking interpreter for a core subset of JavaScript");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  rill run <file.js>      Run a program");
    eprintln!("  rill eval <expression>  Evaluate an expression and print the result");
    eprintln!("  rill lex <file.js>      Dump the token stream");
    eprintln!("  rill parse <file.js>    Dump the parsed statement tree");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RILL_LOG=debug          Enable tracing output on stderr");
}
