//! Parser tests.

use crate::{parse, ParseError};
use pretty_assertions::assert_eq;
use rill_ir::{
    Arena, BinaryOp, DeclKind, ExprKind, FunctionBody, FunctionKind, LogicalOp, Program,
    StmtKind, StringInterner, UnaryOp,
};

fn parse_ok(source: &str) -> (Arena, Program, StringInterner) {
    let interner = StringInterner::new();
    let tokens = rill_lexer::tokenize(source, &interner)
        .unwrap_or_else(|e| panic!("lex failed for {source:?}: {e}"));
    let (arena, program) =
        parse(&tokens, &interner).unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"));
    (arena, program, interner)
}

fn parse_err(source: &str) -> ParseError {
    let interner = StringInterner::new();
    let tokens = rill_lexer::tokenize(source, &interner)
        .unwrap_or_else(|e| panic!("lex failed for {source:?}: {e}"));
    match parse(&tokens, &interner) {
        Ok(_) => panic!("expected parse error for {source:?}"),
        Err(e) => e,
    }
}

/// The kind of the only statement in a single-statement program.
fn single_stmt_kind(source: &str) -> (Arena, StmtKind) {
    let (arena, program, _) = parse_ok(source);
    let stmts = arena.stmt_list(program.body);
    assert_eq!(stmts.len(), 1, "expected one statement in {source:?}");
    let kind = arena.stmt(stmts[0]).kind;
    (arena, kind)
}

#[test]
fn precedence_mul_over_add() {
    let (arena, kind) = single_stmt_kind("1 + 2 * 3;");
    let StmtKind::Expr(root) = kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Binary { op, left, right } = arena.expr(root).kind else {
        panic!("expected binary root");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(arena.expr(left).kind, ExprKind::Number(n) if n == 1.0));
    assert!(matches!(
        arena.expr(right).kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn exponent_is_right_associative_and_tight() {
    // 2 ** 3 ** 2 parses as 2 ** (3 ** 2); -x ** 2 keeps ** under unary.
    let (arena, kind) = single_stmt_kind("2 ** 3 ** 2;");
    let StmtKind::Expr(root) = kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Binary { op, right, .. } = arena.expr(root).kind else {
        panic!("expected binary root");
    };
    assert_eq!(op, BinaryOp::Pow);
    assert!(matches!(
        arena.expr(right).kind,
        ExprKind::Binary {
            op: BinaryOp::Pow,
            ..
        }
    ));
}

#[test]
fn logical_operators_nest_or_over_and() {
    let (arena, kind) = single_stmt_kind("a && b || c;");
    let StmtKind::Expr(root) = kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Logical { op, left, .. } = arena.expr(root).kind else {
        panic!("expected logical root");
    };
    assert_eq!(op, LogicalOp::Or);
    assert!(matches!(
        arena.expr(left).kind,
        ExprKind::Logical {
            op: LogicalOp::And,
            ..
        }
    ));
}

#[test]
fn ternary_and_assignment_are_lowest() {
    let (arena, kind) = single_stmt_kind("x = a > b ? a : b;");
    let StmtKind::Expr(root) = kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Assign { value, .. } = arena.expr(root).kind else {
        panic!("expected assignment root");
    };
    assert!(matches!(
        arena.expr(value).kind,
        ExprKind::Conditional { .. }
    ));
}

#[test]
fn negated_number_literal_folds() {
    let (arena, kind) = single_stmt_kind("-42;");
    let StmtKind::Expr(root) = kind else {
        panic!("expected expression statement");
    };
    assert!(matches!(arena.expr(root).kind, ExprKind::Number(n) if n == -42.0));
}

#[test]
fn typeof_is_a_unary_operator() {
    let (arena, kind) = single_stmt_kind("typeof x;");
    let StmtKind::Expr(root) = kind else {
        panic!("expected expression statement");
    };
    assert!(matches!(
        arena.expr(root).kind,
        ExprKind::Unary {
            op: UnaryOp::TypeOf,
            ..
        }
    ));
}

#[test]
fn var_declaration_kinds() {
    let (arena, program, _) = parse_ok("var a = 1; let b = 2; const c = 3;");
    let stmts = arena.stmt_list(program.body);
    let kinds: Vec<DeclKind> = stmts
        .iter()
        .map(|&id| match arena.stmt(id).kind {
            StmtKind::VarDecl { kind, .. } => kind,
            other => panic!("expected VarDecl, got {other:?}"),
        })
        .collect();
    assert_eq!(kinds, vec![DeclKind::Var, DeclKind::Let, DeclKind::Const]);
}

#[test]
fn const_requires_initializer() {
    let err = parse_err("const x;");
    assert!(err.to_string().contains("missing initializer"));
}

#[test]
fn destructuring_declarations() {
    let (arena, kind) = single_stmt_kind("let { name, age: years = 30 } = person;");
    let StmtKind::VarDecl { decls, .. } = kind else {
        panic!("expected VarDecl");
    };
    let decl = arena.decls(decls)[0];
    let pattern = arena.pattern(decl.pattern);
    assert!(matches!(pattern.kind, rill_ir::PatternKind::Object(props) if props.len() == 2));
}

#[test]
fn array_pattern_with_rest() {
    let (arena, kind) = single_stmt_kind("let [first, ...rest] = fruits;");
    let StmtKind::VarDecl { decls, .. } = kind else {
        panic!("expected VarDecl");
    };
    let decl = arena.decls(decls)[0];
    let rill_ir::PatternKind::Array { elements, rest } = arena.pattern(decl.pattern).kind else {
        panic!("expected array pattern");
    };
    assert_eq!(elements.len(), 1);
    assert!(rest.is_valid());
}

#[test]
fn arrow_function_single_param() {
    let (arena, kind) = single_stmt_kind("const double = x => x * 2;");
    let StmtKind::VarDecl { decls, .. } = kind else {
        panic!("expected VarDecl");
    };
    let init = arena.decls(decls)[0].init;
    let ExprKind::Function(func) = arena.expr(init).kind else {
        panic!("expected function value");
    };
    let def = arena.func(func);
    assert_eq!(def.kind, FunctionKind::Arrow);
    assert!(matches!(def.body, FunctionBody::Expr(_)));
    assert_eq!(arena.params(def.params).len(), 1);
}

#[test]
fn arrow_function_param_list_and_block_body() {
    let (arena, kind) = single_stmt_kind("const add = (a, b) => { return a + b; };");
    let StmtKind::VarDecl { decls, .. } = kind else {
        panic!("expected VarDecl");
    };
    let init = arena.decls(decls)[0].init;
    let ExprKind::Function(func) = arena.expr(init).kind else {
        panic!("expected function value");
    };
    let def = arena.func(func);
    assert_eq!(def.kind, FunctionKind::Arrow);
    assert!(matches!(def.body, FunctionBody::Block(_)));
    assert_eq!(arena.params(def.params).len(), 2);
}

#[test]
fn parenthesized_expression_is_not_an_arrow() {
    let (arena, kind) = single_stmt_kind("(a + b) * 2;");
    let StmtKind::Expr(root) = kind else {
        panic!("expected expression statement");
    };
    assert!(matches!(
        arena.expr(root).kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn rest_params_and_spread_args() {
    let (arena, program, _) = parse_ok("function sum(...nums) { return nums; } sum(...arr, 4);");
    let stmts = arena.stmt_list(program.body);
    let StmtKind::FunctionDecl(func) = arena.stmt(stmts[0]).kind else {
        panic!("expected function declaration");
    };
    assert!(arena.params(arena.func(func).params)[0].rest);
    let StmtKind::Expr(call) = arena.stmt(stmts[1]).kind else {
        panic!("expected call statement");
    };
    let ExprKind::Call { args, .. } = arena.expr(call).kind else {
        panic!("expected call");
    };
    let elems = arena.elems(args);
    assert!(elems[0].spread);
    assert!(!elems[1].spread);
}

#[test]
fn object_literal_shorthand_and_method() {
    let (arena, kind) = single_stmt_kind("let o = { name, greet() { return 1; }, age: 30 };");
    let StmtKind::VarDecl { decls, .. } = kind else {
        panic!("expected VarDecl");
    };
    let init = arena.decls(decls)[0].init;
    let ExprKind::Object(props) = arena.expr(init).kind else {
        panic!("expected object literal");
    };
    let props = arena.props(props);
    assert_eq!(props.len(), 3);
    assert!(matches!(arena.expr(props[0].value).kind, ExprKind::Ident(_)));
    assert!(matches!(
        arena.expr(props[1].value).kind,
        ExprKind::Function(_)
    ));
}

#[test]
fn new_expression_with_member_callee() {
    let (arena, kind) = single_stmt_kind(r#"let p = new Person("Sarah", 29);"#);
    let StmtKind::VarDecl { decls, .. } = kind else {
        panic!("expected VarDecl");
    };
    let init = arena.decls(decls)[0].init;
    let ExprKind::New { args, .. } = arena.expr(init).kind else {
        panic!("expected new expression");
    };
    assert_eq!(arena.elems(args).len(), 2);
}

#[test]
fn for_in_and_for_of_headers() {
    let (arena, program, _) =
        parse_ok("for (let key in person) {} for (const color of colors) {}");
    let stmts = arena.stmt_list(program.body);
    assert!(matches!(arena.stmt(stmts[0]).kind, StmtKind::ForIn { .. }));
    assert!(matches!(
        arena.stmt(stmts[1]).kind,
        StmtKind::ForOf {
            kind: DeclKind::Const,
            ..
        }
    ));
}

#[test]
fn c_style_for_header() {
    let (arena, kind) = single_stmt_kind("for (let i = 0; i < 10; i++) {}");
    let StmtKind::For {
        init,
        test,
        update,
        ..
    } = kind
    else {
        panic!("expected C-style for");
    };
    assert!(init.is_valid());
    assert!(test.is_valid());
    assert!(update.is_valid());
    assert!(matches!(arena.stmt(init).kind, StmtKind::VarDecl { .. }));
}

#[test]
fn switch_with_fallthrough_bodies() {
    let (arena, kind) = single_stmt_kind(
        r#"switch (day) {
            case "Monday":
            case "Tuesday":
                work();
                break;
            default:
                rest();
        }"#,
    );
    let StmtKind::Switch { cases, .. } = kind else {
        panic!("expected switch");
    };
    let cases = arena.cases(cases);
    assert_eq!(cases.len(), 3);
    // First clause is empty: fall-through to the second.
    assert!(cases[0].body.is_empty());
    assert!(cases[1].test.is_valid());
    assert!(!cases[2].test.is_valid());
}

#[test]
fn try_catch_finally_shapes() {
    let (arena, kind) = single_stmt_kind("try { risky(); } catch (e) { log(e); } finally { done(); }");
    let StmtKind::Try {
        handler,
        has_finally,
        ..
    } = kind
    else {
        panic!("expected try statement");
    };
    assert!(handler.is_valid());
    assert!(has_finally);
    assert!(arena.catch(handler).param.is_valid());
}

#[test]
fn catch_or_finally_is_required() {
    let err = parse_err("try { risky(); }");
    assert!(err.to_string().contains("catch"));
}

#[test]
fn template_literal_with_interpolation() {
    let (arena, kind) = single_stmt_kind("let m = `Hello, ${name}! You are ${age}.`;");
    let StmtKind::VarDecl { decls, .. } = kind else {
        panic!("expected VarDecl");
    };
    let init = arena.decls(decls)[0].init;
    let ExprKind::Template { parts, .. } = arena.expr(init).kind else {
        panic!("expected template literal");
    };
    assert_eq!(parts.len(), 2);
    let parts = arena.parts(parts);
    assert!(matches!(arena.expr(parts[0].expr).kind, ExprKind::Ident(_)));
}

#[test]
fn template_without_interpolation_is_full() {
    let (arena, kind) = single_stmt_kind("let m = `plain text`;");
    let StmtKind::VarDecl { decls, .. } = kind else {
        panic!("expected VarDecl");
    };
    let init = arena.decls(decls)[0].init;
    assert!(matches!(
        arena.expr(init).kind,
        ExprKind::TemplateFull(_)
    ));
}

#[test]
fn invalid_assignment_target_is_rejected() {
    let err = parse_err("1 = 2;");
    assert!(err.to_string().contains("invalid assignment target"));
}

#[test]
fn unexpected_token_reports_expected_and_found() {
    let err = parse_err("let = 5;");
    assert_eq!(err.found, "`=`");
    assert!(err.to_string().contains("expected"));
}

#[test]
fn keyword_member_names_parse() {
    let (arena, kind) = single_stmt_kind("promise.catch(handler);");
    let StmtKind::Expr(root) = kind else {
        panic!("expected expression statement");
    };
    assert!(matches!(arena.expr(root).kind, ExprKind::Call { .. }));
}

#[test]
fn async_function_and_await() {
    let (arena, program, _) = parse_ok(
        "async function fetchData() { const data = await fetchDataPromise(); return data; }",
    );
    let stmts = arena.stmt_list(program.body);
    let StmtKind::FunctionDecl(func) = arena.stmt(stmts[0]).kind else {
        panic!("expected async function declaration");
    };
    assert!(arena.func(func).is_async);
}

#[test]
fn update_expressions() {
    let (arena, program, _) = parse_ok("count++; --count;");
    let stmts = arena.stmt_list(program.body);
    let StmtKind::Expr(post) = arena.stmt(stmts[0]).kind else {
        panic!("expected expression");
    };
    assert!(matches!(
        arena.expr(post).kind,
        ExprKind::Update { prefix: false, .. }
    ));
    let StmtKind::Expr(pre) = arena.stmt(stmts[1]).kind else {
        panic!("expected expression");
    };
    assert!(matches!(
        arena.expr(pre).kind,
        ExprKind::Update { prefix: true, .. }
    ));
}
