//! Evaluator tests: programs go through the real lexer and parser.

use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rill_ir::StringInterner;

use crate::{ConsoleSink, EvalError, EvalErrorKind, Interpreter, Value};

/// Run a program, returning the completion value and the captured console.
fn run(source: &str) -> (Value, Rc<ConsoleSink>) {
    match try_run(source) {
        Ok(result) => result,
        Err(e) => panic!("eval failed for {source:?}: {e}"),
    }
}

fn try_run(source: &str) -> Result<(Value, Rc<ConsoleSink>), EvalError> {
    let interner = Rc::new(StringInterner::new());
    let tokens = rill_lexer::tokenize(source, &interner)
        .unwrap_or_else(|e| panic!("lex failed for {source:?}: {e}"));
    let (arena, program) = rill_parse::parse(&tokens, &interner)
        .unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"));
    let console = Rc::new(ConsoleSink::buffer());
    let mut interp = Interpreter::new(Rc::new(arena), interner, console.clone());
    let value = interp.run_program(&program)?;
    Ok((value, console))
}

fn run_err(source: &str) -> EvalError {
    match try_run(source) {
        Ok(_) => panic!("expected eval error for {source:?}"),
        Err(e) => e,
    }
}

/// Captured console lines (all levels).
fn logs(source: &str) -> Vec<String> {
    let (_, console) = run(source);
    console.lines().into_iter().map(|(_, line)| line).collect()
}

fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n,
        other => panic!("expected number, got {other:?}"),
    }
}

// Arithmetic and operators

#[test]
fn arithmetic_basics() {
    assert_eq!(number(&run("10 + 5;").0), 15.0);
    assert_eq!(number(&run("10 % 3;").0), 1.0);
    assert_eq!(number(&run("2 ** 3;").0), 8.0);
    assert_eq!(number(&run("10 / 4;").0), 2.5);
    assert_eq!(number(&run("2 ** 3 ** 2;").0), 512.0);
}

#[test]
fn compound_assignment_sequence() {
    // Chained compound assignments walk x from 10 down to 1.
    let src = "let x = 10; x += 5; x -= 3; x *= 2; x /= 4; x %= 5; x;";
    assert_eq!(number(&run(src).0), 1.0);
}

#[test]
fn update_expressions_pre_and_post() {
    assert_eq!(number(&run("let n = 5; n++;").0), 5.0);
    assert_eq!(number(&run("let n = 5; n++; n;").0), 6.0);
    assert_eq!(number(&run("let n = 5; ++n;").0), 6.0);
    assert_eq!(number(&run("let n = 5; n--; --n; n;").0), 3.0);
}

#[test]
fn loose_vs_strict_equality() {
    assert!(matches!(run("5 == '5';").0, Value::Bool(true)));
    assert!(matches!(run("5 === '5';").0, Value::Bool(false)));
    assert!(matches!(run("null == undefined;").0, Value::Bool(true)));
    assert!(matches!(run("null === undefined;").0, Value::Bool(false)));
    assert!(matches!(run("null == 0;").0, Value::Bool(false)));
}

#[test]
fn logical_operators_return_operands() {
    assert_eq!(logs("console.log(0 || 'fallback');"), vec!["fallback"]);
    assert_eq!(logs("console.log('a' && 'b');"), vec!["b"]);
    assert_eq!(logs("console.log(null && 'never');"), vec!["null"]);
}

#[test]
fn short_circuit_skips_the_right_operand() {
    let src = "
        let calls = 0;
        function bump() { calls = calls + 1; return true; }
        false && bump();
        true || bump();
        console.log(calls);
    ";
    assert_eq!(logs(src), vec!["0"]);
}

#[test]
fn ternary_selects_by_truthiness() {
    assert_eq!(
        logs("let age = 18; console.log(age >= 18 ? 'adult' : 'minor');"),
        vec!["adult"]
    );
}

#[test]
fn string_concatenation_vs_numeric_addition() {
    assert_eq!(logs(r#"console.log("Hello, " + "World");"#), vec!["Hello, World"]);
    assert_eq!(logs(r#"console.log("count: " + 3);"#), vec!["count: 3"]);
    assert_eq!(logs(r#"console.log("10" - 5);"#), vec!["5"]);
}

// Scoping

#[test]
fn let_is_block_scoped() {
    let src = "let x = 1; { let x = 2; } console.log(x);";
    assert_eq!(logs(src), vec!["1"]);
}

#[test]
fn var_is_function_scoped() {
    let src = "
        var x = 1;
        function f() { var x = 2; return x; }
        console.log(f(), x);
    ";
    assert_eq!(logs(src), vec!["2 1"]);
}

#[test]
fn var_escapes_blocks() {
    let src = "if (true) { var leaked = 'visible'; } console.log(leaked);";
    assert_eq!(logs(src), vec!["visible"]);
}

#[test]
fn let_redeclaration_is_a_syntax_error() {
    let e = run_err("let x = 1; let x = 2;");
    assert_eq!(e.kind, EvalErrorKind::Syntax);
    assert!(e.to_string().contains("already been declared"));
}

#[test]
fn const_reassignment_is_a_type_error() {
    let e = run_err("const z = 15; z = 10;");
    assert_eq!(e.kind, EvalErrorKind::Type);
    assert!(e.to_string().contains("constant"));
}

#[test]
fn unresolved_identifier_is_a_reference_error() {
    let e = run_err("console.log(missing);");
    assert_eq!(e.kind, EvalErrorKind::Reference);
    assert_eq!(e.to_string(), "ReferenceError: missing is not defined");
}

#[test]
fn hoisted_var_reads_as_undefined_before_its_line() {
    assert_eq!(logs("console.log(x); var x = 5; console.log(x);"), vec![
        "undefined", "5"
    ]);
}

#[test]
fn function_declarations_hoist_whole() {
    assert_eq!(logs("console.log(greet()); function greet() { return 'hi'; }"), vec!["hi"]);
}

// Closures

#[test]
fn closures_capture_the_defining_environment() {
    let src = r#"
        function outerFunction(outerVariable) {
            return function innerFunction(innerVariable) {
                console.log(outerVariable);
                console.log(innerVariable);
            };
        }
        let myClosure = outerFunction("Hello from outer");
        myClosure("Hello from inner");
    "#;
    assert_eq!(logs(src), vec!["Hello from outer", "Hello from inner"]);
}

#[test]
fn closures_observe_later_mutation_not_a_copy() {
    let src = "
        function createCounter() {
            let count = 0;
            return {
                increment: function () { count++; },
                getCount: function () { return count; },
            };
        }
        let counter = createCounter();
        counter.increment();
        console.log(counter.getCount());
        counter.increment();
        console.log(counter.getCount());
    ";
    assert_eq!(logs(src), vec!["1", "2"]);
}

#[test]
fn call_scope_chains_from_the_closure_not_the_caller() {
    // Static scoping: g reads x from where it was defined.
    let src = "
        let x = 'lexical';
        function g() { return x; }
        function h() { let x = 'dynamic'; return g(); }
        console.log(h());
    ";
    assert_eq!(logs(src), vec!["lexical"]);
}

// Control flow

#[test]
fn switch_falls_through_until_break() {
    let src = r#"
        let day = "Monday";
        let out = [];
        switch (day) {
            case "Monday":
                out.push("mon");
            case "Tuesday":
                out.push("tue");
                break;
            case "Wednesday":
                out.push("wed");
                break;
            default:
                out.push("other");
        }
        console.log(out.join(","));
    "#;
    assert_eq!(logs(src), vec!["mon,tue"]);
}

#[test]
fn switch_uses_strict_matching_and_default() {
    let src = r#"
        let out = [];
        switch (5) {
            case "5": out.push("loose"); break;
            default: out.push("default");
        }
        console.log(out.join(","));
    "#;
    assert_eq!(logs(src), vec!["default"]);
}

#[test]
fn loops_break_and_continue() {
    let src = "
        let sum = 0;
        for (let i = 0; i < 10; i++) {
            if (i === 3) { continue; }
            if (i === 6) { break; }
            sum += i;
        }
        console.log(sum);
    ";
    // 0+1+2+4+5
    assert_eq!(logs(src), vec!["12"]);
}

#[test]
fn while_and_do_while() {
    assert_eq!(
        logs("let i = 0; while (i < 3) { i++; } console.log(i);"),
        vec!["3"]
    );
    // A do-while body runs once even when the condition starts false.
    assert_eq!(
        logs("let n = 0; do { n++; } while (false); console.log(n);"),
        vec!["1"]
    );
}

#[test]
fn for_in_yields_keys_in_insertion_order() {
    let src = r#"
        let person = { name: "John", age: 30 };
        let keys = [];
        for (let key in person) { keys.push(key); }
        console.log(keys.join(","));
    "#;
    assert_eq!(logs(src), vec!["name,age"]);
}

#[test]
fn for_of_yields_values_in_order() {
    let src = r#"
        let colors = ["Red", "Green", "Blue"];
        let seen = [];
        for (const color of colors) { seen.push(color); }
        console.log(seen.join(","));
    "#;
    assert_eq!(logs(src), vec!["Red,Green,Blue"]);
}

// Errors and try/catch/finally

#[test]
fn finally_runs_exactly_once_on_catch() {
    let src = r#"
        let trace = [];
        try {
            throw new Error("x");
        } catch (e) {
            trace.push("caught:" + e.message);
        } finally {
            trace.push("finally");
        }
        console.log(trace.join(","));
    "#;
    assert_eq!(logs(src), vec!["caught:x,finally"]);
}

#[test]
fn finally_runs_even_when_catch_rethrows() {
    let src = r#"
        let trace = [];
        try {
            try {
                throw new Error("inner");
            } catch (e) {
                trace.push("caught");
                throw e;
            } finally {
                trace.push("finally");
            }
        } catch (e) {
            trace.push("outer:" + e.message);
        }
        console.log(trace.join(","));
    "#;
    assert_eq!(logs(src), vec!["caught,finally,outer:inner"]);
}

#[test]
fn finally_runs_through_return() {
    let src = "
        let trace = [];
        function f() {
            try {
                return 'returned';
            } finally {
                trace.push('finally');
            }
        }
        trace.push(f());
        console.log(trace.join(','));
    ";
    assert_eq!(logs(src), vec!["finally,returned"]);
}

#[test]
fn engine_errors_are_catchable_with_message() {
    let src = "
        try {
            null.anything;
        } catch (e) {
            console.log(e.name);
        }
    ";
    assert_eq!(logs(src), vec!["TypeError"]);
}

#[test]
fn thrown_non_error_values_pass_through() {
    assert_eq!(
        logs("try { throw 42; } catch (e) { console.log(typeof e, e); }"),
        vec!["number 42"]
    );
}

#[test]
fn uncaught_throw_surfaces_to_the_caller() {
    let e = run_err("throw 'boom';");
    assert_eq!(e.kind, EvalErrorKind::Thrown);
}

#[test]
fn reading_property_of_undefined_fails() {
    let e = run_err("let x; x.field;");
    assert!(e.to_string().contains("Cannot read properties of undefined"));
}

#[test]
fn deep_recursion_is_a_range_error() {
    let e = run_err("function f() { return f(); } f();");
    assert_eq!(e.kind, EvalErrorKind::Range);
    assert!(e.to_string().contains("call stack"));
}

// typeof

#[test]
fn typeof_table_including_the_null_quirk() {
    let src = r#"
        console.log(typeof "John");
        console.log(typeof 3.14);
        console.log(typeof true);
        console.log(typeof undeclared);
        console.log(typeof null);
        console.log(typeof 9007199254740991n);
        console.log(typeof {});
        console.log(typeof []);
        console.log(typeof function () {});
    "#;
    // `typeof undeclared` would be "undefined" in JS; here the identifier
    // must exist, so use a declared-but-unset variable instead.
    let src = src.replace("typeof undeclared", "typeof notSet");
    let src = format!("var notSet; {src}");
    assert_eq!(
        logs(&src),
        vec![
            "string",
            "number",
            "boolean",
            "undefined",
            "object",
            "bigint",
            "object",
            "object",
            "function"
        ]
    );
}

// Objects, prototypes, this

#[test]
fn object_literals_and_member_access() {
    let src = r#"
        let person = { firstName: "John", lastName: "Doe", age: 30 };
        console.log(person.firstName + " " + person["lastName"]);
        person.age = 31;
        person.city = "Oslo";
        console.log(person.age, person.city);
    "#;
    assert_eq!(logs(src), vec!["John Doe", "31 Oslo"]);
}

#[test]
fn shorthand_and_method_properties() {
    let src = r#"
        let name = "Ada";
        let user = { name, greet() { return "Hi, " + this.name; } };
        console.log(user.greet());
    "#;
    assert_eq!(logs(src), vec!["Hi, Ada"]);
}

#[test]
fn this_binds_to_the_receiver_per_invocation() {
    let src = r#"
        function greet() { return "I am " + this.name; }
        let a = { name: "a", greet: greet };
        let b = { name: "b", greet: greet };
        console.log(a.greet());
        console.log(b.greet());
    "#;
    assert_eq!(logs(src), vec!["I am a", "I am b"]);
}

#[test]
fn arrow_functions_inherit_this_lexically() {
    let src = r#"
        let obj = {
            name: "outer",
            run: function () {
                let arrow = () => this.name;
                return arrow();
            },
        };
        console.log(obj.run());
    "#;
    assert_eq!(logs(src), vec!["outer"]);
}

#[test]
fn constructor_functions_and_prototype_sharing() {
    let src = r#"
        function Person(name, age) {
            this.name = name;
            this.age = age;
        }
        Person.prototype.greet = function () {
            return "Hello, my name is " + this.name + "!";
        };
        let p1 = new Person("Sarah", 29);
        let p2 = new Person("Tom", 31);
        console.log(p1.greet());
        console.log(p2.greet());
        console.log(p1.greet === p2.greet);
        console.log(p1.hasOwnProperty("name"), p1.hasOwnProperty("greet"));
    "#;
    assert_eq!(
        logs(src),
        vec![
            "Hello, my name is Sarah!",
            "Hello, my name is Tom!",
            "true",
            "true false"
        ]
    );
}

#[test]
fn instances_win_over_the_prototype() {
    let src = r#"
        function Thing() {}
        Thing.prototype.kind = "proto";
        let t = new Thing();
        console.log(t.kind);
        t.kind = "own";
        console.log(t.kind);
    "#;
    assert_eq!(logs(src), vec!["proto", "own"]);
}

#[test]
fn objects_share_by_reference_primitives_copy() {
    let src = "
        let a = { n: 1 };
        let b = a;
        b.n = 2;
        let x = 1;
        let y = x;
        y = 99;
        console.log(a.n, x);
    ";
    assert_eq!(logs(src), vec!["2 1"]);
}

// Destructuring, spread, defaults

#[test]
fn array_and_object_destructuring() {
    let src = r#"
        let [first, second] = ["a", "b"];
        let { name, age: years, city = "unknown" } = { name: "Ann", age: 30 };
        console.log(first, second, name, years, city);
    "#;
    assert_eq!(logs(src), vec!["a b Ann 30 unknown"]);
}

#[test]
fn rest_and_spread() {
    let src = "
        function sum(...numbers) {
            return numbers.reduce((total, n) => total + n, 0);
        }
        let arr1 = [1, 2, 3];
        let arr2 = [...arr1, 4, 5];
        console.log(sum(...arr2));
        console.log(arr2.length);
    ";
    assert_eq!(logs(src), vec!["15", "5"]);
}

#[test]
fn parameter_defaults_apply_on_undefined() {
    let src = "
        function greet(name = 'stranger') { return 'Hello ' + name; }
        console.log(greet());
        console.log(greet('Ada'));
    ";
    assert_eq!(logs(src), vec!["Hello stranger", "Hello Ada"]);
}

// Template literals

#[test]
fn template_literals_interpolate() {
    let src = "
        let name = 'Ada';
        let age = 36;
        console.log(`Hello, my name is ${name} and I am ${age} years old.`);
        console.log(`sum: ${1 + 2 * 3}`);
    ";
    assert_eq!(
        logs(src),
        vec!["Hello, my name is Ada and I am 36 years old.", "sum: 7"]
    );
}

// Builtins

#[test]
fn array_methods() {
    let src = r#"
        let fruits = ["Apple", "Banana", "Orange"];
        fruits.push("Grapes");
        fruits.pop();
        console.log(fruits.length, fruits.indexOf("Banana"), fruits.includes("Kiwi"));
        let citrus = fruits.slice(1, 3);
        console.log(citrus.join("+"));
        let doubled = [1, 2, 3].map(n => n * 2);
        let evens = [1, 2, 3, 4].filter(n => n % 2 === 0);
        let total = [1, 2, 3, 4].reduce((acc, n) => acc + n, 0);
        console.log(doubled.join(","), evens.join(","), total);
    "#;
    assert_eq!(logs(src), vec!["3 1 false", "Banana+Orange", "2,4,6 2,4 10"]);
}

#[test]
fn string_methods() {
    let src = r#"
        let s = "  JavaScript  ";
        console.log(s.trim().toUpperCase());
        console.log("hello".charAt(1), "hello".slice(1, 3), "hello".indexOf("llo"));
        console.log("a,b,c".split(","). join("|"));
        console.log("ab".repeat(3));
        console.log("hello".length, "hello"[1]);
    "#;
    assert_eq!(
        logs(src),
        vec!["JAVASCRIPT", "e el 2", "a|b|c", "ababab", "5 e"]
    );
}

#[test]
fn math_and_conversions() {
    let src = "
        console.log(Math.abs(-5), Math.floor(4.7), Math.ceil(4.2), Math.round(4.5));
        console.log(Math.max(1, 9, 3), Math.min(1, 9, 3), Math.pow(2, 10), Math.sqrt(16));
        console.log(parseInt('42px'), parseFloat('3.14etc'), parseInt('ff', 16));
        console.log(Number('12'), String(34), Boolean(''), isNaN('abc'));
    ";
    assert_eq!(
        logs(src),
        vec![
            "5 4 5 5",
            "9 1 1024 4",
            "42 3.14 255",
            "12 34 false true"
        ]
    );
}

#[test]
fn json_round_trip_preserves_structure() {
    let src = r#"
        let person = { name: "John", age: 30, tags: ["a", "b"], active: true, score: null };
        let text = JSON.stringify(person);
        console.log(text);
        let back = JSON.parse(text);
        console.log(back.name, back.tags[1], back.age);
    "#;
    assert_eq!(
        logs(src),
        vec![
            r#"{"name":"John","age":30,"tags":["a","b"],"active":true,"score":null}"#,
            "John b 30"
        ]
    );
}

#[test]
fn json_parse_errors_are_catchable_syntax_errors() {
    let src = "
        try { JSON.parse('{bad'); } catch (e) { console.log(e.name); }
    ";
    assert_eq!(logs(src), vec!["SyntaxError"]);
}

#[test]
fn object_keys_values_entries() {
    let src = r#"
        let person = { name: "John", age: 30 };
        console.log(Object.keys(person).join(","));
        console.log(Object.values(person).join(","));
        console.log(Object.entries(person)[0].join(":"));
        console.log(Array.isArray([]), Array.isArray({}));
    "#;
    assert_eq!(logs(src), vec!["name,age", "John,30", "name:John", "true false"]);
}

// Event loop, timers, promises, async

#[test]
fn set_timeout_defers_past_synchronous_code() {
    let src = r#"
        console.log("First");
        setTimeout(function () { console.log("Second"); }, 1000);
        console.log("Third");
    "#;
    assert_eq!(logs(src), vec!["First", "Third", "Second"]);
}

#[test]
fn timers_order_by_delay_then_fifo() {
    let src = "
        setTimeout(function () { console.log('slow'); }, 50);
        setTimeout(function () { console.log('fast-1'); }, 10);
        setTimeout(function () { console.log('fast-2'); }, 10);
    ";
    assert_eq!(logs(src), vec!["fast-1", "fast-2", "slow"]);
}

#[test]
fn clear_timeout_drops_a_pending_task() {
    let src = "
        let id = setTimeout(function () { console.log('never'); }, 5);
        clearTimeout(id);
        setTimeout(function () { console.log('ran'); }, 10);
    ";
    assert_eq!(logs(src), vec!["ran"]);
}

#[test]
fn promise_then_runs_after_synchronous_code() {
    let src = r#"
        function fetchDataPromise() {
            return new Promise(function (resolve, reject) {
                setTimeout(function () { resolve("payload"); }, 1000);
            });
        }
        console.log("First");
        fetchDataPromise().then(function (data) {
            console.log("Promise resolved:", data);
        });
        console.log("Third");
    "#;
    assert_eq!(logs(src), vec!["First", "Third", "Promise resolved: payload"]);
}

#[test]
fn promise_chaining_passes_results_along() {
    let src = "
        Promise.resolve(2)
            .then(function (n) { return n * 10; })
            .then(function (n) { console.log(n); });
        console.log('sync');
    ";
    assert_eq!(logs(src), vec!["sync", "20"]);
}

#[test]
fn promise_catch_and_finally() {
    let src = r#"
        Promise.reject("nope")
            .catch(function (e) { console.log("caught", e); })
            .finally(function () { console.log("finally"); });
    "#;
    assert_eq!(logs(src), vec!["caught nope", "finally"]);
}

#[test]
fn async_await_resolves_through_the_queue() {
    let src = r#"
        function fetchDataPromise() {
            return new Promise(function (resolve, reject) {
                setTimeout(function () { resolve("payload"); }, 1000);
            });
        }
        async function fetchDataAsync() {
            try {
                const data = await fetchDataPromise();
                console.log("Async data:", data);
            } catch (error) {
                console.error("Async error:", error);
            }
        }
        fetchDataAsync();
        console.log("After call");
    "#;
    assert_eq!(logs(src), vec!["After call", "Async data: payload"]);
}

#[test]
fn await_rejection_lands_in_catch() {
    let src = r#"
        async function f() {
            try {
                await Promise.reject("bad");
            } catch (e) {
                console.log("caught:", e);
            }
        }
        f();
    "#;
    assert_eq!(logs(src), vec!["caught: bad"]);
}

#[test]
fn async_call_returns_a_promise_immediately() {
    let src = "
        async function f() { return 7; }
        let p = f();
        console.log(typeof p, p === f());
        p.then(function (n) { console.log('value', n); });
    ";
    assert_eq!(logs(src), vec!["object false", "value 7"]);
}

#[test]
fn await_on_a_promise_nobody_settles_rejects() {
    // The starvation TypeError rejects the async function's result promise;
    // a catch handler observes it.
    let src = r#"
        async function f() { await new Promise(function (r) {}); }
        f().catch(function (e) { console.log(e.name, e.message); });
    "#;
    assert_eq!(
        logs(src),
        vec!["TypeError await on a computation that can never settle"]
    );
}

// BigInt

#[test]
fn bigint_literals_and_arithmetic() {
    assert_eq!(logs("console.log(9007199254740991n + 1n);"), vec!["9007199254740992n"]);
    let e = run_err("1n + 1;");
    assert_eq!(e.kind, EvalErrorKind::Type);
}

// Completion values

#[test]
fn program_completion_value_is_the_last_expression() {
    assert_eq!(number(&run("let a = 2; a * 21;").0), 42.0);
    assert!(matches!(run("let a = 2;").0, Value::Undefined));
}

// Property-based checks

proptest! {
    #[test]
    fn addition_matches_f64_semantics(a in -1e9f64..1e9, b in -1e9f64..1e9) {
        let src = format!("{a} + {b};");
        let (value, _) = run(&src);
        prop_assert_eq!(number(&value), a + b);
    }

    #[test]
    fn exponentiation_matches_powf(a in 0.1f64..50.0, b in -3.0f64..3.0) {
        let src = format!("{a} ** {b};");
        let (value, _) = run(&src);
        let got = number(&value);
        let expected = a.powf(b);
        prop_assert!((got - expected).abs() <= expected.abs() * 1e-12 + 1e-12);
    }

    #[test]
    fn subtraction_string_coercion(a in -1_000_000i64..1_000_000) {
        // "n" - 0 converts the string to a number.
        let src = format!("'{a}' - 0;");
        let (value, _) = run(&src);
        #[allow(clippy::cast_precision_loss)]
        prop_assert_eq!(number(&value), a as f64);
    }
}
