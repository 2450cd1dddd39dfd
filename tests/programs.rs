use std::fs;

use pebble::config::Config;
use pebble::error::{CompileError, Error, ErrorKind, RuntimeError};
use pebble::source::Source;
use walkdir::WalkDir;

fn run_with(input: &str, config: &Config) -> Result<String, Error> {
    let source = Source::new("test.pebble", input);
    let mut out = Vec::new();
    pebble::run(&source, &mut out, config)?;
    Ok(String::from_utf8(out).expect("program output is utf-8"))
}

fn run(input: &str) -> Result<String, Error> {
    run_with(input, &Config::default())
}

fn output(input: &str) -> String {
    run(input).unwrap_or_else(|e| panic!("program failed:\n{input}\nError: {e}"))
}

fn compile_error(input: &str) -> CompileError {
    match run(input) {
        Err(Error::Compile(error)) => error,
        other => panic!("expected a compile error, got {other:?}"),
    }
}

#[test]
fn exponent_binds_tighter_than_addition() {
    assert_eq!(output("int x = 2; int y = x ** 3 + 1; println y;"), "9\n");
}

#[test]
fn if_else_takes_the_true_branch() {
    assert_eq!(
        output("bool b = true; if (b) { println 1; } else { println 2; }"),
        "1\n"
    );
}

#[test]
fn compound_assignment() {
    assert_eq!(output("int x = 1; x += 2; x **= 2; println x;"), "9\n");
    assert_eq!(
        output("int x = 12; x %= 5; x <<= 3; x >>= 1; x ^= 1; println x;"),
        "9\n"
    );
    assert_eq!(
        output("bool b = true; b ^= true; b |= false; println b;"),
        "false\n"
    );
}

#[test]
fn string_slices() {
    let program = r#"
        string s = "hello";
        println s[1:3];
        println s[:];
        println s[2];
        println s[1:-2];
        println s[-3:];
        println s[:2] + s[3:];
    "#;
    assert_eq!(output(program), "el\nhello\nl\nell\nllo\nhelo\n");
}

#[test]
fn logical_operators_short_circuit_except_xor() {
    let program = r#"
        fun effect(string tag) -> bool { println tag; return true; }
        bool a = false && effect("and");
        bool b = true || effect("or");
        bool c = false ^^ effect("xor");
        bool d = false & effect("bitand");
        println a;
        println b;
        println c;
    "#;
    assert_eq!(output(program), "xor\nbitand\nfalse\ntrue\ntrue\n");
}

#[test]
fn blocks_scope_their_declarations() {
    let program = "
        int x = 1;
        { int x = 2; x = x + 10; println x; }
        println x;
        { x = 5; }
        println x;
    ";
    assert_eq!(output(program), "12\n1\n5\n");

    let error = compile_error("{ int hidden = 1; }\nprintln hidden;");
    assert_eq!(error.kind, ErrorKind::StaticScope);
    assert_eq!(error.start_line, 2);

    let error = compile_error("{ int x = 1; int x = 2; }");
    assert_eq!(error.kind, ErrorKind::StaticScope);
}

#[test]
fn unsupported_casts_are_rejected() {
    for program in [
        "string s = (string) 5;",
        "int x = (int) \"5\";",
        "bool b = (bool) 2.5 + 1;",
        "double d = (void) 1;",
    ] {
        let error = compile_error(program);
        assert!(
            matches!(error.kind, ErrorKind::StaticCast | ErrorKind::StaticType),
            "{program}: {error}"
        );
    }

    let error = compile_error("string s = (string) 5;");
    assert_eq!(error.kind, ErrorKind::StaticCast);
    assert_eq!(output("double d = (double) 5; println d + 0.5;"), "5.5\n");
}

#[test]
fn recursion() {
    let program = "
        fun fact(int n) -> int {
            if (n <= 1) { return 1; }
            return n * fact(n - 1);
        }
        fun fib(int n) -> int {
            int a = 0;
            int b = 1;
            while (n > 0) {
                int next = a + b;
                a = b;
                b = next;
                n--;
            }
            return a;
        }
        println fact(10);
        println fib(20);
    ";
    assert_eq!(output(program), "3628800\n6765\n");
}

#[test]
fn nested_functions_see_their_enclosing_scope() {
    let program = "
        fun outer(int n) -> int {
            fun inner(int m) -> int { return m * n; }
            return inner(n + 1);
        }
        println outer(3);
    ";
    assert_eq!(output(program), "12\n");
}

#[test]
fn runaway_recursion_is_a_runtime_error() {
    let config = Config::default().with_max_call_depth(16);
    let result = run_with(
        "fun down(int n) -> int { return down(n - 1); }\nprintln down(0);",
        &config,
    );

    assert!(matches!(
        result,
        Err(Error::Runtime(RuntimeError::CallDepthExceeded { limit: 16, .. }))
    ));
}

#[test]
fn long_operator_chains_count_as_nesting() {
    let program = format!("println 1{};", " + 1".repeat(199));
    assert_eq!(output(&program), "200\n");

    let program = format!("println 1{};", " + 1".repeat(20_000));
    let error = compile_error(&program);
    assert_eq!(error.kind, ErrorKind::Syntax);
    assert_eq!(error.message, "Nesting exceeds the limit of 256 levels");

    let program = format!("string s = \"abc\"; println s{};", "[0:]".repeat(300));
    assert_eq!(compile_error(&program).kind, ErrorKind::Syntax);
}

#[test]
fn default_limits_report_errors_instead_of_crashing() {
    let nested = |depth: usize| format!("println {}1{};", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(output(&nested(250)), "1\n");

    let error = compile_error(&nested(300));
    assert_eq!(error.kind, ErrorKind::Syntax);
    assert_eq!(error.message, "Nesting exceeds the limit of 256 levels");

    let result = run("fun down(int n) -> int { return down(n - 1); }\nprintln down(0);");
    assert!(matches!(
        result,
        Err(Error::Runtime(RuntimeError::CallDepthExceeded { limit: 256, line: 1 }))
    ));

    // deep expressions inside recursion spend the frame budget before the call limit
    let program = format!(
        "fun down(int n) -> int {{ return {}down(n - 1){}; }}\nprintln down(0);",
        "(".repeat(100),
        ")".repeat(100)
    );
    assert!(matches!(
        run(&program),
        Err(Error::Runtime(RuntimeError::StackExhausted { .. }))
    ));
}

#[test]
fn runtime_errors_name_their_line() {
    let error = run("string s = \"abc\";\nprintln s[3];").unwrap_err();
    assert_eq!(
        error.to_string(),
        "Runtime error on line 2: index 3 is out of range for a string of length 3"
    );

    let error = run("int z = 0;\nint y = 1;\nprintln y / z;").unwrap_err();
    assert!(matches!(
        error,
        Error::Runtime(RuntimeError::DivisionByZero { line: 3 })
    ));
}

#[test]
fn compile_error_text() {
    let error = compile_error("int x = 1;\nx = x + \"a\";");
    assert_eq!(
        error.to_string(),
        "Type error on line 2:\n\tx = x + \"a\";\nwith element 'x + \"a\"'\nThe addition operation does not take int and string type arguments"
    );

    let error = compile_error("int x = 1;\nchar c = 'ab';");
    assert!(
        error
            .to_string()
            .starts_with("Lexing error on line 2:\n\tchar c = 'ab';\nwith token")
    );

    let error = compile_error("int x = 1 +\n  true;");
    assert!(error.to_string().starts_with("Type error from line 1 to line 2:"));
}

#[test]
fn literals_and_comments() {
    let program = "/* header /* nested */ */\nstring s = \"two\nlines\"; // trailing\nprintln s;\nint big = 1_000_000;\nprintln big + 1;\nprintln '\\t' == 9;";
    assert_eq!(output(program), "two\nlines\n1000001\ntrue\n");
}

#[test]
fn demo_programs_match_expected_output() {
    let mut count = 0;

    for entry in WalkDir::new("demos")
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "pebble"))
    {
        let path = entry.path();
        let program =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        let expected = fs::read_to_string(path.with_extension("out"))
            .unwrap_or_else(|e| panic!("Missing expected output for {path:?}: {e}"));

        count += 1;
        match run(&program) {
            Ok(out) => assert_eq!(out, expected, "output of {path:?}"),
            Err(e) => panic!("Demo {path:?} failed:\n{e}"),
        }
    }

    assert!(count > 0, "No demo programs found in demos/");
}
