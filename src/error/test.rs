use super::*;
use ariadne::Source as Cache;

#[test]
fn test_single_line_rendering() {
    let source = Source::new("test", "int x = true;");
    let error = CompileError::new(
        ErrorKind::StaticCast,
        &source,
        (0, 0),
        8..12,
        "true",
        cast_message(DataType::Bool, DataType::Int, false),
    );

    assert_eq!(
        error.to_string(),
        "Cast error on line 1:\n\tint x = true;\nwith element 'true'\nCannot implicitly cast from bool to int"
    );
}

#[test]
fn test_line_range_rendering() {
    let source = Source::new("test", "int x = 1 +\n  \"a\";");
    let error = CompileError::new(
        ErrorKind::StaticType,
        &source,
        (0, 1),
        8..17,
        "1 +\n  \"a\"",
        binary_type_message("addition", DataType::Int, DataType::Bool),
    );

    let text = error.to_string();
    assert!(text.starts_with("Type error from line 1 to line 2:\n\tint x = 1 +\n\t  \"a\";\n"));
    assert!(text.ends_with("The addition operation does not take int and bool type arguments"));
}

#[test]
fn test_lexical_errors_name_the_token() {
    let source = Source::new("test", "char c = 'ab';");
    let error = CompileError::new(
        ErrorKind::Lexical,
        &source,
        (0, 0),
        9..11,
        "'a",
        "Expected ' to terminate character literal",
    );
    assert!(error.to_string().contains("with token ''a'"));
}

#[test]
fn test_report_builds_without_color() {
    let source = Source::new("test", "print y;");
    let error = CompileError::new(
        ErrorKind::StaticScope,
        &source,
        (0, 0),
        6..7,
        "y",
        "'y' is not declared in this scope",
    );

    let mut out = Vec::new();
    error
        .report(&source, false)
        .write(("test".to_string(), Cache::from(source.text.clone())), &mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Scope error on line 1"));
    assert!(text.contains("'y' is not declared in this scope"));
}
