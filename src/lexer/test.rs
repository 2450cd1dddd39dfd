use super::*;

fn kinds(input: &str) -> Vec<TokenKind> {
    let source = Source::new("test", input);
    lex(&source)
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

fn lex_error(input: &str) -> CompileError {
    let source = Source::new("test", input);
    lex(&source).unwrap_err()
}

#[test]
fn test_basic_tokens() {
    assert_eq!(
        kinds("int x = 5;"),
        vec![
            TokenKind::KeywordInt,
            TokenKind::Identifier("x".to_string()),
            TokenKind::Assign,
            TokenKind::Number(Number::Int(5)),
            TokenKind::Semicolon,
            TokenKind::End,
        ]
    );
}

#[test]
fn test_longest_punctuation_wins() {
    assert_eq!(
        kinds("* ** **= < << <<= <= ++ + -> -- ^^ ^="),
        vec![
            TokenKind::Mul,
            TokenKind::Power,
            TokenKind::PowerAssign,
            TokenKind::Less,
            TokenKind::ShiftLeft,
            TokenKind::ShiftLeftAssign,
            TokenKind::LessEq,
            TokenKind::Increment,
            TokenKind::Plus,
            TokenKind::Arrow,
            TokenKind::Decrement,
            TokenKind::Xor,
            TokenKind::XorAssign,
            TokenKind::End,
        ]
    );
}

#[test]
fn test_keywords_and_booleans() {
    assert_eq!(
        kinds("println true falsey elif"),
        vec![
            TokenKind::KeywordPrintln,
            TokenKind::Bool(true),
            TokenKind::Identifier("falsey".to_string()),
            TokenKind::KeywordElif,
            TokenKind::End,
        ]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(
        kinds("12 3.25 .5 7. 1_000"),
        vec![
            TokenKind::Number(Number::Int(12)),
            TokenKind::Number(Number::Double(3.25)),
            TokenKind::Number(Number::Double(0.5)),
            TokenKind::Number(Number::Double(7.0)),
            TokenKind::Number(Number::Int(1000)),
            TokenKind::End,
        ]
    );
}

#[test]
fn test_number_errors() {
    let error = lex_error("double d = 1.2.3;");
    assert_eq!(error.kind, ErrorKind::Lexical);
    assert_eq!(error.element, "1.2.3");
    assert_eq!(error.message, "Number literal can have at most 1 decimal point");

    let error = lex_error("int x = 12ab;");
    assert_eq!(error.element, "12ab");

    let error = lex_error("int x = 2147483648;");
    assert_eq!(error.message, "Integer literal does not fit in an int");
}

#[test]
fn test_char_literals() {
    assert_eq!(
        kinds(r"'a' '\n' '\\' ''"),
        vec![
            TokenKind::Char('a'),
            TokenKind::Char('\n'),
            TokenKind::Char('\\'),
            TokenKind::Char('\0'),
            TokenKind::End,
        ]
    );

    let error = lex_error("char c = 'ab';");
    assert_eq!(error.message, "Expected ' to terminate character literal");
    assert_eq!(error.start_line, 1);

    let error = lex_error(r"char c = '\q';");
    assert_eq!(error.message, "Invalid escaped character");
}

#[test]
fn test_string_literals_span_lines() {
    let source = Source::new("test", "string s = \"one\ntwo\";\nprint s;");
    let tokens = lex(&source).unwrap();

    assert_eq!(tokens[3].kind, TokenKind::Str("one\ntwo".to_string()));
    assert_eq!(tokens[3].line, 0);
    // the embedded newline advanced the line counter
    assert_eq!(tokens[5].kind, TokenKind::KeywordPrint);
    assert_eq!(tokens[5].line, 2);
}

#[test]
fn test_unterminated_string() {
    let error = lex_error("int x = 1;\nstring s = \"oops\n;");
    assert_eq!(error.start_line, 2);
    assert_eq!(error.element, "oops\n;");
    assert_eq!(error.message, "String literal not terminated with \"");
}

#[test]
fn test_comments() {
    assert_eq!(
        kinds("1 // one\n/* two /* nested */ still */ 3"),
        vec![
            TokenKind::Number(Number::Int(1)),
            TokenKind::Number(Number::Int(3)),
            TokenKind::End,
        ]
    );

    let source = Source::new("test", "/* a\n b */ x");
    let tokens = lex(&source).unwrap();
    assert_eq!(tokens[0].line, 1);

    let error = lex_error("/* /* */");
    assert_eq!(error.message, "Block comment not terminated with */");
}

#[test]
fn test_unknown_character() {
    let error = lex_error("int $x = 1;");
    assert_eq!(error.element, "$");
    assert_eq!(error.message, "Unrecognized character");
}

#[test]
fn test_lexemes_reconstruct_source() {
    let input = "fun add(int a, int b) -> int { return a+b; } println add(1, 2) ** 2;";
    let source = Source::new("test", input);
    let tokens = lex(&source).unwrap();

    for token in &tokens {
        assert_eq!(token.lexeme, &input[token.span.clone()]);
    }
    let joined: String = tokens.iter().map(|token| token.lexeme.as_str()).collect();
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    assert_eq!(joined, stripped);
}

#[test]
fn test_end_marker() {
    let tokens = lex(&Source::new("test", "")).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::End);

    let tokens = lex(&Source::new("test", "x\n\ny")).unwrap();
    assert_eq!(tokens.last().unwrap().line, 2);
}
