use logos::{FilterResult, Lexer, Logos};
use thiserror::Error;
use tracing::debug;

use std::fmt;
use std::ops::Range;

use crate::error::{CompileError, ErrorKind};
use crate::source::Source;

#[cfg(test)]
pub mod test;

/// Why the lexer gave up. Every variant is fatal.
#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexErrorKind {
    #[default]
    #[error("Unrecognized character")]
    UnexpectedCharacter,

    #[error("Invalid escaped character")]
    InvalidEscape,

    #[error("Expected ' to terminate character literal")]
    UnterminatedChar,

    #[error("String literal not terminated with \"")]
    UnterminatedString,

    #[error("Block comment not terminated with */")]
    UnterminatedComment,

    #[error("Number literal can have at most 1 decimal point")]
    ExtraDecimalPoint,

    #[error("Number literal can only contain digits and <= 1 decimal point")]
    MalformedNumber,

    #[error("Integer literal does not fit in an int")]
    IntegerOverflow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Double(f64),
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f\x0B]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    #[token("/*", block_comment)]
    BlockComment,

    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),

    #[regex(r"[0-9][0-9A-Za-z_.]*", number)]
    #[regex(r"\.[0-9][0-9A-Za-z_.]*", number)]
    Number(Number),

    #[token("'", character)]
    Char(char),

    #[token("\"", string)]
    Str(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // type names
    #[token("int")]
    KeywordInt,
    #[token("double")]
    KeywordDouble,
    #[token("bool")]
    KeywordBool,
    #[token("char")]
    KeywordChar,
    #[token("string")]
    KeywordString,
    #[token("void")]
    KeywordVoid,

    #[token("print")]
    KeywordPrint,
    #[token("println")]
    KeywordPrintln,
    #[token("if")]
    KeywordIf,
    #[token("elif")]
    KeywordElif,
    #[token("else")]
    KeywordElse,
    #[token("while")]
    KeywordWhile,
    #[token("for")]
    KeywordFor,
    #[token("fun")]
    KeywordFun,
    #[token("return")]
    KeywordReturn,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("->")]
    Arrow,

    #[token("+")]
    Plus,
    #[token("++")]
    Increment,
    #[token("-")]
    Minus,
    #[token("--")]
    Decrement,
    #[token("*")]
    Mul,
    #[token("**")]
    Power,
    #[token("/")]
    Div,
    #[token("%")]
    Mod,

    #[token("!")]
    Not,
    #[token("~")]
    BitNot,
    #[token("&")]
    BitAnd,
    #[token("|")]
    BitOr,
    #[token("^")]
    BitXor,
    #[token("<<")]
    ShiftLeft,
    #[token(">>")]
    ShiftRight,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("^^")]
    Xor,

    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEq,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEq,

    #[token("=")]
    Assign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("**=")]
    PowerAssign,
    #[token("/=")]
    DivAssign,
    #[token("%=")]
    ModAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("<<=")]
    ShiftLeftAssign,
    #[token(">>=")]
    ShiftRightAssign,

    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "identifier '{name}'"),
            TokenKind::Number(_) | TokenKind::Bool(_) | TokenKind::Char(_) | TokenKind::Str(_) => {
                f.write_str("literal")
            }
            TokenKind::End => f.write_str("end of input"),
            other => write!(f, "{other:?}"),
        }
    }
}

fn block_comment(lex: &mut Lexer<TokenKind>) -> FilterResult<(), LexErrorKind> {
    let rest = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;

    while i < rest.len() {
        match (rest[i], rest.get(i + 1)) {
            (b'*', Some(b'/')) => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    lex.bump(i);
                    return FilterResult::Skip;
                }
            }
            (b'/', Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            _ => i += 1,
        }
    }

    lex.bump(rest.len());
    FilterResult::Error(LexErrorKind::UnterminatedComment)
}

fn unescape(c: char) -> Option<char> {
    Some(match c {
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0C',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0B',
        '\'' => '\'',
        '"' => '"',
        '?' => '?',
        '\\' => '\\',
        _ => return None,
    })
}

fn character(lex: &mut Lexer<TokenKind>) -> Result<char, LexErrorKind> {
    let mut chars = lex.remainder().chars();

    let value = match chars.next() {
        Some('\'') => {
            lex.bump(1);
            return Ok('\0');
        }
        Some('\\') => {
            let Some(escaped) = chars.next() else {
                lex.bump(1);
                return Err(LexErrorKind::UnterminatedChar);
            };
            lex.bump(1 + escaped.len_utf8());
            unescape(escaped).ok_or(LexErrorKind::InvalidEscape)?
        }
        Some(c) if c != '\n' => {
            lex.bump(c.len_utf8());
            c
        }
        _ => return Err(LexErrorKind::UnterminatedChar),
    };

    if lex.remainder().starts_with('\'') {
        lex.bump(1);
        Ok(value)
    } else {
        Err(LexErrorKind::UnterminatedChar)
    }
}

fn string(lex: &mut Lexer<TokenKind>) -> Result<String, LexErrorKind> {
    let rest = lex.remainder();
    let mut value = String::new();
    let mut chars = rest.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                lex.bump(i + 1);
                return Ok(value);
            }
            '\\' => {
                let Some((j, escaped)) = chars.next() else {
                    break;
                };
                match unescape(escaped) {
                    Some(unescaped) => value.push(unescaped),
                    None => {
                        lex.bump(j + escaped.len_utf8());
                        return Err(LexErrorKind::InvalidEscape);
                    }
                }
            }
            c => value.push(c),
        }
    }

    lex.bump(rest.len());
    Err(LexErrorKind::UnterminatedString)
}

fn number(lex: &mut Lexer<TokenKind>) -> Result<Number, LexErrorKind> {
    let slice = lex.slice();

    if slice.matches('.').count() > 1 {
        return Err(LexErrorKind::ExtraDecimalPoint);
    }
    if !slice.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '_') {
        return Err(LexErrorKind::MalformedNumber);
    }

    // `_` only separates digit groups
    let digits: String = slice.chars().filter(|&c| c != '_').collect();

    if digits.contains('.') {
        digits
            .parse::<f64>()
            .map(Number::Double)
            .map_err(|_| LexErrorKind::MalformedNumber)
    } else {
        let value = digits.bytes().try_fold(0i64, |acc, digit| {
            acc.checked_mul(10)?.checked_add((digit - b'0') as i64)
        });
        value
            .and_then(|v| i32::try_from(v).ok())
            .map(Number::Int)
            .ok_or(LexErrorKind::IntegerOverflow)
    }
}

/// One lexed token. `line` is 0-based; `lexeme` is the exact source slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub span: Range<usize>,
}

/// Turns the whole source into tokens, ending with a `TokenKind::End` marker.
pub fn lex(source: &Source) -> Result<Vec<Token>, CompileError> {
    let mut lexer = TokenKind::lexer(&source.text);
    let mut tokens = vec![];

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let line = source.line_of(span.start);

        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                lexeme: lexer.slice().to_string(),
                line,
                span,
            }),
            Err(error) => {
                let lexeme = match error {
                    // the opening quote is not part of the reported text
                    LexErrorKind::UnterminatedString => &source.text[span.start + 1..span.end],
                    _ => lexer.slice(),
                };
                return Err(CompileError::new(
                    ErrorKind::Lexical,
                    source,
                    (line, line),
                    span.clone(),
                    lexeme,
                    error.to_string(),
                ));
            }
        }
    }

    let end = source.text.len();
    tokens.push(Token {
        kind: TokenKind::End,
        lexeme: String::new(),
        line: tokens.last().map_or(0, |token| token.line),
        span: end..end,
    });

    debug!(count = tokens.len(), file = %source.name, "lexed source");
    Ok(tokens)
}
