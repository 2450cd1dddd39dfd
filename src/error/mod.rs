pub mod report;

#[cfg(test)]
pub mod test;

use thiserror::Error;

use std::fmt;
use std::ops::Range;

use crate::source::Source;
use crate::value::DataType;

/// The five ways a program can be rejected before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    StaticType,
    StaticCast,
    StaticScope,
}

impl ErrorKind {
    pub fn title(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "Lexing",
            ErrorKind::Syntax => "Parsing",
            ErrorKind::StaticType => "Type",
            ErrorKind::StaticCast => "Cast",
            ErrorKind::StaticScope => "Scope",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "E01",
            ErrorKind::Syntax => "E02",
            ErrorKind::StaticType => "E03",
            ErrorKind::StaticCast => "E04",
            ErrorKind::StaticScope => "E05",
        }
    }
}

/// A fatal lexing or checking error. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub start_line: usize,
    pub end_line: usize,
    /// Offending source lines, tab-indented.
    pub context: String,
    /// Offending lexeme or element text.
    pub element: String,
    pub message: String,
    pub span: Range<usize>,
}

impl CompileError {
    /// Builds an error covering the 0-based lines `start..=end` of `source`.
    pub fn new(
        kind: ErrorKind,
        source: &Source,
        lines: (usize, usize),
        span: Range<usize>,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let (start, end) = lines;
        CompileError {
            kind,
            start_line: start + 1,
            end_line: end.max(start) + 1,
            context: source.block(start, end),
            element: element.into(),
            message: message.into(),
            span,
        }
    }

    pub fn header(&self) -> String {
        if self.start_line == self.end_line {
            format!("{} error on line {}", self.kind.title(), self.start_line)
        } else {
            format!(
                "{} error from line {} to line {}",
                self.kind.title(),
                self.start_line,
                self.end_line
            )
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let element = if self.kind == ErrorKind::Lexical {
            "token"
        } else {
            "element"
        };
        write!(
            f,
            "{}:\n{}with {} '{}'\n{}",
            self.header(),
            self.context,
            element,
            self.element,
            self.message
        )
    }
}

impl std::error::Error for CompileError {}

pub fn binary_type_message(operation: &str, left: DataType, right: DataType) -> String {
    format!("The {operation} operation does not take {left} and {right} type arguments")
}

pub fn unary_type_message(operation: &str, ty: DataType) -> String {
    format!("The {operation} operation does not take {ty} type argument")
}

pub fn cast_message(from: DataType, to: DataType, explicit: bool) -> String {
    let how = if explicit { "explicitly" } else { "implicitly" };
    format!("Cannot {how} cast from {from} to {to}")
}

pub fn undeclared_message(name: &str) -> String {
    format!("'{name}' is not declared in this scope")
}

pub fn redeclared_message(name: &str) -> String {
    format!("'{name}' is already declared in this scope")
}

/// Failures that only show up while a checked program runs. Lines are 1-based.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Runtime error on line {line}: division by zero")]
    DivisionByZero { line: usize },

    #[error("Runtime error on line {line}: index {index} is out of range for a string of length {len}")]
    IndexOutOfRange { index: i64, len: usize, line: usize },

    #[error("Runtime error on line {line}: call depth exceeded the limit of {limit}")]
    CallDepthExceeded { limit: usize, line: usize },

    #[error("Runtime error on line {line}: evaluation nests deeper than {limit} frames")]
    StackExhausted { limit: usize, line: usize },

    #[error("failed to write program output")]
    Output(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("failed to start the interpreter thread")]
    Thread(#[source] std::io::Error),
}
