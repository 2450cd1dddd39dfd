use std::ops::Range;
use std::rc::Rc;

use crate::lexer::Token;
use crate::symbol_table::ScopeHandle;
use crate::value::{DataType, Value};

/// Source extent of a node: 0-based first and last line plus the byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
    pub range: Range<usize>,
}

impl Span {
    /// Span running from the start of `self` to the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start_line: self.start_line,
            end_line: other.end_line,
            range: self.range.start..other.range.end,
        }
    }
}

impl From<&Token> for Span {
    fn from(token: &Token) -> Self {
        Span {
            start_line: token.line,
            end_line: token.line + token.lexeme.matches('\n').count(),
            range: token.span.clone(),
        }
    }
}

/// A name resolved while parsing: its declaring scope and declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub scope: ScopeHandle,
    pub ty: DataType,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: DataType,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Value),
    Variable(Place),
    Grouped(Box<Expr>),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    // ++ and -- only ever apply to a named binding
    Increment {
        op: IncrementOp,
        target: Place,
    },

    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    BitLogical {
        op: BitLogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Cast {
        target: DataType,
        operand: Box<Expr>,
    },

    /// `receiver[start]` when `end` is `None`, otherwise `receiver[start:end]`.
    ArrayAccess {
        receiver: Box<Expr>,
        start: Box<Expr>,
        end: Option<Box<Expr>>,
    },

    Assignment {
        target: Place,
        value: Box<Expr>,
    },

    Call {
        callee: Place,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOp {
    PrefixIncrement,
    PrefixDecrement,
    PostfixIncrement,
    PostfixDecrement,
}

impl IncrementOp {
    pub fn is_prefix(self) -> bool {
        matches!(self, IncrementOp::PrefixIncrement | IncrementOp::PrefixDecrement)
    }

    pub fn delta(self) -> i32 {
        match self {
            IncrementOp::PrefixIncrement | IncrementOp::PostfixIncrement => 1,
            IncrementOp::PrefixDecrement | IncrementOp::PostfixDecrement => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitLogicalOp {
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

/// Any two-operand operator, as the parser sees it before building a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Arithmetic(ArithmeticOp),
    BitLogical(BitLogicalOp),
    Comparison(ComparisonOp),
}

pub trait OperatorName {
    /// Word used for the operator in diagnostics.
    fn name(&self) -> &'static str;
}

impl OperatorName for UnaryOp {
    fn name(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "unary plus",
            UnaryOp::Negate => "negation",
            UnaryOp::Not => "logical NOT",
            UnaryOp::BitNot => "bitwise NOT",
        }
    }
}

impl OperatorName for IncrementOp {
    fn name(&self) -> &'static str {
        match self {
            IncrementOp::PrefixIncrement => "prefix increment",
            IncrementOp::PrefixDecrement => "prefix decrement",
            IncrementOp::PostfixIncrement => "postfix increment",
            IncrementOp::PostfixDecrement => "postfix decrement",
        }
    }
}

impl OperatorName for BinaryOp {
    fn name(&self) -> &'static str {
        match self {
            BinaryOp::Arithmetic(op) => match op {
                ArithmeticOp::Add => "addition",
                ArithmeticOp::Sub => "subtraction",
                ArithmeticOp::Mul => "multiplication",
                ArithmeticOp::Div => "division",
                ArithmeticOp::Mod => "modulo",
                ArithmeticOp::Power => "exponentiation",
            },
            BinaryOp::BitLogical(op) => match op {
                BitLogicalOp::BitAnd => "bitwise AND",
                BitLogicalOp::BitOr => "bitwise OR",
                BitLogicalOp::BitXor => "bitwise XOR",
                BitLogicalOp::ShiftLeft => "left shift",
                BitLogicalOp::ShiftRight => "right shift",
                BitLogicalOp::And => "logical AND",
                BitLogicalOp::Or => "logical OR",
                BitLogicalOp::Xor => "logical XOR",
            },
            BinaryOp::Comparison(op) => match op {
                ComparisonOp::Eq => "equality",
                ComparisonOp::NotEq => "inequality",
                ComparisonOp::Less => "less than",
                ComparisonOp::LessEq => "less than or equal",
                ComparisonOp::Greater => "greater than",
                ComparisonOp::GreaterEq => "greater than or equal",
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Expression(Expr),
    Print(Expr),
    PrintLine(Expr),

    /// Guards and bodies pair up by position; an `else` is a literal `true`.
    Conditional {
        conditions: Vec<Expr>,
        bodies: Vec<Statement>,
    },

    While {
        condition: Expr,
        body: Box<Statement>,
    },

    /// Owns one scope around all four parts.
    For {
        init: Option<Box<Statement>>,
        condition: Expr,
        update: Option<Box<Statement>>,
        body: Box<Statement>,
    },

    NewDeclaration {
        name: String,
        ty: DataType,
        initializer: Option<Expr>,
    },

    Assignment {
        target: Place,
        value: Expr,
    },

    FunctionDeclaration(Rc<Function>),

    Return(Option<Expr>),

    Block(Vec<Statement>),
}

/// A user function. Calls run `body` in a fresh scope holding the parameters.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<(String, DataType)>,
    pub return_type: DataType,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}
