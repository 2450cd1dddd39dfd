//! Fixed operator and conversion tables consulted by the parser whenever it
//! builds a node. A `None` or `false` answer is a static type or cast error.


use crate::ast::{ArithmeticOp, BinaryOp, BitLogicalOp, ComparisonOp, UnaryOp};
use crate::value::DataType::{self, *};

pub fn binary(op: BinaryOp, left: DataType, right: DataType) -> Option<DataType> {
    match op {
        BinaryOp::Arithmetic(op) => arithmetic(op, left, right),
        BinaryOp::BitLogical(op) => bit_logical(op, left, right),
        BinaryOp::Comparison(op) => comparison(op, left, right),
    }
}

pub fn arithmetic(op: ArithmeticOp, left: DataType, right: DataType) -> Option<DataType> {
    match (op, left, right) {
        (ArithmeticOp::Add, String, String | Char) | (ArithmeticOp::Add, Char, String) => {
            Some(String)
        }
        (_, Double, Int | Double | Char) | (_, Int | Char, Double) => Some(Double),
        (_, Int | Char, Int | Char) => Some(Int),
        _ => None,
    }
}

pub fn bit_logical(op: BitLogicalOp, left: DataType, right: DataType) -> Option<DataType> {
    use BitLogicalOp::*;

    match (op, left, right) {
        (And | Or | Xor | BitAnd | BitOr | BitXor, Bool, Bool) => Some(Bool),
        (BitAnd | BitOr | BitXor | ShiftLeft | ShiftRight, l, r)
            if l.is_integral() && r.is_integral() =>
        {
            Some(Int)
        }
        _ => None,
    }
}

pub fn comparison(op: ComparisonOp, left: DataType, right: DataType) -> Option<DataType> {
    let equality = matches!(op, ComparisonOp::Eq | ComparisonOp::NotEq);

    match (left, right) {
        (l, r) if l.is_numeric() && r.is_numeric() => Some(Bool),
        (String, String) => Some(Bool),
        (Bool, Bool) if equality => Some(Bool),
        _ => None,
    }
}

pub fn unary(op: UnaryOp, operand: DataType) -> Option<DataType> {
    match (op, operand) {
        (UnaryOp::Plus | UnaryOp::Negate, Int | Char) => Some(Int),
        (UnaryOp::Plus | UnaryOp::Negate, Double) => Some(Double),
        (UnaryOp::Not, Bool) => Some(Bool),
        (UnaryOp::BitNot, Int | Char) => Some(Int),
        _ => None,
    }
}

/// `++` and `--` keep the operand's type.
pub fn increment(operand: DataType) -> Option<DataType> {
    matches!(operand, Int | Double | Char).then_some(operand)
}

/// Whether a value of this type can index or bound a string slice.
pub fn index(ty: DataType) -> bool {
    ty.is_integral()
}

/// Conversions inserted silently by declarations, assignments, arguments
/// and returns.
pub fn implicit_cast(from: DataType, to: DataType) -> bool {
    (from == to && from != Function)
        || matches!((from, to), (Int, Double) | (Char, Int) | (Char, Double))
}

/// Conversions a `(type) value` cast may request.
pub fn explicit_cast(from: DataType, to: DataType) -> bool {
    let scalar = |ty: DataType| matches!(ty, Int | Double | Char | Bool);

    match (from, to) {
        (Void | Function, _) | (_, Void | Function) => false,
        (from, to) if from == to => true,
        (from, to) if scalar(from) && scalar(to) => true,
        (Char, String) => true,
        _ => false,
    }
}
