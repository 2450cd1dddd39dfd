use tracing::trace;

use std::cmp::Ordering;
use std::io::Write;

use crate::ast::{ArithmeticOp, BitLogicalOp, ComparisonOp, Expr, ExprKind, Place, UnaryOp};
use crate::error::RuntimeError;
use crate::interpreter::{Flow, Interpreter};
use crate::value::{DataType, Value, char_from_code};

impl<W: Write> Interpreter<W> {
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.descend(expr.span.start_line + 1, |this| this.evaluate_kind(expr))
    }

    fn evaluate_kind(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let line = expr.span.start_line + 1;

        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Variable(place) => Ok(self.load(place)),
            ExprKind::Grouped(inner) => self.evaluate(inner),

            ExprKind::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                Ok(unary(*op, value, expr.ty))
            }

            ExprKind::Increment { op, target } => {
                let current = self.load(target);
                let stored = self.store(target, step(&current, op.delta()));
                Ok(if op.is_prefix() { stored } else { current })
            }

            ExprKind::Arithmetic { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                arithmetic(*op, &left, &right, expr.ty, line)
            }

            // && and || stop as soon as the left side decides
            ExprKind::BitLogical {
                op: BitLogicalOp::And,
                left,
                right,
            } => Ok(Value::Bool(
                self.evaluate(left)?.as_bool() && self.evaluate(right)?.as_bool(),
            )),
            ExprKind::BitLogical {
                op: BitLogicalOp::Or,
                left,
                right,
            } => Ok(Value::Bool(
                self.evaluate(left)?.as_bool() || self.evaluate(right)?.as_bool(),
            )),
            ExprKind::BitLogical { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Ok(bit_logical(*op, &left, &right))
            }

            ExprKind::Comparison { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Ok(Value::Bool(compare(*op, &left, &right)))
            }

            ExprKind::Cast { target, operand } => Ok(self.evaluate(operand)?.cast(*target)),

            ExprKind::ArrayAccess {
                receiver,
                start,
                end,
            } => {
                let Value::Str(text) = self.evaluate(receiver)? else {
                    unreachable!("string access on a non-string");
                };
                let start = self.evaluate(start)?.as_int();
                match end {
                    None => char_at(&text, start, line).map(Value::Char),
                    Some(end) => {
                        let end = self.evaluate(end)?.as_int();
                        Ok(Value::Str(slice(&text, start, end)))
                    }
                }
            }

            ExprKind::Assignment { target, value } => {
                let value = self.evaluate(value)?;
                Ok(self.store(target, value))
            }

            ExprKind::Call { callee, args } => self.call(callee, args, line),
        }
    }

    fn call(&mut self, callee: &Place, args: &[Expr], line: usize) -> Result<Value, RuntimeError> {
        let Value::Function(function) = self.load(callee) else {
            unreachable!("'{}' is not bound to a function", callee.name);
        };

        // arguments belong to the caller's scope
        let mut values = Vec::with_capacity(args.len());
        for (arg, (_, ty)) in args.iter().zip(&function.params) {
            values.push(self.evaluate(arg)?.cast(*ty));
        }

        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.max_call_depth,
                line,
            });
        }
        self.call_depth += 1;
        trace!(name = %function.name, depth = self.call_depth, "calling function");

        self.symbols.enter_scope_under(callee.scope);
        for ((name, _), value) in function.params.iter().zip(values) {
            self.symbols.declare(name.clone(), value);
        }
        let flow = self.execute_block(&function.body);
        self.symbols.leave_scope();
        self.call_depth -= 1;

        Ok(match flow? {
            Flow::Return(value) => value.cast(function.return_type),
            Flow::Normal => Value::zero(function.return_type),
        })
    }
}

pub fn unary(op: UnaryOp, value: Value, ty: DataType) -> Value {
    match (op, ty) {
        (UnaryOp::Plus, DataType::Double) => Value::Double(value.as_double()),
        (UnaryOp::Plus, _) => Value::Int(value.as_int()),
        (UnaryOp::Negate, DataType::Double) => Value::Double(-value.as_double()),
        (UnaryOp::Negate, _) => Value::Int(value.as_int().wrapping_neg()),
        (UnaryOp::Not, _) => Value::Bool(!value.as_bool()),
        (UnaryOp::BitNot, _) => Value::Int(!value.as_int()),
    }
}

/// Value one `++` or `--` away from `current`, keeping its type.
pub fn step(current: &Value, delta: i32) -> Value {
    match current {
        Value::Int(i) => Value::Int(i.wrapping_add(delta)),
        Value::Double(d) => Value::Double(d + delta as f64),
        Value::Char(c) => Value::Char(char_from_code(*c as i32 + delta)),
        other => other.clone(),
    }
}

/// Applies an arithmetic operator in the domain of the result type `ty`.
pub fn arithmetic(
    op: ArithmeticOp,
    left: &Value,
    right: &Value,
    ty: DataType,
    line: usize,
) -> Result<Value, RuntimeError> {
    match ty {
        DataType::String => Ok(Value::Str(format!("{left}{right}"))),

        DataType::Double => {
            let (a, b) = (left.as_double(), right.as_double());
            Ok(Value::Double(match op {
                ArithmeticOp::Add => a + b,
                ArithmeticOp::Sub => a - b,
                ArithmeticOp::Mul => a * b,
                ArithmeticOp::Div => a / b,
                ArithmeticOp::Mod => a % b,
                ArithmeticOp::Power => a.powf(b),
            }))
        }

        _ => {
            let (a, b) = (left.as_int(), right.as_int());
            if matches!(op, ArithmeticOp::Div | ArithmeticOp::Mod) && b == 0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            Ok(Value::Int(match op {
                ArithmeticOp::Add => a.wrapping_add(b),
                ArithmeticOp::Sub => a.wrapping_sub(b),
                ArithmeticOp::Mul => a.wrapping_mul(b),
                ArithmeticOp::Div => a.wrapping_div(b),
                ArithmeticOp::Mod => a.wrapping_rem(b),
                ArithmeticOp::Power => power(a, b),
            }))
        }
    }
}

fn power(base: i32, exponent: i32) -> i32 {
    match u32::try_from(exponent) {
        Ok(exponent) => base.wrapping_pow(exponent),
        Err(_) => (base as f64).powi(exponent) as i32,
    }
}

/// Non short-circuiting bit/logic operators. BOOL operands get the logical
/// meaning, everything else is worked on as INT.
pub fn bit_logical(op: BitLogicalOp, left: &Value, right: &Value) -> Value {
    if let (Value::Bool(a), Value::Bool(b)) = (left, right) {
        return Value::Bool(match op {
            BitLogicalOp::BitAnd | BitLogicalOp::And => *a && *b,
            BitLogicalOp::BitOr | BitLogicalOp::Or => *a || *b,
            _ => a != b,
        });
    }

    let (a, b) = (left.as_int(), right.as_int());
    Value::Int(match op {
        BitLogicalOp::BitAnd | BitLogicalOp::And => a & b,
        BitLogicalOp::BitOr | BitLogicalOp::Or => a | b,
        BitLogicalOp::BitXor | BitLogicalOp::Xor => a ^ b,
        BitLogicalOp::ShiftLeft => a.wrapping_shl(b as u32),
        BitLogicalOp::ShiftRight => a.wrapping_shr(b as u32),
    })
}

pub fn compare(op: ComparisonOp, left: &Value, right: &Value) -> bool {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
        (Value::Double(_), _) | (_, Value::Double(_)) => {
            left.as_double().partial_cmp(&right.as_double())
        }
        _ => left.as_int().partial_cmp(&right.as_int()),
    };

    match op {
        ComparisonOp::Eq => ordering == Some(Ordering::Equal),
        ComparisonOp::NotEq => ordering != Some(Ordering::Equal),
        ComparisonOp::Less => ordering == Some(Ordering::Less),
        ComparisonOp::LessEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        ComparisonOp::Greater => ordering == Some(Ordering::Greater),
        ComparisonOp::GreaterEq => {
            matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

/// `text[index]`; a negative index counts from the end.
pub fn char_at(text: &str, index: i32, line: usize) -> Result<char, RuntimeError> {
    let len = text.chars().count();
    let position = if index < 0 {
        len as i64 + index as i64
    } else {
        index as i64
    };

    usize::try_from(position)
        .ok()
        .and_then(|position| text.chars().nth(position))
        .ok_or(RuntimeError::IndexOutOfRange {
            index: index as i64,
            len,
            line,
        })
}

/// `text[start:end]`. `start` is inclusive; a non-negative `end` is
/// exclusive while a negative `end` counts inclusively from the end, so
/// `-1` runs through the last character. Bounds are clamped.
pub fn slice(text: &str, start: i32, end: i32) -> String {
    let len = text.chars().count() as i64;
    let (start, end) = (start as i64, end as i64);

    let start = (if start < 0 { len + start } else { start }).clamp(0, len);
    let end = (if end < 0 { len + 1 + end } else { end }).clamp(0, len);
    if start >= end {
        return String::new();
    }
    text.chars()
        .skip(start as usize)
        .take((end - start) as usize)
        .collect()
}
