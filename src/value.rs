use std::fmt;
use std::rc::Rc;

use crate::ast::Function;

/// Static type tag of every expression and binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataType {
    Int,
    Double,
    Bool,
    Char,
    String,
    Function,
    Void,
}

impl DataType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int | DataType::Double | DataType::Char)
    }

    pub fn is_integral(self) -> bool {
        matches!(self, DataType::Int | DataType::Char)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "int",
            DataType::Double => "double",
            DataType::Bool => "bool",
            DataType::Char => "char",
            DataType::String => "string",
            DataType::Function => "function",
            DataType::Void => "void",
        };
        f.write_str(name)
    }
}

/// A run-time value. The variant is the type tag; exactly one payload lives.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Function(Rc<Function>),
    Void,
}

impl Value {
    /// Value of a declared but uninitialized binding.
    pub fn zero(ty: DataType) -> Value {
        match ty {
            DataType::Int => Value::Int(0),
            DataType::Double => Value::Double(0.0),
            DataType::Bool => Value::Bool(false),
            DataType::Char => Value::Char('\0'),
            DataType::String => Value::Str(String::new()),
            // functions are only ever bound with a body
            DataType::Function | DataType::Void => Value::Void,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Double(_) => DataType::Double,
            Value::Bool(_) => DataType::Bool,
            Value::Char(_) => DataType::Char,
            Value::Str(_) => DataType::String,
            Value::Function(_) => DataType::Function,
            Value::Void => DataType::Void,
        }
    }

    /// Integer view of an INT, CHAR or BOOL value.
    pub fn as_int(&self) -> i32 {
        match self {
            Value::Int(i) => *i,
            Value::Char(c) => *c as i32,
            Value::Bool(b) => *b as i32,
            Value::Double(d) => *d as i32,
            _ => 0,
        }
    }

    pub fn as_double(&self) -> f64 {
        match self {
            Value::Double(d) => *d,
            other => other.as_int() as f64,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Double(d) => *d != 0.0,
            other => other.as_int() != 0,
        }
    }

    /// Converts to `to` following the implicit and explicit cast tables.
    /// Pairs the checker never lets through come back unchanged.
    pub fn cast(self, to: DataType) -> Value {
        if self.data_type() == to {
            return self;
        }
        match (self, to) {
            (Value::Char(c), DataType::String) => Value::Str(c.to_string()),
            (value, DataType::Int) => Value::Int(value.as_int()),
            (value, DataType::Double) => Value::Double(value.as_double()),
            (value, DataType::Bool) => Value::Bool(value.as_bool()),
            (value @ (Value::Int(_) | Value::Double(_) | Value::Bool(_)), DataType::Char) => {
                Value::Char(char_from_code(value.as_int()))
            }
            (value, _) => value,
        }
    }
}

/// Character for a code point, or U+FFFD when there is none.
pub fn char_from_code(code: i32) -> char {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => f.write_str(s),
            Value::Function(function) => write!(f, "<fun {}>", function.name),
            Value::Void => Ok(()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Void, Value::Void) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_casts() {
        assert_eq!(Value::Int(3).cast(DataType::Double), Value::Double(3.0));
        assert_eq!(Value::Double(-2.9).cast(DataType::Int), Value::Int(-2));
        assert_eq!(Value::Double(0.0).cast(DataType::Bool), Value::Bool(false));
        assert_eq!(Value::Int(7).cast(DataType::Bool), Value::Bool(true));
        assert_eq!(Value::Char('A').cast(DataType::Int), Value::Int(65));
        assert_eq!(Value::Int(97).cast(DataType::Char), Value::Char('a'));
        assert_eq!(Value::Bool(true).cast(DataType::Double), Value::Double(1.0));
        assert_eq!(
            Value::Char('x').cast(DataType::String),
            Value::Str("x".to_string())
        );
    }

    #[test]
    fn test_rendering() {
        assert_eq!(Value::Double(2.5).to_string(), "2.5");
        assert_eq!(Value::Double(3.0).to_string(), "3");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Str("hi".to_string()).to_string(), "hi");
        assert_eq!(Value::Char('\n').to_string(), "\n");
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(Value::zero(DataType::Int), Value::Int(0));
        assert_eq!(Value::zero(DataType::String), Value::Str(String::new()));
        assert_eq!(Value::zero(DataType::Void).data_type(), DataType::Void);
    }
}
