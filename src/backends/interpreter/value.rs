//! Runtime values
//!
//! Printing follows Python's `str()` so interpreter output matches what the
//! emitted program prints: strings raw, booleans `True`/`False`, sequences
//! as `['B', 'C']`.

use std::fmt;

/// Iterator state created by `iterator(x)`
#[derive(Debug, Clone, PartialEq)]
pub struct IterState {
    pub items: Vec<Value>,
    pub index: usize,
}

impl IterState {
    pub fn has_next(&self) -> bool {
        self.index < self.items.len()
    }
}

/// A runtime value held in the variable store
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    Seq(Vec<Value>),
    /// Internal to the iterator protocol, never printed by programs
    Iter(IterState),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Seq(_) => "array",
            Value::Iter(_) => "iterator",
        }
    }

    /// Truthiness used by conditional jumps
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Str(s) => !s.is_empty(),
            Value::Seq(_) | Value::Iter(_) => false,
        }
    }

    /// Elements of a string (one-character strings) or array
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::Str(s) => Some(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            Value::Seq(items) => Some(items.clone()),
            _ => None,
        }
    }

    /// Character or element count
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Seq(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Integer view; digit-only strings are coerced
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Str(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
            _ => None,
        }
    }

    /// Python `repr()`, used for elements inside a printed sequence
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => {
                if s.contains('\'') && !s.contains('"') {
                    format!("\"{}\"", s.replace('\\', "\\\\"))
                } else {
                    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
                }
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                write!(f, "]")
            }
            Value::Iter(state) => write!(f, "<iterator {}/{}>", state.index, state.items.len()),
        }
    }
}

/// Display a possibly-failed value; the failure sentinel prints as `None`
pub fn display_result(value: Option<&Value>) -> String {
    value.map_or_else(|| "None".to_string(), Value::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_display() {
        let seq = Value::Seq(vec![
            Value::Str("B".into()),
            Value::Str("C".into()),
            Value::Str("D".into()),
        ]);
        assert_eq!(seq.to_string(), "['B', 'C', 'D']");
        assert_eq!(Value::Seq(vec![Value::Int(1), Value::Int(2)]).to_string(), "[1, 2]");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Str("hi".into()).to_string(), "hi");
        assert_eq!(Value::Str("it's".into()).repr(), "\"it's\"");
        assert_eq!(display_result(None), "None");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Int(3).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::Seq(vec![Value::Int(1)]).is_truthy());
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Str("42".into()).as_number(), Some(42));
        assert_eq!(Value::Str("4a".into()).as_number(), None);
        assert_eq!(Value::Str(String::new()).as_number(), None);
    }

    #[test]
    fn test_string_elements_are_characters() {
        let chars = Value::Str("ab".into()).elements().unwrap();
        assert_eq!(chars, vec![Value::Str("a".into()), Value::Str("b".into())]);
        assert_eq!(Value::Str("héllo".into()).len(), Some(5));
    }
}
