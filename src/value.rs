//! Runtime value type for the hscript expression language.
//!
//! The directive language is dynamically typed: attribute expressions mix
//! numbers, strings, and booleans freely, and the evaluator coerces between
//! them the way the host scripting language does.  `Undefined` is the result
//! of a failed evaluation; it renders as the empty string and coerces to zero
//! in arithmetic.

use std::fmt;

/// An hscript runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Undefined,
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => {
                // Integral floats print one decimal so they stay visibly floats.
                if x.fract() == 0.0 && x.abs() < 1e15 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Undefined => write!(f, "undefined"),
        }
    }
}

impl Value {
    /// Truthiness: `Undefined`, `false`, zero, NaN, and `""` are falsy.
    /// The string `"0"` is truthy (source-language rule, unlike shells).
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0 && !x.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Undefined => false,
        }
    }

    /// Coerce to `i64` (0 for non-numeric strings and `Undefined`).
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            Value::Float(x) => *x as i64,
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .or_else(|_| s.trim().parse::<f64>().map(|x| x as i64))
                .unwrap_or(0),
            Value::Bool(b) => *b as i64,
            Value::Undefined => 0,
        }
    }

    /// Coerce to `f64` (0.0 for non-numeric strings and `Undefined`).
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Int(n) => *n as f64,
            Value::Float(x) => *x,
            Value::Str(s) => s.trim().parse().unwrap_or(0.0),
            Value::Bool(b) => *b as i64 as f64,
            Value::Undefined => 0.0,
        }
    }

    /// Coerce to a string (clones for Str, formats otherwise).
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    /// Rendered form for tree output: `Undefined` becomes the empty string,
    /// everything else stringifies (`Int(0)` renders `"0"`, not empty).
    pub fn render(&self) -> String {
        match self {
            Value::Undefined => String::new(),
            other => other.to_string(),
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    // ── Arithmetic helpers ────────────────────────────────────────────────────

    /// Determine the common numeric type for a binary operation.
    /// Returns (lhs as f64, rhs as f64, result is float).
    fn numeric_promote(a: &Value, b: &Value) -> (f64, f64, bool) {
        let float_ish = |v: &Value| match v {
            Value::Float(_) => true,
            Value::Str(s) => s.contains('.'),
            _ => false,
        };
        let is_float = float_ish(a) || float_ish(b);
        (a.as_float(), b.as_float(), is_float)
    }

    fn make_numeric(f: f64, is_float: bool) -> Value {
        if is_float {
            Value::Float(f)
        } else {
            Value::Int(f as i64)
        }
    }

    /// `+`: string concatenation when either operand is a string,
    /// numeric addition otherwise.
    pub fn arith_add(&self, rhs: &Value) -> Value {
        if matches!(self, Value::Str(_)) || matches!(rhs, Value::Str(_)) {
            return Value::Str(format!("{self}{rhs}"));
        }
        let (a, b, is_float) = Self::numeric_promote(self, rhs);
        Self::make_numeric(a + b, is_float)
    }

    pub fn arith_sub(&self, rhs: &Value) -> Value {
        let (a, b, is_float) = Self::numeric_promote(self, rhs);
        Self::make_numeric(a - b, is_float)
    }

    pub fn arith_mul(&self, rhs: &Value) -> Value {
        let (a, b, is_float) = Self::numeric_promote(self, rhs);
        Self::make_numeric(a * b, is_float)
    }

    /// `/` never truncates: an inexact quotient stays a float even when both
    /// operands are integers (`10 / 3` is `3.333…`, not `3`).
    pub fn arith_div(&self, rhs: &Value) -> Result<Value, String> {
        let (a, b, is_float) = Self::numeric_promote(self, rhs);
        if b == 0.0 {
            return Err("division by zero".into());
        }
        let q = a / b;
        if is_float || q.fract() != 0.0 {
            Ok(Value::Float(q))
        } else {
            Ok(Value::Int(q as i64))
        }
    }

    pub fn arith_rem(&self, rhs: &Value) -> Result<Value, String> {
        let (a, b, is_float) = Self::numeric_promote(self, rhs);
        if b == 0.0 {
            return Err("modulo by zero".into());
        }
        Ok(Self::make_numeric(a % b, is_float))
    }

    pub fn arith_neg(&self) -> Value {
        match self {
            Value::Int(n) => Value::Int(-n),
            Value::Float(x) => Value::Float(-x),
            other => Value::Int(-other.as_int()),
        }
    }

    // ── Equality and ordering ─────────────────────────────────────────────────

    /// Loose equality (`==`): numeric coercion across type classes,
    /// string-to-string comparison stays textual, `Undefined` equals only
    /// itself (never coerces to zero here).
    pub fn loose_eq(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Undefined, _) | (_, Value::Undefined) => false,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => self.as_float() == rhs.as_float(),
        }
    }

    /// Strict equality (`===`): type classes must match (Int and Float form
    /// one numeric class).  This is what `hs-switch` case matching uses.
    pub fn strict_eq(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_float() == b.as_float(),
            _ => false,
        }
    }

    /// Relational comparison for `<`, `<=`, `>`, `>=`.
    /// String-to-string compares lexicographically; any numeric operand
    /// forces numeric comparison.
    pub fn cmp_value(&self, rhs: &Value) -> std::cmp::Ordering {
        match (self, rhs) {
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => self
                .as_float()
                .partial_cmp(&rhs.as_float())
                .unwrap_or(std::cmp::Ordering::Equal),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Coerce a raw attribute string the way `hs-var` does: integer if it parses
/// as one, float if it parses as one, otherwise the string itself.
pub fn coerce_attr(raw: &str) -> Value {
    let t = raw.trim();
    if let Ok(n) = t.parse::<i64>() {
        Value::Int(n)
    } else if let Ok(x) = t.parse::<f64>() {
        Value::Float(x)
    } else {
        Value::Str(raw.to_owned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
