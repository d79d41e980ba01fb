//! Tagged runtime values and their operator semantics.
//!
//! Scalars (`Null`, `Bool`, `Int`, `Float`, `Complex`, `Str`) are
//! value-typed. `List` and `Dict` are wrapped in `Rc<RefCell<…>>` so that
//! mutation through one binding is observable through every alias, and
//! `Function` shares its body and captured environment behind an `Rc`.
//!
//! Binary operations follow the numeric promotion chain
//! Bool → Int → Float → Complex; lists combine elementwise. Operations
//! return [`OpError`] values without source positions — the evaluator knows
//! where it is and locates them.

use crate::ast::{CmpOp, Node};
use crate::env::Env;
use crate::error::{OpError, OpResult};
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::Integer;
use num_traits::{Pow, Signed, ToPrimitive, Zero};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A DI runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Complex(Complex64),
    Str(Rc<String>),
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<IndexMap<String, Value>>>),
    Function(Rc<FunctionValue>),
}

/// Whether a callable is a plain function or a class-as-record-factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Class,
}

/// A first-class callable: parameter names, the body scope, and the
/// environment captured at declaration.
#[derive(Debug)]
pub struct FunctionValue {
    pub params: Vec<String>,
    pub body: Rc<Node>,
    pub closure: Env,
    pub kind: CallableKind,
}

impl Value {
    // -- Constructors --

    pub fn int(value: impl Into<BigInt>) -> Self {
        Value::Int(value.into())
    }

    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(Rc::new(value.into()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn dict(entries: IndexMap<String, Value>) -> Self {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }

    // -- Introspection --

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => !i.is_zero(),
            Value::Float(x) => *x != 0.0 && !x.is_nan(),
            Value::Complex(c) => !c.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Dict(map) => !map.borrow().is_empty(),
            Value::Function(_) => true,
        }
    }

    // -- Arithmetic --

    pub fn add(&self, other: &Value) -> OpResult<Value> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => {
                elementwise("+", &a.borrow(), &b.borrow(), |x, y| x.add(y))
            }
            _ => match numeric_pair(self, other) {
                Some(NumPair::Int(a, b)) => Ok(Value::Int(a + b)),
                Some(NumPair::Float(a, b)) => Ok(Value::Float(a + b)),
                Some(NumPair::Complex(a, b)) => Ok(Value::Complex(a + b)),
                None => Err(binary_type_error("+", self, other)),
            },
        }
    }

    pub fn sub(&self, other: &Value) -> OpResult<Value> {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                elementwise("-", &a.borrow(), &b.borrow(), |x, y| x.sub(y))
            }
            _ => match numeric_pair(self, other) {
                Some(NumPair::Int(a, b)) => Ok(Value::Int(a - b)),
                Some(NumPair::Float(a, b)) => Ok(Value::Float(a - b)),
                Some(NumPair::Complex(a, b)) => Ok(Value::Complex(a - b)),
                None => Err(binary_type_error("-", self, other)),
            },
        }
    }

    pub fn mul(&self, other: &Value) -> OpResult<Value> {
        match (self, other) {
            (Value::Str(s), Value::Int(_) | Value::Bool(_)) => {
                let count = repeat_count(other);
                Ok(Value::str(s.repeat(count)))
            }
            (Value::List(a), Value::List(b)) => {
                elementwise("*", &a.borrow(), &b.borrow(), |x, y| x.mul(y))
            }
            // A list is scaled elementwise by an integer, not repeated.
            (Value::List(a), Value::Int(_) | Value::Bool(_)) => {
                elementwise_unary(&a.borrow(), |x| x.mul(other))
            }
            _ => match numeric_pair(self, other) {
                Some(NumPair::Int(a, b)) => Ok(Value::Int(a * b)),
                Some(NumPair::Float(a, b)) => Ok(Value::Float(a * b)),
                Some(NumPair::Complex(a, b)) => Ok(Value::Complex(a * b)),
                None => Err(binary_type_error("*", self, other)),
            },
        }
    }

    pub fn div(&self, other: &Value) -> OpResult<Value> {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                elementwise("/", &a.borrow(), &b.borrow(), |x, y| x.div(y))
            }
            _ => match numeric_pair(self, other) {
                Some(NumPair::Int(a, b)) => {
                    if b.is_zero() {
                        return Err(div_by_zero("/"));
                    }
                    Ok(Value::Float(big_to_f64(&a) / big_to_f64(&b)))
                }
                Some(NumPair::Float(a, b)) => {
                    if b == 0.0 {
                        return Err(div_by_zero("/"));
                    }
                    Ok(Value::Float(a / b))
                }
                Some(NumPair::Complex(a, b)) => {
                    if b.is_zero() {
                        return Err(div_by_zero("/"));
                    }
                    Ok(Value::Complex(a / b))
                }
                None => Err(binary_type_error("/", self, other)),
            },
        }
    }

    pub fn floordiv(&self, other: &Value) -> OpResult<Value> {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                elementwise("//", &a.borrow(), &b.borrow(), |x, y| x.floordiv(y))
            }
            _ => match numeric_pair(self, other) {
                Some(NumPair::Int(a, b)) => {
                    if b.is_zero() {
                        return Err(div_by_zero("//"));
                    }
                    Ok(Value::Int(a.div_floor(&b)))
                }
                Some(NumPair::Float(a, b)) => {
                    if b == 0.0 {
                        return Err(div_by_zero("//"));
                    }
                    Ok(Value::Float((a / b).floor()))
                }
                Some(NumPair::Complex(_, _)) => Err(OpError::type_error(
                    "cannot take the floor of a complex number",
                )),
                None => Err(binary_type_error("//", self, other)),
            },
        }
    }

    /// Floored remainder: the result takes the sign of the divisor.
    pub fn rem(&self, other: &Value) -> OpResult<Value> {
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                elementwise("%", &a.borrow(), &b.borrow(), |x, y| x.rem(y))
            }
            _ => match numeric_pair(self, other) {
                Some(NumPair::Int(a, b)) => {
                    if b.is_zero() {
                        return Err(div_by_zero("%"));
                    }
                    Ok(Value::Int(a.mod_floor(&b)))
                }
                Some(NumPair::Float(a, b)) => {
                    if b == 0.0 {
                        return Err(div_by_zero("%"));
                    }
                    Ok(Value::Float(a - b * (a / b).floor()))
                }
                Some(NumPair::Complex(_, _)) => {
                    Err(OpError::type_error("cannot take the modulo of a complex number"))
                }
                None => Err(binary_type_error("%", self, other)),
            },
        }
    }

    /// Exponentiation. A negative base with a non-integral exponent promotes
    /// to a complex result.
    pub fn pow(&self, other: &Value) -> OpResult<Value> {
        if let (Value::List(a), Value::List(b)) = (self, other) {
            return elementwise("**", &a.borrow(), &b.borrow(), |x, y| x.pow(y));
        }
        match numeric_pair(self, other) {
            Some(NumPair::Int(base, exp)) => {
                if exp.is_negative() {
                    if base.is_zero() {
                        return Err(OpError::zero_division(
                            "0 cannot be raised to a negative power",
                        ));
                    }
                    return float_pow(big_to_f64(&base), big_to_f64(&exp));
                }
                match exp.to_u32() {
                    Some(e) => Ok(Value::Int(Pow::pow(&base, e))),
                    None => Err(OpError::value_error("exponent too large")),
                }
            }
            Some(NumPair::Float(base, exp)) => {
                if base == 0.0 && exp < 0.0 {
                    return Err(OpError::zero_division(
                        "0.0 cannot be raised to a negative power",
                    ));
                }
                float_pow(base, exp)
            }
            Some(NumPair::Complex(base, exp)) => {
                if base.is_zero() {
                    if exp.is_zero() {
                        return Ok(Value::Complex(Complex64::new(1.0, 0.0)));
                    }
                    if exp.im == 0.0 && exp.re > 0.0 {
                        return Ok(Value::Complex(Complex64::new(0.0, 0.0)));
                    }
                    return Err(OpError::zero_division(
                        "0 cannot be raised to a negative or complex power",
                    ));
                }
                Ok(Value::Complex(base.powc(exp)))
            }
            None => Err(binary_type_error("**", self, other)),
        }
    }

    /// Matrix multiplication over rectangular lists of lists.
    pub fn matmul(&self, other: &Value) -> OpResult<Value> {
        let (a, b) = match (self, other) {
            (Value::List(a), Value::List(b)) => (a, b),
            _ => return Err(binary_type_error("@", self, other)),
        };
        let rows_a = matrix_rows(&a.borrow())?;
        let rows_b = matrix_rows(&b.borrow())?;
        let n = rows_a.len();
        let k = rows_a.first().map_or(0, Vec::len);
        let kb = rows_b.len();
        let m = rows_b.first().map_or(0, Vec::len);
        if k == 0 || k != kb {
            return Err(OpError::value_error(format!(
                "incompatible dimensions for matrices: {n}x{k} and {kb}x{m}"
            )));
        }
        let mut out = Vec::with_capacity(n);
        for row in &rows_a {
            let mut out_row = Vec::with_capacity(m);
            for j in 0..m {
                let mut acc = row[0].mul(&rows_b[0][j])?;
                for t in 1..k {
                    acc = acc.add(&row[t].mul(&rows_b[t][j])?)?;
                }
                out_row.push(acc);
            }
            out.push(Value::list(out_row));
        }
        Ok(Value::list(out))
    }

    // -- Bitwise --

    pub fn bitand(&self, other: &Value) -> OpResult<Value> {
        if let (Value::List(a), Value::List(b)) = (self, other) {
            return elementwise("&", &a.borrow(), &b.borrow(), |x, y| x.bitand(y));
        }
        match (to_bigint(self), to_bigint(other)) {
            (Some(a), Some(b)) => Ok(Value::Int(a & b)),
            _ => Err(binary_type_error("&", self, other)),
        }
    }

    pub fn bitor(&self, other: &Value) -> OpResult<Value> {
        if let (Value::List(a), Value::List(b)) = (self, other) {
            return elementwise("|", &a.borrow(), &b.borrow(), |x, y| x.bitor(y));
        }
        match (to_bigint(self), to_bigint(other)) {
            (Some(a), Some(b)) => Ok(Value::Int(a | b)),
            _ => Err(binary_type_error("|", self, other)),
        }
    }

    pub fn bitxor(&self, other: &Value) -> OpResult<Value> {
        if let (Value::List(a), Value::List(b)) = (self, other) {
            return elementwise("^", &a.borrow(), &b.borrow(), |x, y| x.bitxor(y));
        }
        match (to_bigint(self), to_bigint(other)) {
            (Some(a), Some(b)) => Ok(Value::Int(a ^ b)),
            _ => Err(binary_type_error("^", self, other)),
        }
    }

    pub fn shl(&self, other: &Value) -> OpResult<Value> {
        if let (Value::List(a), Value::List(b)) = (self, other) {
            return elementwise("<<", &a.borrow(), &b.borrow(), |x, y| x.shl(y));
        }
        match (to_bigint(self), to_bigint(other)) {
            (Some(a), Some(b)) => Ok(Value::Int(a << shift_count(&b)?)),
            _ => Err(binary_type_error("<<", self, other)),
        }
    }

    pub fn shr(&self, other: &Value) -> OpResult<Value> {
        if let (Value::List(a), Value::List(b)) = (self, other) {
            return elementwise(">>", &a.borrow(), &b.borrow(), |x, y| x.shr(y));
        }
        match (to_bigint(self), to_bigint(other)) {
            (Some(a), Some(b)) => Ok(Value::Int(a >> shift_count(&b)?)),
            _ => Err(binary_type_error(">>", self, other)),
        }
    }

    // -- Unary --

    pub fn neg(&self) -> OpResult<Value> {
        match self {
            Value::Bool(b) => Ok(Value::int(-(*b as i64))),
            Value::Int(i) => Ok(Value::Int(-i.clone())),
            Value::Float(x) => Ok(Value::Float(-*x)),
            Value::Complex(c) => Ok(Value::Complex(-*c)),
            Value::List(items) => elementwise_unary(&items.borrow(), |v| v.neg()),
            _ => Err(unary_type_error("-", self)),
        }
    }

    pub fn plus(&self) -> OpResult<Value> {
        match self {
            Value::Bool(b) => Ok(Value::int(*b as i64)),
            Value::Int(_) | Value::Float(_) | Value::Complex(_) => Ok(self.clone()),
            Value::List(items) => elementwise_unary(&items.borrow(), |v| v.plus()),
            _ => Err(unary_type_error("+", self)),
        }
    }

    pub fn invert(&self) -> OpResult<Value> {
        match self {
            Value::Bool(b) => Ok(Value::int(-(*b as i64) - 1)),
            Value::Int(i) => Ok(Value::Int(-(i.clone() + BigInt::from(1)))),
            Value::List(items) => elementwise_unary(&items.borrow(), |v| v.invert()),
            _ => Err(unary_type_error("~", self)),
        }
    }

    pub fn not(&self) -> Value {
        Value::Bool(!self.is_truthy())
    }

    /// The `#` prefix: number of characters, elements, or entries.
    pub fn length(&self) -> OpResult<Value> {
        match self {
            Value::Str(s) => Ok(Value::int(s.chars().count() as i64)),
            Value::List(items) => Ok(Value::int(items.borrow().len() as i64)),
            Value::Dict(map) => Ok(Value::int(map.borrow().len() as i64)),
            _ => Err(OpError::type_error(format!(
                "object of type '{}' has no length",
                self.type_name()
            ))),
        }
    }

    // -- Comparison --

    /// Equality across the numeric tower and structurally for containers.
    /// Functions compare by identity; mismatched types are unequal, never
    /// an error.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v.equals(w)))
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => match numeric_pair(self, other) {
                Some(NumPair::Int(a, b)) => a == b,
                Some(NumPair::Float(a, b)) => a == b,
                Some(NumPair::Complex(a, b)) => a == b,
                None => false,
            },
        }
    }

    /// One link of a comparison chain.
    pub fn compare(&self, op: CmpOp, other: &Value) -> OpResult<bool> {
        match op {
            CmpOp::Eq => return Ok(self.equals(other)),
            CmpOp::Ne => return Ok(!self.equals(other)),
            _ => {}
        }
        let ord = self.ordering(op, other)?;
        Ok(match ord {
            Some(Ordering::Less) => matches!(op, CmpOp::Lt | CmpOp::Le),
            Some(Ordering::Equal) => matches!(op, CmpOp::Le | CmpOp::Ge),
            Some(Ordering::Greater) => matches!(op, CmpOp::Gt | CmpOp::Ge),
            // NaN compares false against everything.
            None => false,
        })
    }

    fn ordering(&self, op: CmpOp, other: &Value) -> OpResult<Option<Ordering>> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            (Value::List(a), Value::List(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                for (x, y) in a.iter().zip(b.iter()) {
                    if x.equals(y) {
                        continue;
                    }
                    return x.ordering(op, y);
                }
                Ok(Some(a.len().cmp(&b.len())))
            }
            _ => match numeric_pair(self, other) {
                Some(NumPair::Int(a, b)) => Ok(Some(a.cmp(&b))),
                Some(NumPair::Float(a, b)) => Ok(a.partial_cmp(&b)),
                Some(NumPair::Complex(_, _)) | None => Err(OpError::type_error(format!(
                    "'{op}' not supported between '{}' and '{}'",
                    self.type_name(),
                    other.type_name()
                ))),
            },
        }
    }

    // -- Subscripting and attributes --

    pub fn index(&self, idx: &Value) -> OpResult<Value> {
        match self {
            Value::List(items) => {
                let items = items.borrow();
                let i = seq_index(items.len(), idx)?;
                Ok(items[i].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = seq_index(chars.len(), idx)?;
                Ok(Value::str(chars[i]))
            }
            Value::Dict(map) => match idx {
                Value::Str(key) => map
                    .borrow()
                    .get(key.as_str())
                    .cloned()
                    .ok_or_else(|| OpError::index(format!("key \"{key}\" not found"))),
                _ => Err(OpError::type_error(format!(
                    "dict keys are strings, not '{}'",
                    idx.type_name()
                ))),
            },
            _ => Err(OpError::type_error(format!(
                "'{}' is not subscriptable",
                self.type_name()
            ))),
        }
    }

    pub fn set_index(&self, idx: &Value, value: Value) -> OpResult<()> {
        match self {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let i = seq_index(items.len(), idx)?;
                items[i] = value;
                Ok(())
            }
            Value::Dict(map) => match idx {
                Value::Str(key) => {
                    map.borrow_mut().insert(key.to_string(), value);
                    Ok(())
                }
                _ => Err(OpError::type_error(format!(
                    "dict keys are strings, not '{}'",
                    idx.type_name()
                ))),
            },
            _ => Err(OpError::type_error(format!(
                "'{}' does not support item assignment",
                self.type_name()
            ))),
        }
    }

    pub fn attr(&self, name: &str) -> OpResult<Value> {
        match self {
            Value::Dict(map) => map
                .borrow()
                .get(name)
                .cloned()
                .ok_or_else(|| OpError::index(format!("no attribute \"{name}\""))),
            _ => Err(OpError::type_error(format!(
                "'{}' has no attributes",
                self.type_name()
            ))),
        }
    }

    pub fn set_attr(&self, name: &str, value: Value) -> OpResult<()> {
        match self {
            Value::Dict(map) => {
                map.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            _ => Err(OpError::type_error(format!(
                "'{}' does not support attribute assignment",
                self.type_name()
            ))),
        }
    }

    /// Quoting, escaping rendering used inside containers and by the REPL.
    pub fn repr(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(true) => "true".to_string(),
            Value::Bool(false) => "false".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(x) => fmt_float(*x),
            Value::Complex(c) => fmt_complex(*c),
            Value::Str(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{escaped}\"")
            }
            Value::List(items) => {
                let inner: Vec<String> = items.borrow().iter().map(Value::repr).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Dict(map) => {
                let inner: Vec<String> = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.repr()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
            Value::Function(f) => {
                let kind = match f.kind {
                    CallableKind::Function => "function",
                    CallableKind::Class => "class",
                };
                format!("<{kind}({})>", f.params.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Top-level strings print bare; nested ones are quoted by repr.
            Value::Str(s) => f.write_str(s),
            _ => f.write_str(&self.repr()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

// -- Numeric promotion helpers --

enum NumPair {
    Int(BigInt, BigInt),
    Float(f64, f64),
    Complex(Complex64, Complex64),
}

fn numeric_rank(v: &Value) -> Option<u8> {
    match v {
        Value::Bool(_) | Value::Int(_) => Some(0),
        Value::Float(_) => Some(1),
        Value::Complex(_) => Some(2),
        _ => None,
    }
}

fn numeric_pair(a: &Value, b: &Value) -> Option<NumPair> {
    let rank = numeric_rank(a)?.max(numeric_rank(b)?);
    match rank {
        0 => Some(NumPair::Int(to_bigint(a)?, to_bigint(b)?)),
        1 => Some(NumPair::Float(to_f64(a)?, to_f64(b)?)),
        _ => Some(NumPair::Complex(to_complex(a)?, to_complex(b)?)),
    }
}

fn to_bigint(v: &Value) -> Option<BigInt> {
    match v {
        Value::Bool(b) => Some(BigInt::from(*b as i64)),
        Value::Int(i) => Some(i.clone()),
        _ => None,
    }
}

fn to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Bool(b) => Some(*b as i64 as f64),
        Value::Int(i) => Some(big_to_f64(i)),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}

fn to_complex(v: &Value) -> Option<Complex64> {
    match v {
        Value::Complex(c) => Some(*c),
        _ => to_f64(v).map(|x| Complex64::new(x, 0.0)),
    }
}

fn big_to_f64(i: &BigInt) -> f64 {
    i.to_f64().unwrap_or(if i.is_negative() {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    })
}

fn float_pow(base: f64, exp: f64) -> OpResult<Value> {
    if base < 0.0 && exp.fract() != 0.0 {
        Ok(Value::Complex(
            Complex64::new(base, 0.0).powc(Complex64::new(exp, 0.0)),
        ))
    } else {
        Ok(Value::Float(base.powf(exp)))
    }
}

fn repeat_count(v: &Value) -> usize {
    match v {
        Value::Bool(b) => *b as usize,
        Value::Int(i) => i.to_usize().unwrap_or(0),
        _ => 0,
    }
}

fn shift_count(b: &BigInt) -> OpResult<usize> {
    if b.is_negative() {
        return Err(OpError::value_error("negative shift count"));
    }
    b.to_usize()
        .ok_or_else(|| OpError::value_error("shift count too large"))
}

fn div_by_zero(op: &str) -> OpError {
    OpError::zero_division(format!("division by zero in '{op}'"))
}

fn binary_type_error(op: &str, a: &Value, b: &Value) -> OpError {
    OpError::type_error(format!(
        "unsupported operand type(s) for {op}: '{}' and '{}'",
        a.type_name(),
        b.type_name()
    ))
}

fn unary_type_error(op: &str, v: &Value) -> OpError {
    OpError::type_error(format!(
        "unsupported operand type for unary {op}: '{}'",
        v.type_name()
    ))
}

fn elementwise(
    op: &str,
    a: &[Value],
    b: &[Value],
    f: impl Fn(&Value, &Value) -> OpResult<Value>,
) -> OpResult<Value> {
    if a.len() != b.len() {
        return Err(OpError::value_error(format!(
            "different operand lengths for {op}: {} and {}",
            a.len(),
            b.len()
        )));
    }
    let items: OpResult<Vec<Value>> = a.iter().zip(b.iter()).map(|(x, y)| f(x, y)).collect();
    Ok(Value::list(items?))
}

fn elementwise_unary(
    items: &[Value],
    f: impl Fn(&Value) -> OpResult<Value>,
) -> OpResult<Value> {
    let mapped: OpResult<Vec<Value>> = items.iter().map(f).collect();
    Ok(Value::list(mapped?))
}

/// Resolve a possibly-negative integer subscript against a sequence length.
fn seq_index(len: usize, idx: &Value) -> OpResult<usize> {
    let i = match idx {
        Value::Int(i) => i.clone(),
        Value::Bool(b) => BigInt::from(*b as i64),
        _ => {
            return Err(OpError::type_error(format!(
                "sequence indices must be integers, not '{}'",
                idx.type_name()
            )))
        }
    };
    let n = len as i128;
    let raw = match i.to_i128() {
        Some(raw) => raw,
        None => return Err(out_of_range(&i, len)),
    };
    let adjusted = if raw < 0 { raw + n } else { raw };
    if adjusted < 0 || adjusted >= n {
        return Err(out_of_range(&i, len));
    }
    Ok(adjusted as usize)
}

fn out_of_range(idx: &BigInt, len: usize) -> OpError {
    if len == 0 {
        OpError::index(format!("index {idx} out of range: the sequence is empty"))
    } else {
        OpError::index(format!(
            "index {idx} out of range: size is {len}, valid indices run from 0 to {} or from -{len} to -1",
            len - 1
        ))
    }
}

fn matrix_rows(items: &[Value]) -> OpResult<Vec<Vec<Value>>> {
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::List(row) => rows.push(row.borrow().clone()),
            _ => {
                return Err(OpError::type_error(
                    "matrix multiplication expects lists of lists",
                ))
            }
        }
    }
    if let Some(first) = rows.first() {
        let width = first.len();
        if rows.iter().any(|row| row.len() != width) {
            return Err(OpError::value_error("matrix rows have unequal lengths"));
        }
    }
    Ok(rows)
}

fn fmt_float(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        let s = if x > 0.0 { "inf" } else { "-inf" };
        s.to_string()
    } else if x == x.trunc() && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

fn fmt_complex(c: Complex64) -> String {
    if c.re == 0.0 {
        format!("{}j", fmt_float(c.im))
    } else if c.im < 0.0 {
        format!("({}-{}j)", fmt_float(c.re), fmt_float(-c.im))
    } else {
        format!("({}+{}j)", fmt_float(c.re), fmt_float(c.im))
    }
}
