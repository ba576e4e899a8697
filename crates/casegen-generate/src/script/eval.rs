//! Tree-walking evaluator.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::builtins;
use super::parser::{BinaryOp, Expr, Program, UnaryOp};
use super::{MAX_CALL_DEPTH, ScriptError, Value};

type Frame = HashMap<String, Value>;

pub(crate) struct Interpreter<'p, 'r> {
    program: &'p Program,
    pub(super) rng: &'r mut dyn rand::RngCore,
    globals: Frame,
    depth: usize,
}

impl<'p, 'r> Interpreter<'p, 'r> {
    pub(crate) fn new(program: &'p Program, rng: &'r mut dyn rand::RngCore) -> Self {
        Self {
            program,
            rng,
            globals: Frame::new(),
            depth: 0,
        }
    }

    /// Evaluate top-level `let` bindings in source order.
    pub(crate) fn bind_globals(&mut self) -> Result<(), ScriptError> {
        let program = self.program;
        let empty = Frame::new();
        for (name, expr) in &program.bindings {
            let value = self.eval(expr, &empty)?;
            self.globals.insert(name.clone(), value);
        }
        Ok(())
    }

    /// Call a user function or builtin by name.
    pub(crate) fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, ScriptError> {
        let program = self.program;
        if let Some(def) = program.function(name) {
            if def.params.len() != args.len() {
                return Err(ScriptError::Arity {
                    name: name.to_string(),
                    expected: def.params.len().to_string(),
                    found: args.len(),
                });
            }
            if self.depth >= MAX_CALL_DEPTH {
                return Err(ScriptError::RecursionLimit(MAX_CALL_DEPTH));
            }
            let frame: Frame = def.params.iter().cloned().zip(args).collect();
            self.depth += 1;
            let result = self.eval(&def.body, &frame);
            self.depth -= 1;
            return result;
        }
        if builtins::is_builtin(name) {
            return builtins::call(self, name, args);
        }
        Err(ScriptError::UnknownName(name.to_string()))
    }

    pub(crate) fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, ScriptError> {
        match callee {
            Value::Func(name) => self.call(name, args),
            other => Err(ScriptError::Type(format!(
                "{} value '{other}' is not callable",
                other.type_name()
            ))),
        }
    }

    fn eval(&mut self, expr: &Expr, frame: &Frame) -> Result<Value, ScriptError> {
        match expr {
            Expr::Int(value) => Ok(Value::Int(*value)),
            Expr::Float(value) => Ok(Value::Float(*value)),
            Expr::Str(value) => Ok(Value::Str(value.clone())),
            Expr::Bool(value) => Ok(Value::Bool(*value)),
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item, frame))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Name(name) => self.lookup(name, frame),
            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, frame))
                    .collect::<Result<Vec<_>, _>>()?;
                match frame.get(name).or_else(|| self.globals.get(name)) {
                    Some(callee) => {
                        let callee = callee.clone();
                        self.call_value(&callee, args)
                    }
                    None => self.call(name, args),
                }
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, frame)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
                    UnaryOp::Neg => match value {
                        Value::Int(v) => v.checked_neg().map(Value::Int).ok_or_else(overflow),
                        Value::Float(v) => Ok(Value::Float(-v)),
                        other => Err(ScriptError::Type(format!(
                            "cannot negate {}",
                            other.type_name()
                        ))),
                    },
                }
            }
            Expr::Binary { op, left, right } => match op {
                BinaryOp::And => {
                    let left = self.eval(left, frame)?;
                    if !left.truthy() {
                        return Ok(left);
                    }
                    self.eval(right, frame)
                }
                BinaryOp::Or => {
                    let left = self.eval(left, frame)?;
                    if left.truthy() {
                        return Ok(left);
                    }
                    self.eval(right, frame)
                }
                _ => {
                    let left = self.eval(left, frame)?;
                    let right = self.eval(right, frame)?;
                    binary(*op, left, right)
                }
            },
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(cond, frame)?.truthy() {
                    self.eval(then_branch, frame)
                } else {
                    self.eval(else_branch, frame)
                }
            }
            Expr::Index { target, index } => {
                let target = self.eval(target, frame)?;
                let index = self.eval(index, frame)?;
                index_value(target, &index)
            }
        }
    }

    fn lookup(&self, name: &str, frame: &Frame) -> Result<Value, ScriptError> {
        if let Some(value) = frame.get(name).or_else(|| self.globals.get(name)) {
            return Ok(value.clone());
        }
        if self.program.function(name).is_some() || builtins::is_builtin(name) {
            return Ok(Value::Func(name.to_string()));
        }
        Err(ScriptError::UnknownName(name.to_string()))
    }
}

fn overflow() -> ScriptError {
    ScriptError::Runtime("integer overflow".to_string())
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> ScriptError {
    ScriptError::Type(format!(
        "unsupported operands for {}: {} and {}",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

pub(super) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(*v),
        _ => None,
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, ScriptError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&left, &right))),
        BinaryOp::Lt => Ok(Value::Bool(compare_values(&left, &right)? == Ordering::Less)),
        BinaryOp::LtEq => Ok(Value::Bool(compare_values(&left, &right)? != Ordering::Greater)),
        BinaryOp::Gt => Ok(Value::Bool(compare_values(&left, &right)? == Ordering::Greater)),
        BinaryOp::GtEq => Ok(Value::Bool(compare_values(&left, &right)? != Ordering::Less)),
        BinaryOp::Add => match (left, right) {
            (Value::Int(a), Value::Int(b)) => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (left, right) => float_op(op, &left, &right, |a, b| a + b),
        },
        BinaryOp::Sub => match (left, right) {
            (Value::Int(a), Value::Int(b)) => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
            (left, right) => float_op(op, &left, &right, |a, b| a - b),
        },
        BinaryOp::Mul => match (left, right) {
            (Value::Int(a), Value::Int(b)) => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
            (Value::Str(text), Value::Int(n)) | (Value::Int(n), Value::Str(text)) => {
                builtins::repeat_str(&text, n).map(Value::Str)
            }
            (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
                builtins::repeat_list(&items, n).map(Value::List)
            }
            (left, right) => float_op(op, &left, &right, |a, b| a * b),
        },
        BinaryOp::Div => {
            let (a, b) = numeric_pair(op, &left, &right)?;
            if b == 0.0 {
                return Err(ScriptError::Runtime("division by zero".to_string()));
            }
            Ok(Value::Float(a / b))
        }
        BinaryOp::Rem => match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                if b == 0 {
                    return Err(ScriptError::Runtime("modulo by zero".to_string()));
                }
                let rem = a.checked_rem(b).ok_or_else(overflow)?;
                Ok(Value::Int(if rem != 0 && (rem < 0) != (b < 0) {
                    rem + b
                } else {
                    rem
                }))
            }
            (left, right) => {
                let (a, b) = numeric_pair(op, &left, &right)?;
                if b == 0.0 {
                    return Err(ScriptError::Runtime("modulo by zero".to_string()));
                }
                let rem = a % b;
                Ok(Value::Float(if rem != 0.0 && (rem < 0.0) != (b < 0.0) {
                    rem + b
                } else {
                    rem
                }))
            }
        },
        BinaryOp::And | BinaryOp::Or => Err(unsupported(op, &left, &right)),
    }
}

fn numeric_pair(op: BinaryOp, left: &Value, right: &Value) -> Result<(f64, f64), ScriptError> {
    match (as_f64(left), as_f64(right)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(unsupported(op, left, right)),
    }
}

fn float_op(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    apply: impl Fn(f64, f64) -> f64,
) -> Result<Value, ScriptError> {
    let (a, b) = numeric_pair(op, left, right)?;
    Ok(Value::Float(apply(a, b)))
}

/// Equality with numeric cross-type comparison (`1 == 1.0`).
pub(super) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => match (as_f64(left), as_f64(right)) {
            (Some(a), Some(b)) => a == b,
            _ => left == right,
        },
    }
}

/// Ordering for numbers, strings and lists of comparable values.
pub(super) fn compare_values(left: &Value, right: &Value) -> Result<Ordering, ScriptError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::List(a), Value::List(b)) => {
            for (x, y) in a.iter().zip(b) {
                let ordering = compare_values(x, y)?;
                if ordering != Ordering::Equal {
                    return Ok(ordering);
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => match (as_f64(left), as_f64(right)) {
            (Some(a), Some(b)) => a.partial_cmp(&b).ok_or_else(|| {
                ScriptError::Runtime("cannot order NaN".to_string())
            }),
            _ => Err(ScriptError::Type(format!(
                "cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

fn index_value(target: Value, index: &Value) -> Result<Value, ScriptError> {
    let Value::Int(raw) = index else {
        return Err(ScriptError::Type(format!(
            "index must be an int, got {}",
            index.type_name()
        )));
    };
    let resolve = |len: usize| -> Result<usize, ScriptError> {
        let len_i = i64::try_from(len).unwrap_or(i64::MAX);
        let idx = if *raw < 0 { len_i + raw } else { *raw };
        if idx < 0 || idx >= len_i {
            return Err(ScriptError::Runtime(format!(
                "index {raw} out of range for length {len}"
            )));
        }
        Ok(idx as usize)
    };
    match target {
        Value::List(mut items) => {
            let idx = resolve(items.len())?;
            Ok(items.swap_remove(idx))
        }
        Value::Str(text) => {
            let chars: Vec<char> = text.chars().collect();
            let idx = resolve(chars.len())?;
            Ok(Value::Str(chars[idx].to_string()))
        }
        other => Err(ScriptError::Type(format!(
            "{} is not indexable",
            other.type_name()
        ))),
    }
}
