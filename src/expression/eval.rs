use std::cmp::Ordering;

use crate::error::ExpressionError;
use crate::types::{Record, Value};

use super::ast::{BinaryOperator, Expression, UnaryOperator};

/// How column references resolve against a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Columns {
    /// The cell as stored.
    Raw,
    /// The numeric reading of the cell, `0` when it is not numeric.
    NumericOrZero,
}

pub(crate) struct Interpreter<'r> {
    row: &'r Record,
    columns: Columns,
}

impl<'r> Interpreter<'r> {
    pub(crate) fn new(row: &'r Record, columns: Columns) -> Self {
        Self { row, columns }
    }

    pub(crate) fn evaluate(&self, expr: &Expression) -> Result<Value, ExpressionError> {
        match expr {
            Expression::Literal(v) => Ok(v.clone()),
            Expression::Column(name) => self.evaluate_column(name),
            Expression::Unary { operator, operand } => self.evaluate_unary(*operator, operand),
            Expression::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, *operator, right),
        }
    }

    fn evaluate_column(&self, name: &str) -> Result<Value, ExpressionError> {
        let cell = self.row.get(name).ok_or_else(|| ExpressionError::UnknownColumn {
            name: name.to_string(),
        })?;
        Ok(match self.columns {
            Columns::Raw => cell.clone(),
            Columns::NumericOrZero => Value::Number(cell.as_f64().unwrap_or(0.0)),
        })
    }

    fn evaluate_unary(
        &self,
        operator: UnaryOperator,
        operand: &Expression,
    ) -> Result<Value, ExpressionError> {
        let v = self.evaluate(operand)?;
        match operator {
            UnaryOperator::Not => Ok(Value::Bool(!truthy(&v))),
            UnaryOperator::Negate => Ok(Value::Number(-numeric(&v, "-")?)),
        }
    }

    fn evaluate_binary(
        &self,
        left: &Expression,
        operator: BinaryOperator,
        right: &Expression,
    ) -> Result<Value, ExpressionError> {
        // Logical operators short-circuit.
        let (l, r) = match operator {
            BinaryOperator::And => {
                let holds = truthy(&self.evaluate(left)?) && truthy(&self.evaluate(right)?);
                return Ok(Value::Bool(holds));
            }
            BinaryOperator::Or => {
                let holds = truthy(&self.evaluate(left)?) || truthy(&self.evaluate(right)?);
                return Ok(Value::Bool(holds));
            }
            _ => (self.evaluate(left)?, self.evaluate(right)?),
        };

        match operator {
            BinaryOperator::And | BinaryOperator::Or => Ok(Value::Bool(truthy(&l) && truthy(&r))),
            BinaryOperator::Add => add(&l, &r),
            BinaryOperator::Subtract => Ok(Value::Number(numeric(&l, "-")? - numeric(&r, "-")?)),
            BinaryOperator::Multiply => Ok(Value::Number(numeric(&l, "*")? * numeric(&r, "*")?)),
            BinaryOperator::Divide => Ok(Value::Number(numeric(&l, "/")? / numeric(&r, "/")?)),
            BinaryOperator::Remainder => Ok(Value::Number(numeric(&l, "%")? % numeric(&r, "%")?)),
            BinaryOperator::Equal => Ok(Value::Bool(loose_eq(&l, &r))),
            BinaryOperator::NotEqual => Ok(Value::Bool(!loose_eq(&l, &r))),
            BinaryOperator::LessThan => Ok(Value::Bool(compare(&l, &r)? == Some(Ordering::Less))),
            BinaryOperator::LessThanOrEqual => Ok(Value::Bool(matches!(
                compare(&l, &r)?,
                Some(Ordering::Less | Ordering::Equal)
            ))),
            BinaryOperator::GreaterThan => {
                Ok(Value::Bool(compare(&l, &r)? == Some(Ordering::Greater)))
            }
            BinaryOperator::GreaterThanOrEqual => Ok(Value::Bool(matches!(
                compare(&l, &r)?,
                Some(Ordering::Greater | Ordering::Equal)
            ))),
        }
    }
}

/// Truthiness of a result: `true`, non-zero numbers and non-empty text.
pub(crate) fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::Utf8(s) | Value::Date(s) => !s.is_empty(),
    }
}

fn numeric(v: &Value, op: &str) -> Result<f64, ExpressionError> {
    v.as_f64().ok_or_else(|| ExpressionError::TypeMismatch {
        message: format!("operator '{op}' needs numbers, got '{v}'"),
    })
}

fn add(l: &Value, r: &Value) -> Result<Value, ExpressionError> {
    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        return Ok(Value::Number(a + b));
    }
    if l.as_text().is_some() || r.as_text().is_some() {
        return Ok(Value::Utf8(format!("{}{}", l.to_text(), r.to_text())));
    }
    Err(ExpressionError::TypeMismatch {
        message: format!("cannot add '{l}' and '{r}'"),
    })
}

fn loose_eq(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(_), _) | (_, Value::Number(_)) => match (l.as_f64(), r.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => match (l.as_text(), r.as_text()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn compare(l: &Value, r: &Value) -> Result<Option<Ordering>, ExpressionError> {
    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        return Ok(a.partial_cmp(&b));
    }
    if let (Some(a), Some(b)) = (l.as_text(), r.as_text()) {
        return Ok(Some(a.cmp(b)));
    }
    Err(ExpressionError::TypeMismatch {
        message: format!("cannot order '{l}' and '{r}'"),
    })
}
