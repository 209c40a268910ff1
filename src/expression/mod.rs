//! Restricted expression language used by `filter_rows` and `feature_engineering`.
//!
//! Expressions are tokenized and parsed once per step into a small AST, then evaluated against
//! each row. Nothing is ever substituted into source text, and any character outside the grammar
//! rejects the whole expression before a single row is evaluated.
//!
//! Two grammars share the tokenizer and evaluator:
//!
//! - [`Condition`]: comparisons, `AND`/`OR`/`NOT` (also `&&`, `||`, `!`), arithmetic, string,
//!   number, boolean and `null` literals. Column names resolve to the row's cell.
//! - [`Formula`]: numbers, column names, `+ - * / %` and parentheses only. Column names resolve to
//!   the cell's numeric reading, `0` when it is not numeric.
//!
//! Column names are bare identifiers (`unit_price`, `user.age`) or back-quoted
//! (`` `unit price` ``).
//!
//! ```rust
//! use rust_data_transform::expression::{Condition, Formula};
//! use rust_data_transform::types::{Record, Value};
//!
//! let row: Record = [("price", Value::from(4)), ("qty", Value::from("3"))]
//!     .into_iter()
//!     .collect();
//!
//! let cond = Condition::parse("price > 3 AND qty == 3").unwrap();
//! assert!(cond.matches(&row));
//!
//! let total = Formula::parse("price * qty").unwrap();
//! assert_eq!(total.evaluate(&row), Ok(12.0));
//! ```

mod ast;
mod eval;
mod lexer;
mod parser;

use crate::error::ExpressionError;
use crate::types::{Record, Value};

use ast::Expression;
use eval::{truthy, Columns, Interpreter};
use parser::{parse, Grammar};

/// A parsed row filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    expr: Expression,
}

impl Condition {
    /// Parse a condition. Fails on any token outside the condition grammar.
    pub fn parse(input: &str) -> Result<Self, ExpressionError> {
        Ok(Self {
            expr: parse(input, Grammar::Condition)?,
        })
    }

    /// Evaluate against a row and return its truthiness.
    ///
    /// Errors are row-level: an unknown column or incomparable operands.
    pub fn evaluate(&self, row: &Record) -> Result<bool, ExpressionError> {
        let v = Interpreter::new(row, Columns::Raw).evaluate(&self.expr)?;
        Ok(truthy(&v))
    }

    /// `true` only if the condition evaluates without error to a truthy value.
    pub fn matches(&self, row: &Record) -> bool {
        self.evaluate(row).unwrap_or(false)
    }
}

/// A parsed arithmetic formula for derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: Expression,
}

impl Formula {
    /// Parse a formula. Fails on any token outside the arithmetic grammar.
    pub fn parse(input: &str) -> Result<Self, ExpressionError> {
        Ok(Self {
            expr: parse(input, Grammar::Formula)?,
        })
    }

    /// Evaluate against a row.
    ///
    /// Fails if a referenced column is absent from the row or the result is not finite.
    pub fn evaluate(&self, row: &Record) -> Result<f64, ExpressionError> {
        let v = Interpreter::new(row, Columns::NumericOrZero).evaluate(&self.expr)?;
        match v {
            Value::Number(n) if n.is_finite() => Ok(n),
            other => Err(ExpressionError::TypeMismatch {
                message: format!("formula produced a non-finite result '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Condition, Formula};
    use crate::error::ExpressionError;
    use crate::types::{Record, Value};

    fn row() -> Record {
        [
            ("age", Value::from(30)),
            ("name", Value::from("Ada")),
            ("score", Value::from("7.5")),
            ("active", Value::from(true)),
            ("note", Value::Null),
            ("unit price", Value::from(2)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn numeric_comparisons() {
        let r = row();
        assert!(Condition::parse("age > 18").unwrap().matches(&r));
        assert!(Condition::parse("age >= 30 AND age <= 30").unwrap().matches(&r));
        assert!(!Condition::parse("age < 18").unwrap().matches(&r));
        assert!(Condition::parse("score > 7").unwrap().matches(&r));
        assert!(Condition::parse("age == '30'").unwrap().matches(&r));
    }

    #[test]
    fn text_and_boolean_comparisons() {
        let r = row();
        assert!(Condition::parse("name == \"Ada\"").unwrap().matches(&r));
        assert!(Condition::parse("name != 'Grace' && active").unwrap().matches(&r));
        assert!(Condition::parse("name < 'B'").unwrap().matches(&r));
        assert!(Condition::parse("active == true").unwrap().matches(&r));
        assert!(Condition::parse("note == null").unwrap().matches(&r));
        assert!(Condition::parse("NOT (age < 18) or false").unwrap().matches(&r));
    }

    #[test]
    fn identifiers_are_whole_tokens() {
        let r: Record = [("a", Value::from(1)), ("ab", Value::from(5))].into_iter().collect();
        assert!(Condition::parse("ab == 5 AND a == 1").unwrap().matches(&r));
    }

    #[test]
    fn row_errors_do_not_match() {
        let r = row();
        let cond = Condition::parse("missing > 1").unwrap();
        assert_eq!(
            cond.evaluate(&r),
            Err(ExpressionError::UnknownColumn {
                name: "missing".to_string()
            })
        );
        assert!(!cond.matches(&r));
        assert!(!Condition::parse("active > 1").unwrap().matches(&r));
    }

    #[test]
    fn condition_rejects_unknown_characters_up_front() {
        assert!(Condition::parse("age > 1; rm").is_err());
        assert!(Condition::parse("age > $x").is_err());
        assert!(Condition::parse("").is_err());
    }

    #[test]
    fn formula_arithmetic_with_zero_for_non_numeric() {
        let r = row();
        assert_eq!(Formula::parse("age * 2 + 1").unwrap().evaluate(&r), Ok(61.0));
        assert_eq!(Formula::parse("score * 2").unwrap().evaluate(&r), Ok(15.0));
        assert_eq!(Formula::parse("name + 1").unwrap().evaluate(&r), Ok(1.0));
        assert_eq!(Formula::parse("-(age - 40) % 7").unwrap().evaluate(&r), Ok(3.0));
        assert_eq!(Formula::parse("`unit price` * 3").unwrap().evaluate(&r), Ok(6.0));
    }

    #[test]
    fn formula_row_failures() {
        let r = row();
        assert!(Formula::parse("age / 0").unwrap().evaluate(&r).is_err());
        assert!(Formula::parse("absent + 1").unwrap().evaluate(&r).is_err());
    }

    #[test]
    fn formula_rejects_conditions_and_strings() {
        assert!(Formula::parse("age > 1").is_err());
        assert!(Formula::parse("'a'").is_err());
        assert!(Formula::parse("age AND 1").is_err());
    }
}
