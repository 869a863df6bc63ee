use super::{ExprAnd, ExprBinaryOp, ExprColumn, ExprInList, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of binary expressions
    And(ExprAnd),

    /// Binary expression
    BinaryOp(ExprBinaryOp),

    /// References a column
    Column(ExprColumn),

    /// In list
    InList(ExprInList),

    /// A constant value
    Value(Value),
}

impl Expr {
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// Visits every column reference in the expression.
    pub fn for_each_column_mut(&mut self, f: &mut impl FnMut(&mut ExprColumn)) {
        match self {
            Self::And(expr) => {
                for operand in &mut expr.operands {
                    operand.for_each_column_mut(f);
                }
            }
            Self::BinaryOp(expr) => {
                expr.lhs.for_each_column_mut(f);
                expr.rhs.for_each_column_mut(f);
            }
            Self::Column(expr) => f(expr),
            Self::InList(expr) => expr.expr.for_each_column_mut(f),
            Self::Value(_) => {}
        }
    }

}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Self::Value(value.into())
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}
