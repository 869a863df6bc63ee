use super::{Expr, Value};

/// `expr IN (v1, v2, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub expr: Box<Expr>,
    pub list: Vec<Value>,
}

impl Expr {
    pub fn in_list(expr: impl Into<Self>, list: impl IntoIterator<Item = Value>) -> Self {
        ExprInList {
            expr: Box::new(expr.into()),
            list: list.into_iter().collect(),
        }
        .into()
    }
}

impl From<ExprInList> for Expr {
    fn from(value: ExprInList) -> Self {
        Self::InList(value)
    }
}
