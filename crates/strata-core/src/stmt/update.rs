use super::{Expr, Statement, Value};
use crate::schema::db::TableId;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Table to update
    pub table: TableId,

    /// Column assignments, in order
    pub assignments: IndexMap<String, Value>,

    /// Which rows to update
    pub filter: Expr,
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Self::Update(value)
    }
}
