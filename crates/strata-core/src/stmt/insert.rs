use super::{Returning, Statement, Value};
use crate::schema::db::TableId;

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// Table to insert into
    pub table: TableId,

    /// Column names, parallel to `values`
    pub columns: Vec<String>,

    pub values: Vec<Value>,

    /// When set, the inserted row is returned (`INSERT ... RETURNING`).
    pub returning: Option<Returning>,
}

impl Insert {
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            columns: vec![],
            values: vec![],
            returning: None,
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push(column.into());
        self.values.push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
