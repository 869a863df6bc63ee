use super::{Expr, Statement};
use crate::schema::db::TableId;

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Table to delete from
    pub table: TableId,

    /// Which rows to delete
    pub filter: Expr,
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Self::Delete(value)
    }
}
