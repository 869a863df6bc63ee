use super::Expr;
use crate::schema::db::TableId;

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// The table to join
    pub table: TableId,

    /// The join condition
    pub constraint: JoinOp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinOp {
    Inner(Expr),
}
