use super::{Delete, Insert, Select, Update};
use crate::schema::db::TableId;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Delete(Delete),
    Insert(Insert),
    Query(Select),
    Update(Update),
}

impl Statement {
    /// The table the statement targets (the `FROM` table for queries).
    pub fn table(&self) -> TableId {
        match self {
            Self::Delete(stmt) => stmt.table,
            Self::Insert(stmt) => stmt.table,
            Self::Query(stmt) => stmt.first_source(),
            Self::Update(stmt) => stmt.table,
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}
