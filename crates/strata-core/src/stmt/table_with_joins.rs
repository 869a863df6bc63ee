use super::Join;
use crate::schema::db::TableId;

#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    /// The first table in the `FROM` clause
    pub table: TableId,

    /// Joins to apply, in order
    pub joins: Vec<Join>,
}

impl TableWithJoins {
    /// Every table referenced by the source, starting with the `FROM` table.
    pub fn tables(&self) -> impl Iterator<Item = TableId> + '_ {
        std::iter::once(self.table).chain(self.joins.iter().map(|join| join.table))
    }
}
