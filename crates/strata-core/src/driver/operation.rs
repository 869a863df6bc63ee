mod last_insert_key;
pub use last_insert_key::LastInsertKey;

use crate::stmt;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Run a dataset and stream its rows
    Query(stmt::Select),

    /// Insert one row, optionally returning it
    Insert(stmt::Insert),

    /// Update rows matching the filter
    Update(stmt::Update),

    /// Delete rows matching the filter
    Delete(stmt::Delete),

    /// Fetch the key generated by the connection's most recent insert
    LastInsertKey(LastInsertKey),
}

impl Operation {
    /// The table the operation targets
    pub fn table(&self) -> crate::schema::db::TableId {
        match self {
            Self::Query(stmt) => stmt.first_source(),
            Self::Insert(stmt) => stmt.table,
            Self::Update(stmt) => stmt.table,
            Self::Delete(stmt) => stmt.table,
            Self::LastInsertKey(op) => op.table,
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert(_))
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update(_))
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }

    /// Converts the operation into the SQL statement it runs, if any.
    pub fn into_statement(self) -> Option<stmt::Statement> {
        match self {
            Self::Query(stmt) => Some(stmt.into()),
            Self::Insert(stmt) => Some(stmt.into()),
            Self::Update(stmt) => Some(stmt.into()),
            Self::Delete(stmt) => Some(stmt.into()),
            Self::LastInsertKey(_) => None,
        }
    }
}

impl From<stmt::Select> for Operation {
    fn from(value: stmt::Select) -> Self {
        Self::Query(value)
    }
}

impl From<stmt::Insert> for Operation {
    fn from(value: stmt::Insert) -> Self {
        Self::Insert(value)
    }
}

impl From<stmt::Update> for Operation {
    fn from(value: stmt::Update) -> Self {
        Self::Update(value)
    }
}

impl From<stmt::Delete> for Operation {
    fn from(value: stmt::Delete) -> Self {
        Self::Delete(value)
    }
}
