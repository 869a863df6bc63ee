use super::Operation;

use crate::schema::db::TableId;

/// Asks the connection for the key its most recent insert generated.
///
/// Issued only for backends without `INSERT ... RETURNING`. The response is
/// a single row with the key under `primary_key`.
#[derive(Debug, Clone)]
pub struct LastInsertKey {
    /// The table the preceding insert targeted
    pub table: TableId,

    /// Name of the key column in the returned row
    pub primary_key: String,
}

impl From<LastInsertKey> for Operation {
    fn from(value: LastInsertKey) -> Self {
        Self::LastInsertKey(value)
    }
}
