use super::Expr;
use crate::schema::db::TableId;

/// A reference to a column, optionally qualified by its table.
///
/// Unqualified references are resolved against the kind's table ownership
/// map before a query is executed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprColumn {
    pub table: Option<TableId>,
    pub column: String,
}

impl ExprColumn {
    pub fn new(table: TableId, column: impl Into<String>) -> Self {
        Self {
            table: Some(table),
            column: column.into(),
        }
    }

    pub fn unqualified(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.table.is_some()
    }
}

impl Expr {
    /// A column of `table`.
    pub fn column(table: TableId, column: impl Into<String>) -> Self {
        ExprColumn::new(table, column).into()
    }

    /// A column that is qualified later, against the queried kind.
    pub fn attr(column: impl Into<String>) -> Self {
        ExprColumn::unqualified(column).into()
    }

    pub fn as_column(&self) -> Option<&ExprColumn> {
        match self {
            Self::Column(expr) => Some(expr),
            _ => None,
        }
    }
}

impl From<ExprColumn> for Expr {
    fn from(value: ExprColumn) -> Self {
        Self::Column(value)
    }
}
