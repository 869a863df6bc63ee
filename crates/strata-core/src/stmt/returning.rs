use super::ExprColumn;
use crate::schema::db::TableId;

#[derive(Debug, Clone, PartialEq)]
pub enum Returning {
    /// `*`: every column of every table in the source
    Star,

    /// An explicit, ordered column list
    Columns(Vec<ExprColumn>),
}

impl Returning {
    pub fn is_star(&self) -> bool {
        matches!(self, Self::Star)
    }

    pub fn as_columns(&self) -> Option<&[ExprColumn]> {
        match self {
            Self::Columns(columns) => Some(columns),
            Self::Star => None,
        }
    }

    /// Columns of `table` qualified by the table, in order.
    pub fn qualified<S: AsRef<str>>(table: TableId, columns: &[S]) -> Self {
        Self::Columns(
            columns
                .iter()
                .map(|column| ExprColumn::new(table, column.as_ref()))
                .collect(),
        )
    }
}
