use super::{Expr, ExprColumn, Join, JoinOp, Returning, Statement, TableWithJoins};
use crate::schema::db::TableId;

/// A dataset: a projection over a table and its joins, optionally filtered.
///
/// Builder methods consume and return the select so datasets can be derived
/// from one another without mutating the original.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// The projection part of a SQL query.
    pub returning: Returning,

    /// The `FROM` part of a SQL query.
    pub source: TableWithJoins,

    /// Query filter
    pub filter: Option<Expr>,
}

impl Select {
    /// `SELECT * FROM table`
    pub fn from_table(table: TableId) -> Self {
        Self {
            returning: Returning::Star,
            source: TableWithJoins {
                table,
                joins: vec![],
            },
            filter: None,
        }
    }

    /// Replaces the projection.
    pub fn select(mut self, columns: impl IntoIterator<Item = ExprColumn>) -> Self {
        self.returning = Returning::Columns(columns.into_iter().collect());
        self
    }

    /// Appends columns to an explicit projection.
    ///
    /// # Panics
    ///
    /// Panics if the projection is still `*`; qualify it first.
    #[track_caller]
    pub fn select_append(mut self, columns: impl IntoIterator<Item = ExprColumn>) -> Self {
        match &mut self.returning {
            Returning::Columns(existing) => existing.extend(columns),
            Returning::Star => panic!("cannot append columns to `SELECT *`; qualify it first"),
        }
        self
    }

    /// Inner-joins `table` on `constraint`.
    pub fn join(mut self, table: TableId, constraint: Expr) -> Self {
        self.source.joins.push(Join {
            table,
            constraint: JoinOp::Inner(constraint),
        });
        self
    }

    /// Adds a filter, combined with `AND` with any existing one.
    pub fn filter(mut self, expr: impl Into<Expr>) -> Self {
        self.add_filter(expr);
        self
    }

    pub fn add_filter(&mut self, expr: impl Into<Expr>) {
        let expr = expr.into();
        self.filter = Some(match self.filter.take() {
            Some(existing) => Expr::and(existing, expr),
            None => expr,
        });
    }

    /// The table named in the `FROM` clause.
    pub fn first_source(&self) -> TableId {
        self.source.table
    }

    /// The most recently joined table, or the `FROM` table without joins.
    pub fn last_source(&self) -> TableId {
        self.source
            .joins
            .last()
            .map(|join| join.table)
            .unwrap_or(self.source.table)
    }
}

impl From<TableId> for Select {
    fn from(value: TableId) -> Self {
        Self::from_table(value)
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Self::Query(value)
    }
}
