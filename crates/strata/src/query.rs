use strata_core::{
    schema::{KindId, LoadStrategy},
    stmt::Expr,
};

/// Load instances of a kind, optionally filtered.
///
/// Unqualified columns in the filter (`Expr::attr`) are resolved against the
/// kind's tables when the query runs.
#[derive(Debug, Clone)]
pub struct Query {
    pub(crate) kind: KindId,
    pub(crate) filter: Option<Expr>,
    pub(crate) strategy: Option<LoadStrategy>,
}

impl Query {
    pub fn new(kind: KindId) -> Self {
        Self {
            kind,
            filter: None,
            strategy: None,
        }
    }

    pub fn kind(&self) -> KindId {
        self.kind
    }

    /// Adds a filter, combined with `AND` with any existing one.
    pub fn filter(mut self, expr: impl Into<Expr>) -> Self {
        let expr = expr.into();
        self.filter = Some(match self.filter.take() {
            Some(existing) => Expr::and(existing, expr),
            None => expr,
        });
        self
    }

    /// Loads descendant columns with batched follow-up queries.
    pub fn eager(mut self) -> Self {
        self.strategy = Some(LoadStrategy::Eager);
        self
    }

    /// Loads descendant columns on first access.
    pub fn lazy(mut self) -> Self {
        self.strategy = Some(LoadStrategy::Lazy);
        self
    }
}

impl From<KindId> for Query {
    fn from(kind: KindId) -> Self {
        Self::new(kind)
    }
}
