use crate::{engine::materialize, Instance, Result};
use strata_core::{schema::KindId, stmt::RowStream, Schema};

use std::sync::Arc;

/// Instances of a query, materialized one row at a time.
///
/// Columns living in descendant tables are not loaded; read them with
/// [`Db::attribute`](crate::Db::attribute).
pub struct Cursor {
    schema: Arc<Schema>,
    kind: KindId,
    rows: RowStream,
}

pub trait FromCursor<A>: Extend<A> + Default {}

impl<A, T: Extend<A> + Default> FromCursor<A> for T {}

impl Cursor {
    pub(crate) fn new(schema: Arc<Schema>, kind: KindId, rows: RowStream) -> Self {
        Self { schema, kind, rows }
    }

    pub async fn next(&mut self) -> Option<Result<Instance>> {
        Some(
            self.rows
                .next()
                .await?
                .map(|row| materialize(&self.schema, self.kind, row)),
        )
    }

    /// Collect all instances
    pub async fn collect<B>(mut self) -> Result<B>
    where
        B: FromCursor<Instance>,
    {
        let mut ret = B::default();

        while let Some(res) = self.next().await {
            ret.extend(Some(res?));
        }

        Ok(ret)
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").field("kind", &self.kind).finish()
    }
}
