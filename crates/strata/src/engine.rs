mod load;
mod materialize;
mod write;

use strata_core::{
    driver::{Connection, Operation, Response},
    schema::KindId,
    stmt::{Expr, RowStream, Select},
    Error, Result, Schema,
};

use std::sync::Arc;

/// Executes logical operations against one connection.
///
/// The engine only reads the schema; every statement a logical operation
/// needs is issued serially on the connection passed in.
#[derive(Debug, Clone)]
pub(crate) struct Engine {
    pub(crate) schema: Arc<Schema>,
}

pub(crate) use materialize::materialize;

impl Engine {
    pub(crate) fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    async fn exec(&self, cx: &mut dyn Connection, op: impl Into<Operation>) -> Result<Response> {
        let op = op.into();
        tracing::trace!(table = self.schema.table_name(op.table()), ?op, "exec");
        cx.exec(&self.schema.db, op).await
    }

    pub(crate) async fn query(&self, cx: &mut dyn Connection, select: Select) -> Result<RowStream> {
        Ok(self.exec(cx, select).await?.rows.into_rows())
    }

    /// Qualifies every unqualified column of `expr` with the first table of
    /// `kind`'s chain that owns it.
    pub(crate) fn qualify(&self, kind: KindId, expr: &mut Expr) -> Result<()> {
        let mapping = self.schema.mapping_for(kind);
        let mut unknown = None;

        expr.for_each_column_mut(&mut |column| {
            if column.is_qualified() {
                return;
            }

            match mapping.owning_table(&column.column) {
                Some(table) => column.table = Some(table),
                None => {
                    unknown.get_or_insert_with(|| column.column.clone());
                }
            }
        });

        match unknown {
            Some(column) => Err(self.unknown_column(kind, &column)),
            None => Ok(()),
        }
    }

    fn unknown_column(&self, kind: KindId, column: &str) -> Error {
        Error::invalid_configuration(format!(
            "kind `{}` has no column `{column}`",
            self.schema.kind(kind).name
        ))
    }
}
