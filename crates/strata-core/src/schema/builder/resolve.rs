use crate::{
    driver::Connection,
    schema::{db::Column, Name},
};

/// A table a descendant kind introduces.
#[derive(Debug)]
pub(super) struct Resolved {
    pub(super) name: String,
    pub(super) columns: Vec<Column>,
}

/// Finds the table backing a descendant kind.
///
/// Returns `None` when the kind adds no table of its own: its table is
/// absent, introspection fails, or it names a table the parent chain already
/// joins. Failures are logged and never propagated; the kind then behaves as
/// a single-table subtype of its parent.
pub(super) async fn resolve(
    cx: &mut dyn Connection,
    kind: &Name,
    explicit: Option<&str>,
    chain: &[&str],
) -> Option<Resolved> {
    let (name, columns) = match explicit {
        Some(table) => match cx.probe_columns(table).await {
            Ok(columns) if !columns.is_empty() => (table.to_string(), columns),
            Ok(_) => {
                tracing::warn!(
                    kind = %kind,
                    table,
                    "configured table has no columns; kind adds no table"
                );
                return None;
            }
            Err(err) => {
                tracing::warn!(
                    kind = %kind,
                    table,
                    error = %err,
                    "configured table could not be introspected; kind adds no table"
                );
                return None;
            }
        },
        None => {
            let table = kind.implicit_table_name();

            match cx.probe_columns(&table).await {
                Ok(columns) if !columns.is_empty() => (table, columns),
                Ok(_) => {
                    tracing::trace!(kind = %kind, table, "no conventional table");
                    return None;
                }
                Err(err) => {
                    tracing::debug!(kind = %kind, table, error = %err, "introspection failed");
                    return None;
                }
            }
        }
    };

    if chain.contains(&name.as_str()) {
        tracing::debug!(kind = %kind, table = %name, "table already in parent chain");
        return None;
    }

    Some(Resolved { name, columns })
}
