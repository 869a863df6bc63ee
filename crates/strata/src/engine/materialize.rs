use crate::Instance;

use strata_core::{schema::KindId, stmt::Row, Schema};

/// Builds an instance from a row loaded for `queried`.
///
/// The row's discriminator value picks the instance's kind. A value that maps
/// to no kind, or to a kind outside the queried subtree, falls back to the
/// queried kind.
pub(crate) fn materialize(schema: &Schema, queried: KindId, row: Row) -> Instance {
    let kind = row
        .get(&schema.discriminator.column)
        .and_then(|value| schema.kind_for_value(value))
        .filter(|kind| schema.is_kind_of(*kind, queried))
        .unwrap_or(queried);

    Instance::persisted(schema.kind(kind), row.into_fields())
}
