use crate::{
    schema::{
        db::{Column, TableId},
        KindId,
    },
    stmt,
};

use indexmap::IndexMap;
use std::sync::Arc;

/// Columns owned by each table of a chain, in chain order.
///
/// The root table owns every one of its columns. A descendant table owns its
/// columns minus the primary key, which only mirrors the root key.
pub type TableColumns = IndexMap<TableId, Vec<String>>;

/// Where a lazily loaded column lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyAttribute {
    pub table: TableId,
    pub column: String,
}

/// The routing data of a single kind.
///
/// A kind that introduces no table shares `chain`, `table_columns`,
/// `join_query`, `columns` and `lazy_attributes` with its parent: the `Arc`s
/// point at the same allocations.
#[derive(Debug, Clone)]
pub struct Kind {
    /// The kind this mapping applies to.
    pub id: KindId,

    /// The nearest table-owning kind: this kind itself, or an ancestor.
    pub owner: KindId,

    /// The backing tables, root first. The last one is the kind's table.
    pub chain: Arc<[TableId]>,

    /// Columns owned by each table in `chain`.
    pub table_columns: Arc<TableColumns>,

    /// Joins every table in `chain` on the primary key, without the
    /// discriminator filter.
    pub join_query: Arc<stmt::Select>,

    /// `join_query` restricted to the kind's admissible discriminator values.
    /// Equal to `join_query` for the root.
    pub load_query: stmt::Select,

    /// Column metadata merged over `chain`, root first; later tables override
    /// earlier ones on a name clash.
    pub columns: Arc<IndexMap<String, Column>>,

    /// Columns introduced by tables after the root, keyed by column name.
    pub lazy_attributes: Arc<IndexMap<String, LazyAttribute>>,

    /// For a table-owning kind: datasets that start at this kind's table and
    /// join forward to a table-owning descendant, selecting the primary key
    /// and every column added on the way. Keyed by the descendant.
    pub subclass_datasets: IndexMap<KindId, stmt::Select>,
}

impl Kind {
    /// The kind's own backing table.
    pub fn table(&self) -> TableId {
        *self.chain.last().expect("chain is never empty")
    }

    pub fn root_table(&self) -> TableId {
        self.chain[0]
    }

    pub fn owns_table(&self) -> bool {
        self.owner == self.id
    }

    /// The first chain table owning `column`.
    pub fn owning_table(&self, column: &str) -> Option<TableId> {
        self.table_columns
            .iter()
            .find(|(_, columns)| columns.iter().any(|c| c == column))
            .map(|(table, _)| *table)
    }

    /// Every column of the kind, each exactly once, in select order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.table_columns
            .values()
            .flat_map(|columns| columns.iter().map(String::as_str))
    }

    pub fn subclass_dataset(&self, descendant: KindId) -> Option<&stmt::Select> {
        self.subclass_datasets.get(&descendant)
    }
}
