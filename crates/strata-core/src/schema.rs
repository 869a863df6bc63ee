mod builder;
pub use builder::{Builder, Hierarchy};

pub mod db;

mod discriminator;
pub use discriminator::{Discriminator, KeyChooser};

mod kind;
pub use kind::{Kind, KindId};

pub mod mapping;
use mapping::Mapping;

mod name;
pub use name::Name;

mod subclass_load;
pub use subclass_load::{LoadStrategy, SubclassLoad};

use crate::stmt::Value;
use db::{Table, TableId};
use std::sync::Arc;

/// A finalized kind hierarchy together with its table routing.
///
/// Built once by [`Hierarchy::build`]; immutable afterwards.
#[derive(Debug)]
pub struct Schema {
    /// Kinds, indexed by `KindId`. The root is always `KindId(0)`.
    pub kinds: Vec<Kind>,

    /// Per-kind table routing
    pub mapping: Mapping,

    /// Every table backing the hierarchy
    pub db: Arc<db::Schema>,

    /// Discriminator value <-> kind resolution
    pub discriminator: Discriminator,

    /// Name of the primary key column, shared by every table
    pub primary_key: String,

    /// Default subclass loading strategy
    pub subclass_load: SubclassLoad,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn kind(&self, id: impl Into<KindId>) -> &Kind {
        &self.kinds[id.into().0]
    }

    pub fn kind_by_name(&self, name: &str) -> Option<&Kind> {
        self.kinds.iter().find(|kind| kind.name == name)
    }

    pub fn root(&self) -> &Kind {
        &self.kinds[KindId::ROOT.0]
    }

    pub fn mapping_for(&self, id: impl Into<KindId>) -> &mapping::Kind {
        self.mapping.kind(id)
    }

    pub fn table_for(&self, id: impl Into<KindId>) -> &Table {
        self.db.table(self.table_id_for(id))
    }

    pub fn table_id_for(&self, id: impl Into<KindId>) -> TableId {
        self.mapping.kind(id).table()
    }

    pub fn table_name(&self, id: impl Into<TableId>) -> &str {
        &self.db.table(id).name
    }

    /// The kind a stored discriminator value identifies.
    pub fn kind_for_value(&self, value: &Value) -> Option<KindId> {
        self.discriminator.resolve_kind(value)
    }

    /// `kind` followed by its ancestors, up to the root.
    pub fn ancestry(&self, kind: impl Into<KindId>) -> impl Iterator<Item = &Kind> + '_ {
        let mut next = Some(kind.into());
        std::iter::from_fn(move || {
            let kind = self.kind(next?);
            next = kind.parent;
            Some(kind)
        })
    }

    /// Returns `true` if `kind` is `ancestor` or one of its descendants.
    pub fn is_kind_of(&self, kind: impl Into<KindId>, ancestor: impl Into<KindId>) -> bool {
        let ancestor = ancestor.into();
        self.ancestry(kind).any(|kind| kind.id == ancestor)
    }
}
