mod kind;
pub use kind::{Kind, LazyAttribute, TableColumns};

use super::KindId;

/// Routing data for every kind, indexed by `KindId`.
///
/// The mapping is constructed while kinds are declared and remains immutable
/// at runtime. It tells the engine which tables back a kind, which columns
/// each table owns, and which datasets load the kind or its descendants'
/// extra columns.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    pub kinds: Vec<Kind>,
}

impl Mapping {
    /// Returns the mapping for the specified kind.
    ///
    /// # Panics
    ///
    /// Panics if the kind ID does not exist in the mapping.
    pub fn kind(&self, id: impl Into<KindId>) -> &Kind {
        &self.kinds[id.into().0]
    }

    pub(crate) fn kind_mut(&mut self, id: impl Into<KindId>) -> &mut Kind {
        &mut self.kinds[id.into().0]
    }
}
