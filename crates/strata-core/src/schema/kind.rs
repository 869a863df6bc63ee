use super::Name;
use crate::stmt::Value;

use indexmap::IndexSet;
use std::fmt;

/// A node in the kind hierarchy.
#[derive(Debug, Clone)]
pub struct Kind {
    /// Uniquely identifies the kind within the schema
    pub id: KindId,

    /// Name of the kind
    pub name: Name,

    /// `None` for the root kind
    pub parent: Option<KindId>,

    /// Kinds declared directly under this one, in declaration order
    pub children: Vec<KindId>,

    /// Discriminator values that identify rows of exactly this kind
    pub values: Vec<Value>,

    /// Discriminator values of this kind and every descendant, in
    /// declaration order. Grows as descendants are declared.
    pub admissible: IndexSet<Value>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct KindId(pub usize);

impl Kind {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl KindId {
    pub const ROOT: KindId = KindId(0);
}

impl From<&Kind> for KindId {
    fn from(value: &Kind) -> Self {
        value.id
    }
}

impl From<&KindId> for KindId {
    fn from(src: &KindId) -> Self {
        *src
    }
}

impl fmt::Debug for KindId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "KindId({})", self.0)
    }
}
