use super::{Kind, KindId};
use crate::stmt::Value;

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

/// Chooses the discriminator value written for new instances of a kind.
pub type KeyChooser = Arc<dyn Fn(&Kind) -> Option<Value> + Send + Sync>;

/// Maps discriminator column values to kinds and back.
#[derive(Clone)]
pub struct Discriminator {
    /// The key column, in the root table
    pub column: String,

    /// Value to kind; many values may map to one kind
    model_map: IndexMap<Value, KindId>,

    chooser: Option<KeyChooser>,
}

impl Discriminator {
    pub(crate) fn new(
        column: String,
        model_map: IndexMap<Value, KindId>,
        chooser: Option<KeyChooser>,
    ) -> Self {
        Self {
            column,
            model_map,
            chooser,
        }
    }

    /// The kind a stored value identifies, if any.
    pub fn resolve_kind(&self, value: &Value) -> Option<KindId> {
        self.model_map.get(value).copied()
    }

    /// The value written for new instances of `kind`: the configured
    /// chooser's result, else the kind's first own value.
    pub fn default_value_for(&self, kind: &Kind) -> Option<Value> {
        match &self.chooser {
            Some(chooser) => chooser(kind),
            None => kind.values.first().cloned(),
        }
    }
}

impl fmt::Debug for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discriminator")
            .field("column", &self.column)
            .field("model_map", &self.model_map)
            .field("chooser", &self.chooser.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
