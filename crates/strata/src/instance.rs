use strata_core::{
    schema::{Kind, KindId, Name},
    stmt::Value,
    Error, Result,
};

use indexmap::IndexMap;

/// Lifecycle of an [`Instance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Not yet inserted
    New,

    /// Loaded from, or written to, the database
    Persisted,

    /// Deleted; the instance is frozen
    Destroyed,
}

/// A materialized row of some kind.
///
/// Column values are kept in load order. Descendant columns may be added
/// later, by eager or lazy subclass loading, without changing the kind or
/// the key.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    kind: KindId,
    kind_name: Name,
    values: IndexMap<String, Value>,
    state: State,
}

impl Instance {
    /// A new, unsaved instance of `kind`.
    pub fn new(kind: &Kind) -> Self {
        Self {
            kind: kind.id,
            kind_name: kind.name.clone(),
            values: IndexMap::new(),
            state: State::New,
        }
    }

    pub(crate) fn persisted(kind: &Kind, values: IndexMap<String, Value>) -> Self {
        Self {
            kind: kind.id,
            kind_name: kind.name.clone(),
            values,
            state: State::Persisted,
        }
    }

    pub fn kind(&self) -> KindId {
        self.kind
    }

    pub fn kind_name(&self) -> &Name {
        &self.kind_name
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_new(&self) -> bool {
        self.state == State::New
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == State::Destroyed
    }

    /// The cached value of `column`, if it has been loaded or set.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Sets a column value locally. Nothing is written until the instance is
    /// inserted or updated.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.ensure_not_destroyed()?;
        self.values.insert(column.into(), value.into());
        Ok(())
    }

    pub(crate) fn ensure_not_destroyed(&self) -> Result<()> {
        if self.is_destroyed() {
            return Err(Error::stale_instance(self.kind_name.as_str()));
        }
        Ok(())
    }

    /// The primary key value, when set and not null.
    pub(crate) fn key(&self, primary_key: &str) -> Option<&Value> {
        self.values.get(primary_key).filter(|value| !value.is_null())
    }

    pub(crate) fn store(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    pub(crate) fn replace_values(&mut self, values: IndexMap<String, Value>) {
        self.values = values;
    }

    pub(crate) fn set_state(&mut self, state: State) {
        self.state = state;
    }
}
