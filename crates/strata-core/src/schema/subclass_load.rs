use crate::{Error, Result};

/// How columns that live in descendant tables are loaded for instances
/// returned by a query against an ancestor kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SubclassLoad {
    /// Eager by default; queries may switch to lazy.
    Eager,

    /// Always eager; queries may not switch.
    EagerOnly,

    /// Lazy by default; queries may switch to eager.
    #[default]
    Lazy,

    /// Always lazy; queries may not switch.
    LazyOnly,
}

/// The strategy in effect for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy {
    Eager,
    Lazy,
}

impl SubclassLoad {
    pub fn default_strategy(self) -> LoadStrategy {
        match self {
            Self::Eager | Self::EagerOnly => LoadStrategy::Eager,
            Self::Lazy | Self::LazyOnly => LoadStrategy::Lazy,
        }
    }

    /// Applies a query-level override.
    pub fn resolve(self, requested: Option<LoadStrategy>) -> Result<LoadStrategy> {
        match (self, requested) {
            (_, None) => Ok(self.default_strategy()),
            (Self::EagerOnly, Some(LoadStrategy::Lazy)) => Err(Error::invalid_configuration(
                "subclass loading is restricted to eager; lazy loading cannot be requested",
            )),
            (Self::LazyOnly, Some(LoadStrategy::Eager)) => Err(Error::invalid_configuration(
                "subclass loading is restricted to lazy; eager loading cannot be requested",
            )),
            (_, Some(strategy)) => Ok(strategy),
        }
    }
}
