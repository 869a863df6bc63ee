use super::Db;
use crate::Result;

use strata_core::{
    driver::{Connection, Driver},
    schema::{self, Kind, SubclassLoad},
    stmt::Value,
    Error,
};

/// Configures a kind hierarchy and the database it maps onto.
///
/// Kinds are declared in the order they are added; a parent must be added
/// before its children.
#[derive(Debug, Default)]
pub struct Builder {
    /// Name of the root kind
    root: Option<String>,

    /// `(kind, parent)` pairs, in declaration order
    kinds: Vec<(String, String)>,

    /// Schema builder
    core: schema::Builder,
}

impl Builder {
    pub fn root(&mut self, name: &str) -> &mut Self {
        self.root = Some(name.to_string());
        self
    }

    pub fn kind(&mut self, name: &str, parent: &str) -> &mut Self {
        self.kinds.push((name.to_string(), parent.to_string()));
        self
    }

    /// Set the discriminator column of the root table
    pub fn key(&mut self, column: &str) -> &mut Self {
        self.core.key(column);
        self
    }

    pub fn primary_key(&mut self, column: &str) -> &mut Self {
        self.core.primary_key(column);
        self
    }

    /// Store `kind` in `table` instead of the table named after it
    pub fn table_map(&mut self, kind: &str, table: &str) -> &mut Self {
        self.core.table_map(kind, table);
        self
    }

    pub fn model_map(&mut self, value: impl Into<Value>, kind: &str) -> &mut Self {
        self.core.model_map(value, kind);
        self
    }

    pub fn key_map(&mut self, kind: &str, values: impl IntoIterator<Item = Value>) -> &mut Self {
        self.core.key_map(kind, values);
        self
    }

    pub fn key_chooser(
        &mut self,
        chooser: impl Fn(&Kind) -> Option<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.core.key_chooser(chooser);
        self
    }

    pub fn subclass_load(&mut self, subclass_load: SubclassLoad) -> &mut Self {
        self.core.subclass_load(subclass_load);
        self
    }

    pub async fn build(&self, driver: impl Driver) -> Result<Db> {
        let connection = driver.connect().await?;
        self.build_with_connection(connection).await
    }

    /// Introspects every kind's table through `connection`, then keeps the
    /// connection for the returned `Db`.
    pub async fn build_with_connection(&self, mut connection: Box<dyn Connection>) -> Result<Db> {
        let Some(root) = &self.root else {
            return Err(Error::invalid_configuration("a root kind is required"));
        };

        let mut hierarchy = self.core.clone().declare_root(&mut *connection, root).await?;

        for (name, parent) in &self.kinds {
            let Some(parent) = hierarchy.kind_id(parent) else {
                return Err(Error::invalid_configuration(format!(
                    "unknown parent `{parent}` for kind `{name}`"
                )));
            };

            hierarchy
                .declare_kind(&mut *connection, parent, name)
                .await?;
        }

        let schema = hierarchy.build()?;
        Ok(Db::new(schema, connection))
    }
}
