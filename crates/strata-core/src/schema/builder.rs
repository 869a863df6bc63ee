mod hierarchy;
pub use hierarchy::Hierarchy;

mod resolve;

use super::{
    db::{Column, Table, TableId},
    mapping::{self, Mapping},
    Kind, KindId, KeyChooser, Name, SubclassLoad,
};
use crate::{driver::Connection, stmt, stmt::Value, Error, Result};

use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Hierarchy configuration, applied when the root kind is declared.
///
/// ```ignore
/// let mut builder = Schema::builder();
/// builder.key("kind").table_map("Staff", "staff");
///
/// let mut hierarchy = builder.declare_root(&mut *conn, "Employee").await?;
/// let manager = hierarchy.declare_kind(&mut *conn, KindId::ROOT, "Manager").await?;
/// let schema = hierarchy.build()?;
/// ```
#[derive(Clone)]
pub struct Builder {
    /// Discriminator column in the root table
    key: Option<String>,

    /// Primary key column used when introspection does not flag one
    primary_key: String,

    /// Kind name to table name, overriding the naming convention
    table_map: IndexMap<String, String>,

    /// Discriminator value to kind name
    model_map: IndexMap<Value, String>,

    /// Kind name to its own discriminator values
    key_map: IndexMap<String, Vec<Value>>,

    key_chooser: Option<KeyChooser>,

    subclass_load: SubclassLoad,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            key: None,
            primary_key: "id".to_string(),
            table_map: IndexMap::new(),
            model_map: IndexMap::new(),
            key_map: IndexMap::new(),
            key_chooser: None,
            subclass_load: SubclassLoad::default(),
        }
    }

    /// Sets the discriminator column.
    pub fn key(&mut self, column: &str) -> &mut Self {
        self.key = Some(column.to_string());
        self
    }

    /// Sets the primary key column name used when introspection reports none.
    pub fn primary_key(&mut self, column: &str) -> &mut Self {
        self.primary_key = column.to_string();
        self
    }

    /// Maps a kind to an explicit table.
    pub fn table_map(&mut self, kind: &str, table: &str) -> &mut Self {
        self.table_map.insert(kind.to_string(), table.to_string());
        self
    }

    /// Maps a stored discriminator value to a kind.
    pub fn model_map(&mut self, value: impl Into<Value>, kind: &str) -> &mut Self {
        self.model_map.insert(value.into(), kind.to_string());
        self
    }

    /// Sets the discriminator values a kind is stored with.
    pub fn key_map(&mut self, kind: &str, values: impl IntoIterator<Item = Value>) -> &mut Self {
        self.key_map
            .insert(kind.to_string(), values.into_iter().collect());
        self
    }

    /// Sets the function choosing the discriminator value for new instances.
    pub fn key_chooser(
        &mut self,
        chooser: impl Fn(&Kind) -> Option<Value> + Send + Sync + 'static,
    ) -> &mut Self {
        self.key_chooser = Some(Arc::new(chooser));
        self
    }

    pub fn subclass_load(&mut self, subclass_load: SubclassLoad) -> &mut Self {
        self.subclass_load = subclass_load;
        self
    }

    /// Declares the root kind and starts the hierarchy.
    ///
    /// Unlike descendants, the root must have a table: a missing or empty
    /// root table is a configuration error.
    pub async fn declare_root(self, cx: &mut dyn Connection, name: &str) -> Result<Hierarchy> {
        let Some(key) = self.key.clone() else {
            return Err(Error::invalid_configuration(
                "a discriminator key column is required",
            ));
        };

        let kind_name = Name::new(name);
        let table_name = self
            .table_map
            .get(name)
            .cloned()
            .unwrap_or_else(|| kind_name.implicit_table_name());

        let columns = cx.probe_columns(&table_name).await.map_err(|err| {
            err.context(Error::invalid_configuration(format!(
                "root kind `{name}` requires table `{table_name}`"
            )))
        })?;

        if columns.is_empty() {
            return Err(Error::invalid_configuration(format!(
                "root table `{table_name}` has no columns"
            )));
        }

        let primary_key = columns
            .iter()
            .find(|column| column.primary_key)
            .map(|column| column.name.clone())
            .unwrap_or_else(|| self.primary_key.clone());

        if !columns.iter().any(|column| column.name == primary_key) {
            return Err(Error::invalid_configuration(format!(
                "root table `{table_name}` has no primary key column `{primary_key}`"
            )));
        }

        let Some(key_column) = columns.iter().find(|column| column.name == key) else {
            return Err(Error::invalid_configuration(format!(
                "root table `{table_name}` has no discriminator column `{key}`"
            )));
        };
        let key_ty = key_column.ty.clone();

        let mut hierarchy = Hierarchy {
            key,
            key_ty,
            primary_key,
            builder: self,
            kinds: vec![],
            mapping: Mapping::default(),
            tables: vec![],
            value_owner: IndexMap::new(),
        };

        hierarchy.validate_configured_values()?;

        let values = hierarchy.own_values(name)?;
        let table = hierarchy.register_table(&table_name, columns);
        let root = hierarchy.root_mapping(table);

        tracing::debug!(kind = name, table = %table_name, "declared root kind");

        hierarchy.push_kind(
            Kind {
                id: KindId::ROOT,
                name: kind_name,
                parent: None,
                children: vec![],
                values,
                admissible: IndexSet::new(),
            },
            root,
        );

        Ok(hierarchy)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("key", &self.key)
            .field("primary_key", &self.primary_key)
            .field("table_map", &self.table_map)
            .field("model_map", &self.model_map)
            .field("key_map", &self.key_map)
            .field("key_chooser", &self.key_chooser.as_ref().map(|_| "<fn>"))
            .field("subclass_load", &self.subclass_load)
            .finish()
    }
}

impl Hierarchy {
    fn root_mapping(&self, table: TableId) -> mapping::Kind {
        let root = &self.tables[table.0];
        let join_query = Arc::new(stmt::Select::from_table(table));

        mapping::Kind {
            id: KindId::ROOT,
            owner: KindId::ROOT,
            chain: Arc::from([table]),
            table_columns: Arc::new(IndexMap::from([(
                table,
                root.column_names().map(String::from).collect(),
            )])),
            load_query: (*join_query).clone(),
            join_query,
            columns: Arc::new(
                root.columns
                    .iter()
                    .map(|column| (column.name.clone(), column.clone()))
                    .collect(),
            ),
            lazy_attributes: Arc::default(),
            subclass_datasets: IndexMap::new(),
        }
    }

    /// Registers a table, reusing the existing entry when two kinds name the
    /// same table.
    fn register_table(&mut self, name: &str, columns: Vec<Column>) -> TableId {
        if let Some(table) = self.tables.iter().find(|table| table.name == name) {
            return table.id;
        }

        let id = TableId(self.tables.len());
        self.tables.push(Table::new(id, name, columns));
        id
    }
}
