mod builder;
pub use builder::Builder;

use crate::{engine::Engine, Cursor, Instance, Query, Result};

use strata_core::{
    driver::Connection,
    schema::KindId,
    stmt::{RowStream, Select, Value},
    Error, Schema,
};

use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A handle to a mapped kind hierarchy and the connection it lives in.
///
/// Clones share the schema and the connection. Each logical operation holds
/// the connection until its last statement completes.
#[derive(Clone)]
pub struct Db {
    engine: Engine,
    connection: Arc<Mutex<Box<dyn Connection>>>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn new(schema: Schema, connection: Box<dyn Connection>) -> Self {
        Self {
            engine: Engine::new(schema),
            connection: Arc::new(Mutex::new(connection)),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.engine.schema
    }

    /// Looks up a declared kind by name.
    pub fn kind(&self, name: &str) -> Result<KindId> {
        self.schema()
            .kind_by_name(name)
            .map(|kind| kind.id)
            .ok_or_else(|| Error::invalid_configuration(format!("unknown kind `{name}`")))
    }

    /// The dataset that loads every column of `kind`, restricted to its
    /// admissible discriminator values.
    pub fn load_query(&self, kind: KindId) -> &Select {
        &self.schema().mapping_for(kind).load_query
    }

    /// Execute a query, returning all matching instances
    pub async fn all(&self, query: impl Into<Query>) -> Result<Vec<Instance>> {
        let mut connection = self.connection.lock().await;
        self.engine.load(&mut **connection, query.into()).await
    }

    pub async fn first(&self, query: impl Into<Query>) -> Result<Option<Instance>> {
        Ok(self.all(query).await?.into_iter().next())
    }

    /// Loads the instance of `kind` (or a descendant) with primary key `key`.
    pub async fn get(&self, kind: KindId, key: impl Into<Value>) -> Result<Instance> {
        let mut connection = self.connection.lock().await;
        self.engine.get(&mut **connection, kind, key.into()).await
    }

    /// Streams the instances of a query.
    ///
    /// The statement runs when the cursor is first polled. Eager subclass
    /// loading needs every key before the first instance is yielded, so it is
    /// rejected here.
    pub fn stream(&self, query: impl Into<Query>) -> Result<Cursor> {
        let query = query.into();

        if self.engine.strategy(&query)? == strata_core::schema::LoadStrategy::Eager {
            return Err(Error::unsupported_feature(
                "eager subclass loading is not available when streaming; use `Db::all`",
            ));
        }

        let select = self.engine.plan_load(&query)?;
        let engine = self.engine.clone();
        let connection = self.connection.clone();

        let rows = RowStream::from_stream(async_stream::try_stream! {
            // Released before yielding; lazy reads on yielded instances lock it.
            let rows = {
                let mut connection = connection.lock().await;
                engine.query(&mut **connection, select).await?.collect().await?
            };

            for row in rows {
                yield row;
            }
        });

        Ok(Cursor::new(self.schema().clone(), query.kind, rows))
    }

    /// Builds a new instance of `kind` from `values` and inserts it.
    pub async fn create<K, V>(
        &self,
        kind: KindId,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Instance>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut instance = Instance::new(self.schema().kind(kind));

        for (column, value) in values {
            instance.set(column, value)?;
        }

        self.insert(&mut instance).await?;
        Ok(instance)
    }

    pub async fn insert(&self, instance: &mut Instance) -> Result<()> {
        let mut connection = self.connection.lock().await;
        self.engine.insert(&mut **connection, instance).await
    }

    /// Writes `changes` and applies them to the instance.
    pub async fn update<K, V>(
        &self,
        instance: &mut Instance,
        changes: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let changes = collect_changes(changes);
        let mut connection = self.connection.lock().await;
        self.engine.update(&mut **connection, instance, changes).await
    }

    pub async fn update_by_key<K, V>(
        &self,
        kind: KindId,
        key: impl Into<Value>,
        changes: impl IntoIterator<Item = (K, V)>,
    ) -> Result<()>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let changes = collect_changes(changes);
        let mut connection = self.connection.lock().await;
        self.engine
            .update_by_key(&mut **connection, kind, &key.into(), &changes)
            .await
    }

    pub async fn delete(&self, instance: &mut Instance) -> Result<()> {
        let mut connection = self.connection.lock().await;
        self.engine.delete(&mut **connection, instance).await
    }

    pub async fn delete_by_key(&self, kind: KindId, key: impl Into<Value>) -> Result<()> {
        let mut connection = self.connection.lock().await;
        self.engine
            .delete_by_key(&mut **connection, kind, &key.into())
            .await
    }

    /// Loads descendant-table columns for instances returned by a query
    /// against `ancestor`.
    pub async fn attach_subclass_columns(
        &self,
        instances: &mut Vec<Instance>,
        ancestor: KindId,
    ) -> Result<()> {
        let mut connection = self.connection.lock().await;
        self.engine
            .attach_subclass_columns(&mut **connection, instances, ancestor)
            .await
    }

    /// Reads `column`, loading and caching it on first access.
    pub async fn attribute(&self, instance: &mut Instance, column: &str) -> Result<Value> {
        if let Some(value) = instance.get(column) {
            return Ok(value.clone());
        }

        let mut connection = self.connection.lock().await;
        self.engine
            .attribute(&mut **connection, instance, column)
            .await
    }

    pub async fn refresh(&self, instance: &mut Instance) -> Result<()> {
        let mut connection = self.connection.lock().await;
        self.engine.refresh(&mut **connection, instance).await
    }
}

fn collect_changes<K: Into<String>, V: Into<Value>>(
    changes: impl IntoIterator<Item = (K, V)>,
) -> IndexMap<String, Value> {
    changes
        .into_iter()
        .map(|(column, value)| (column.into(), value.into()))
        .collect()
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("kinds", &self.schema().kinds.len())
            .field("tables", &self.schema().db.tables.len())
            .finish()
    }
}
