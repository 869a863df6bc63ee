use super::{materialize, Engine};
use crate::{Instance, Query};

use strata_core::{
    driver::Connection,
    schema::{KindId, LoadStrategy},
    stmt::{self, Expr, ExprColumn, Row, Value},
    Error, Result,
};

use indexmap::{IndexMap, IndexSet};

impl Engine {
    /// The load dataset for `query`, with its filter qualified.
    pub(crate) fn plan_load(&self, query: &Query) -> Result<stmt::Select> {
        let mut select = self.schema.mapping_for(query.kind).load_query.clone();

        if let Some(filter) = &query.filter {
            let mut filter = filter.clone();
            self.qualify(query.kind, &mut filter)?;
            select.add_filter(filter);
        }

        Ok(select)
    }

    pub(crate) fn strategy(&self, query: &Query) -> Result<LoadStrategy> {
        self.schema.subclass_load.resolve(query.strategy)
    }

    pub(crate) async fn load(&self, cx: &mut dyn Connection, query: Query) -> Result<Vec<Instance>> {
        let strategy = self.strategy(&query)?;
        let select = self.plan_load(&query)?;

        let rows = self.exec(cx, select).await?.rows.into_rows().collect().await?;
        let mut instances: Vec<_> = rows
            .into_iter()
            .map(|row| materialize(&self.schema, query.kind, row))
            .collect();

        if strategy == LoadStrategy::Eager {
            self.attach_subclass_columns(cx, &mut instances, query.kind)
                .await?;
        }

        Ok(instances)
    }

    pub(crate) async fn get(&self, cx: &mut dyn Connection, kind: KindId, key: Value) -> Result<Instance> {
        let filter = self.key_filter(self.schema.mapping_for(kind).root_table(), &key);
        let mut instances = self.load(cx, Query::new(kind).filter(filter)).await?;

        if instances.is_empty() {
            return Err(Error::record_not_found(format!(
                "kind={} key={key}",
                self.schema.kind(kind).name
            )));
        }

        Ok(instances.swap_remove(0))
    }

    /// Loads the columns `instances` are missing because they live in tables
    /// past `ancestor`'s chain.
    ///
    /// Instances are grouped by the nearest table-owning kind of their
    /// resolved kind; each group costs one query keyed by primary key.
    pub(crate) async fn attach_subclass_columns(
        &self,
        cx: &mut dyn Connection,
        instances: &mut Vec<Instance>,
        ancestor: KindId,
    ) -> Result<()> {
        let schema = &self.schema;
        let pk = &schema.primary_key;
        let base = schema.mapping_for(ancestor);
        let base_owner = schema.mapping_for(base.owner);

        let mut groups = IndexMap::<KindId, IndexSet<Value>>::new();

        for instance in instances.iter() {
            let mapping = schema.mapping_for(instance.kind());

            if mapping.chain.len() <= base.chain.len()
                || !schema.is_kind_of(instance.kind(), ancestor)
            {
                continue;
            }

            if let Some(key) = instance.key(pk) {
                groups
                    .entry(mapping.owner)
                    .or_default()
                    .insert(key.clone());
            }
        }

        if groups.is_empty() {
            return Ok(());
        }

        let mut fetched = IndexMap::<(KindId, Value), Vec<Row>>::new();

        for (owner, keys) in groups {
            let Some(dataset) = base_owner.subclass_dataset(owner) else {
                return Err(Error::invalid_configuration(format!(
                    "no subclass dataset from `{}` to `{}`",
                    schema.kind(base.owner).name,
                    schema.kind(owner).name
                )));
            };

            let start = dataset.first_source();
            let select = dataset
                .clone()
                .filter(Expr::in_list(Expr::column(start, pk), keys));

            let rows = self.exec(cx, select).await?.rows.into_rows().collect().await?;

            for row in rows {
                let key = row.get(pk).cloned().unwrap_or_default();
                fetched.entry((owner, key)).or_default().push(row);
            }
        }

        let mut merged = Vec::with_capacity(instances.len());

        for instance in instances.drain(..) {
            let owner = schema.mapping_for(instance.kind()).owner;
            let rows = instance
                .key(pk)
                .and_then(|key| fetched.get(&(owner, key.clone())));

            let Some(rows) = rows.filter(|rows| !rows.is_empty()) else {
                merged.push(instance);
                continue;
            };

            if rows.len() > 1 {
                tracing::warn!(
                    kind = %instance.kind_name(),
                    key = ?instance.key(pk),
                    rows = rows.len(),
                    "subclass load returned more than one row per key; duplicating instance"
                );
            }

            for row in rows {
                let mut copy = instance.clone();
                merge_row(&mut copy, row, pk);
                merged.push(copy);
            }
        }

        *instances = merged;
        Ok(())
    }

    /// Returns the cached value of `column`, loading it from its table on
    /// first access.
    pub(crate) async fn attribute(
        &self,
        cx: &mut dyn Connection,
        instance: &mut Instance,
        column: &str,
    ) -> Result<Value> {
        if let Some(value) = instance.get(column) {
            return Ok(value.clone());
        }

        instance.ensure_not_destroyed()?;

        let schema = &self.schema;
        let mapping = schema.mapping_for(instance.kind());

        let table = match mapping.lazy_attributes.get(column) {
            Some(attribute) => attribute.table,
            None => mapping
                .owning_table(column)
                .ok_or_else(|| self.unknown_column(instance.kind(), column))?,
        };

        let Some(key) = instance.key(&schema.primary_key).cloned() else {
            strata_core::bail!(
                "cannot load `{column}` for a `{}` instance without a primary key",
                instance.kind_name()
            );
        };

        let select = stmt::Select::from_table(table)
            .select([ExprColumn::new(table, column)])
            .filter(self.key_filter(table, &key));

        let mut rows = self.exec(cx, select).await?.rows.into_rows();

        let value = match rows.next().await {
            Some(row) => row?.get(column).cloned().unwrap_or_default(),
            None => {
                return Err(Error::record_not_found(format!(
                    "table={} key={key}",
                    schema.table_name(table)
                )))
            }
        };

        instance.store(column, value.clone());
        Ok(value)
    }

    /// Reloads every column of the instance's kind through its load dataset.
    pub(crate) async fn refresh(&self, cx: &mut dyn Connection, instance: &mut Instance) -> Result<()> {
        instance.ensure_not_destroyed()?;

        let schema = &self.schema;
        let mapping = schema.mapping_for(instance.kind());

        let Some(key) = instance.key(&schema.primary_key).cloned() else {
            strata_core::bail!(
                "cannot refresh a `{}` instance without a primary key",
                instance.kind_name()
            );
        };

        let select = mapping
            .load_query
            .clone()
            .filter(self.key_filter(mapping.root_table(), &key));

        let mut rows = self.exec(cx, select).await?.rows.into_rows();

        match rows.next().await {
            Some(row) => {
                instance.replace_values(row?.into_fields());
                Ok(())
            }
            None => Err(Error::record_not_found(format!(
                "kind={} key={key}",
                instance.kind_name()
            ))),
        }
    }

    pub(crate) fn key_filter(&self, table: strata_core::schema::db::TableId, key: &Value) -> Expr {
        Expr::eq(Expr::column(table, &self.schema.primary_key), key.clone())
    }
}

fn merge_row(instance: &mut Instance, row: &Row, pk: &str) {
    for (column, value) in row.iter() {
        if column != pk {
            instance.store(column, value.clone());
        }
    }
}
