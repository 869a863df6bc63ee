use super::Engine;
use crate::{Instance, State};

use strata_core::{
    driver::{operation::LastInsertKey, Connection},
    schema::{db::TableId, KindId},
    stmt::{self, Returning, Row, Value},
    Error, Result, WriteOp,
};

use indexmap::IndexMap;

impl Engine {
    /// Inserts a new instance, one statement per table of its kind's chain,
    /// root first.
    pub(crate) async fn insert(&self, cx: &mut dyn Connection, instance: &mut Instance) -> Result<()> {
        instance.ensure_not_destroyed()?;

        if !instance.is_new() {
            strata_core::bail!(
                "`{}` instance is already persisted",
                instance.kind_name()
            );
        }

        let schema = &self.schema;
        let pk = &schema.primary_key;
        let mapping = schema.mapping_for(instance.kind());

        for column in instance.values().keys() {
            if !mapping.columns.contains_key(column) {
                return Err(self.unknown_column(instance.kind(), column));
            }
        }

        self.apply_discriminator(instance);

        let returning = cx.capability().insert_returning;

        for (index, (table, owned)) in mapping.table_columns.iter().enumerate() {
            let mut insert = stmt::Insert::new(*table);

            if index > 0 {
                let Some(key) = instance.key(pk) else {
                    strata_core::bail!(
                        "no primary key for `{}` after inserting into `{}`",
                        instance.kind_name(),
                        schema.table_name(mapping.root_table())
                    );
                };
                insert.push(pk, key.clone());
            }

            for column in owned {
                if let Some(value) = instance.get(column) {
                    insert.push(column, value.clone());
                }
            }

            if returning {
                insert.returning = Some(Returning::Star);
            }

            let response = self
                .exec(cx, insert)
                .await
                .map_err(|err| self.write_failed(err, *table, WriteOp::Insert))?;

            if returning {
                let rows = response
                    .rows
                    .into_rows()
                    .collect()
                    .await
                    .map_err(|err| self.write_failed(err, *table, WriteOp::Insert))?;

                if let Some(row) = rows.into_iter().next() {
                    merge_returned(instance, row, index == 0, pk);
                }
            }

            if index == 0 && instance.key(pk).is_none() {
                let key = self
                    .last_insert_key(cx, *table)
                    .await
                    .map_err(|err| self.write_failed(err, *table, WriteOp::Insert))?;
                instance.store(pk, key);
            }
        }

        instance.set_state(State::Persisted);
        Ok(())
    }

    /// Sets or corrects the discriminator column of a new instance.
    ///
    /// An unset column takes the chooser's value. An explicit value is kept
    /// unless it resolves to a kind stored in a different table than the
    /// chosen value's kind.
    fn apply_discriminator(&self, instance: &mut Instance) {
        let schema = &self.schema;
        let column = &schema.discriminator.column;
        let Some(chosen) = schema
            .discriminator
            .default_value_for(schema.kind(instance.kind()))
        else {
            return;
        };

        let current = instance.get(column).filter(|value| !value.is_null());

        match current {
            None => instance.store(column, chosen),
            Some(current) if *current != chosen => {
                // Values that map to no kind stand for the instance's own kind.
                let own = instance.kind();
                let table_of = |value: &Value| {
                    let kind = schema.kind_for_value(value).unwrap_or(own);
                    schema.table_id_for(kind)
                };

                if table_of(current) != table_of(&chosen) {
                    tracing::debug!(
                        kind = %instance.kind_name(),
                        explicit = %current,
                        chosen = %chosen,
                        "replacing discriminator value stored in another table"
                    );
                    instance.store(column, chosen);
                }
            }
            Some(_) => {}
        }
    }

    async fn last_insert_key(&self, cx: &mut dyn Connection, table: TableId) -> Result<Value> {
        let op = LastInsertKey {
            table,
            primary_key: self.schema.primary_key.clone(),
        };

        let mut rows = self.exec(cx, op).await?.rows.into_rows();

        let key = match rows.next().await {
            Some(row) => row?.get(&self.schema.primary_key).cloned(),
            None => None,
        };

        key.filter(|key| !key.is_null()).ok_or_else(|| {
            strata_core::err!(
                "no key was generated by the insert into `{}`",
                self.schema.table_name(table)
            )
        })
    }

    /// Updates the row `key` of `kind`, one statement per chain table that
    /// owns a changed column.
    pub(crate) async fn update_by_key(
        &self,
        cx: &mut dyn Connection,
        kind: KindId,
        key: &Value,
        changes: &IndexMap<String, Value>,
    ) -> Result<()> {
        let schema = &self.schema;
        let pk = &schema.primary_key;
        let mapping = schema.mapping_for(kind);

        for (column, value) in changes {
            if !mapping.columns.contains_key(column) {
                return Err(self.unknown_column(kind, column));
            }

            if column == pk && value != key {
                return Err(Error::invalid_configuration(format!(
                    "primary key `{pk}` of `{}` cannot be changed",
                    schema.kind(kind).name
                )));
            }
        }

        for (table, owned) in mapping.table_columns.iter() {
            let assignments: IndexMap<_, _> = changes
                .iter()
                .filter(|(column, _)| *column != pk && owned.contains(*column))
                .map(|(column, value)| (column.clone(), value.clone()))
                .collect();

            if assignments.is_empty() {
                continue;
            }

            let update = stmt::Update {
                table: *table,
                assignments,
                filter: self.key_filter(*table, key),
            };

            self.exec(cx, update)
                .await
                .map_err(|err| self.write_failed(err, *table, WriteOp::Update))?;
        }

        Ok(())
    }

    pub(crate) async fn update(
        &self,
        cx: &mut dyn Connection,
        instance: &mut Instance,
        changes: IndexMap<String, Value>,
    ) -> Result<()> {
        instance.ensure_not_destroyed()?;
        let key = self.require_key(instance, "update")?;

        self.update_by_key(cx, instance.kind(), &key, &changes).await?;

        for (column, value) in changes {
            instance.store(column, value);
        }

        Ok(())
    }

    /// Deletes the row `key` from every table of `kind`'s chain, most derived
    /// first.
    pub(crate) async fn delete_by_key(&self, cx: &mut dyn Connection, kind: KindId, key: &Value) -> Result<()> {
        let mapping = self.schema.mapping_for(kind);

        for table in mapping.chain.iter().rev() {
            let delete = stmt::Delete {
                table: *table,
                filter: self.key_filter(*table, key),
            };

            self.exec(cx, delete)
                .await
                .map_err(|err| self.write_failed(err, *table, WriteOp::Delete))?;
        }

        Ok(())
    }

    pub(crate) async fn delete(&self, cx: &mut dyn Connection, instance: &mut Instance) -> Result<()> {
        instance.ensure_not_destroyed()?;
        let key = self.require_key(instance, "delete")?;

        self.delete_by_key(cx, instance.kind(), &key).await?;
        instance.set_state(State::Destroyed);
        Ok(())
    }

    fn require_key(&self, instance: &Instance, action: &str) -> Result<Value> {
        match instance.key(&self.schema.primary_key) {
            Some(key) => Ok(key.clone()),
            None => Err(strata_core::err!(
                "cannot {action} a `{}` instance without a primary key",
                instance.kind_name()
            )),
        }
    }

    fn write_failed(&self, err: Error, table: TableId, op: WriteOp) -> Error {
        err.context(Error::write_failed(self.schema.table_name(table), op))
    }
}

/// Merges a row returned by an insert. Later tables only contribute their own
/// columns; their key mirrors the root key.
fn merge_returned(instance: &mut Instance, row: Row, root: bool, pk: &str) {
    for (column, value) in row {
        if root || column != pk {
            instance.store(column, value);
        }
    }
}
