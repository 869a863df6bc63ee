use super::{resolve::resolve, resolve::Resolved, Builder};
use crate::{
    driver::Connection,
    schema::{
        db::{self, Table, TableId},
        mapping::{self, LazyAttribute, Mapping},
        Discriminator, Kind, KindId, Name, Schema,
    },
    stmt::{Expr, ExprColumn, Select, Value},
    Error, Result,
};

use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// A hierarchy under construction.
///
/// Returned by [`Builder::declare_root`]. Kinds are declared one at a time,
/// each after its parent; `&mut self` makes declaration single-writer.
#[derive(Debug)]
pub struct Hierarchy {
    pub(super) key: String,
    pub(super) key_ty: db::Type,
    pub(super) primary_key: String,
    pub(super) builder: Builder,
    pub(super) kinds: Vec<Kind>,
    pub(super) mapping: Mapping,
    pub(super) tables: Vec<Table>,

    /// Discriminator value to the kind it identifies
    pub(super) value_owner: IndexMap<Value, KindId>,
}

impl Hierarchy {
    /// Declares `name` as a child of `parent`.
    ///
    /// The kind gets its own table when one resolves; otherwise it shares its
    /// parent's routing. Fails without changing the hierarchy when the name is
    /// taken, the parent is unknown, or the kind's discriminator values are
    /// invalid.
    pub async fn declare_kind(
        &mut self,
        cx: &mut dyn Connection,
        parent: KindId,
        name: &str,
    ) -> Result<KindId> {
        if self.kind_id(name).is_some() {
            return Err(Error::invalid_configuration(format!(
                "kind `{name}` is already declared"
            )));
        }

        if parent.0 >= self.kinds.len() {
            return Err(Error::invalid_configuration(format!(
                "unknown parent {parent:?} for kind `{name}`"
            )));
        }

        let id = KindId(self.kinds.len());
        let kind_name = Name::new(name);
        let values = self.own_values(name)?;

        let explicit = self.builder.table_map.get(name).cloned();
        let chain_names: Vec<String> = self.mapping.kinds[parent.0]
            .chain
            .iter()
            .map(|table| self.tables[table.0].name.clone())
            .collect();
        let chain_names: Vec<&str> = chain_names.iter().map(String::as_str).collect();

        let resolved = resolve(cx, &kind_name, explicit.as_deref(), &chain_names).await;

        let mapping = match resolved {
            Some(resolved) => self.extend_chain(id, parent, resolved),
            None => self.share_parent(id, parent),
        };

        tracing::debug!(
            kind = name,
            parent = %self.kinds[parent.0].name,
            table = %self.tables[mapping.table().0].name,
            chain_len = mapping.chain.len(),
            "declared kind"
        );

        self.kinds[parent.0].children.push(id);
        self.push_kind(
            Kind {
                id,
                name: kind_name,
                parent: Some(parent),
                children: vec![],
                values,
                admissible: IndexSet::new(),
            },
            mapping,
        );

        Ok(id)
    }

    /// Finalizes the hierarchy.
    ///
    /// Every non-root kind's load query is restricted to its admissible
    /// discriminator values as they stand after all declarations.
    pub fn build(mut self) -> Result<Schema> {
        for name in self.builder.model_map.values() {
            if self.kind_id(name).is_none() {
                return Err(Error::invalid_configuration(format!(
                    "model_map names undeclared kind `{name}`"
                )));
            }
        }

        for name in self.builder.key_map.keys() {
            if self.kind_id(name).is_none() {
                return Err(Error::invalid_configuration(format!(
                    "key_map names undeclared kind `{name}`"
                )));
            }
        }

        for name in self.builder.table_map.keys() {
            if self.kind_id(name).is_none() {
                tracing::warn!(kind = %name, "table_map names undeclared kind; ignoring");
            }
        }

        for kind in &self.kinds {
            let mapping = &mut self.mapping.kinds[kind.id.0];

            if kind.is_root() {
                continue;
            }

            let key = Expr::column(mapping.root_table(), &self.key);
            mapping.load_query = (*mapping.join_query)
                .clone()
                .filter(Expr::in_list(key, kind.admissible.iter().cloned()));
        }

        let discriminator = Discriminator::new(
            self.key,
            self.value_owner,
            self.builder.key_chooser.clone(),
        );

        Ok(Schema {
            kinds: self.kinds,
            mapping: self.mapping,
            db: Arc::new(db::Schema {
                tables: self.tables,
            }),
            discriminator,
            primary_key: self.primary_key,
            subclass_load: self.builder.subclass_load,
        })
    }

    pub fn kind(&self, id: KindId) -> &Kind {
        &self.kinds[id.0]
    }

    pub fn kind_id(&self, name: &str) -> Option<KindId> {
        self.kinds
            .iter()
            .find(|kind| kind.name == name)
            .map(|kind| kind.id)
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.0]
    }

    pub(super) fn push_kind(&mut self, mut kind: Kind, mapping: mapping::Kind) {
        for value in &kind.values {
            self.value_owner.insert(value.clone(), kind.id);
        }

        // A kind's values become admissible for it and every ancestor.
        kind.admissible.extend(kind.values.iter().cloned());
        let mut next = kind.parent;
        while let Some(ancestor) = next {
            let ancestor = &mut self.kinds[ancestor.0];
            ancestor.admissible.extend(kind.values.iter().cloned());
            next = ancestor.parent;
        }

        debug_assert_eq!(kind.id.0, self.kinds.len());
        self.kinds.push(kind);
        self.mapping.kinds.push(mapping);
    }

    /// The discriminator values identifying exactly `name`.
    pub(super) fn own_values(&self, name: &str) -> Result<Vec<Value>> {
        let values = if let Some(values) = self.builder.key_map.get(name) {
            values.clone()
        } else if !self.builder.model_map.is_empty() {
            self.builder
                .model_map
                .iter()
                .filter(|(_, kind)| *kind == name)
                .map(|(value, _)| value.clone())
                .collect()
        } else {
            vec![Value::from(name)]
        };

        for value in &values {
            self.validate_value(value)?;

            if let Some(owner) = self.value_owner.get(value) {
                return Err(Error::invalid_configuration(format!(
                    "discriminator value {value} maps to both `{}` and `{name}`",
                    self.kinds[owner.0].name
                )));
            }
        }

        Ok(values)
    }

    /// Checks every value configured through `model_map` and `key_map`.
    pub(super) fn validate_configured_values(&self) -> Result<()> {
        let configured = self
            .builder
            .model_map
            .keys()
            .chain(self.builder.key_map.values().flatten());

        for value in configured {
            self.validate_value(value)?;
        }

        Ok(())
    }

    fn validate_value(&self, value: &Value) -> Result<()> {
        let valid = match value {
            Value::I64(_) => !self.key_ty.is_text(),
            Value::String(_) => !self.key_ty.is_integer(),
            Value::Bool(_) | Value::Bytes(_) | Value::F64(_) | Value::Null => false,
        };

        if valid {
            Ok(())
        } else {
            Err(Error::invalid_configuration(format!(
                "discriminator value {value} ({}) does not fit key column `{}` of type {:?}",
                value.variant_name(),
                self.key,
                self.key_ty
            )))
        }
    }

    /// Routing for a kind that introduces no table.
    fn share_parent(&self, id: KindId, parent: KindId) -> mapping::Kind {
        let parent = &self.mapping.kinds[parent.0];

        mapping::Kind {
            id,
            owner: parent.owner,
            chain: parent.chain.clone(),
            table_columns: parent.table_columns.clone(),
            join_query: parent.join_query.clone(),
            load_query: (*parent.join_query).clone(),
            columns: parent.columns.clone(),
            lazy_attributes: parent.lazy_attributes.clone(),
            subclass_datasets: IndexMap::new(),
        }
    }

    /// Routing for a kind that introduces `resolved`, joined after the
    /// parent's last table on the primary key.
    fn extend_chain(&mut self, id: KindId, parent: KindId, resolved: Resolved) -> mapping::Kind {
        let table = self.register_table(&resolved.name, resolved.columns);
        let pk = self.primary_key.clone();

        let owned: Vec<String> = self.tables[table.0]
            .column_names()
            .filter(|column| *column != pk)
            .map(String::from)
            .collect();
        let owned_columns = || owned.iter().map(move |column| ExprColumn::new(table, column));

        let owners = self.table_owners(parent);
        let parent = &self.mapping.kinds[parent.0];
        let prev = parent.table();
        let join_on = Expr::eq(Expr::column(table, &pk), Expr::column(prev, &pk));

        let mut join_query = (*parent.join_query).clone();

        // The first join replaces `*` with the root's qualified columns.
        if parent.chain.len() == 1 {
            let root = &self.tables[prev.0];
            join_query = join_query.select(root.column_names().map(|c| ExprColumn::new(prev, c)));
        }

        let join_query = join_query
            .join(table, join_on.clone())
            .select_append(owned_columns());

        let mut chain = parent.chain.to_vec();
        chain.push(table);

        let mut table_columns = (*parent.table_columns).clone();
        table_columns.insert(table, owned.clone());

        let mut columns = IndexMap::new();
        for table in &chain {
            for column in &self.tables[table.0].columns {
                columns.insert(column.name.clone(), column.clone());
            }
        }

        let mut lazy_attributes = (*parent.lazy_attributes).clone();
        for column in &owned {
            lazy_attributes.insert(
                column.clone(),
                LazyAttribute {
                    table,
                    column: column.clone(),
                },
            );
        }

        // Each table-owning ancestor gets a dataset reaching this table.
        let nearest = owners[0];
        for owner in &owners {
            let base = if *owner == nearest {
                let start = self.mapping.kinds[owner.0].table();
                Select::from_table(start).select([ExprColumn::new(start, &pk)])
            } else {
                self.mapping.kinds[owner.0].subclass_datasets[&nearest].clone()
            };

            let dataset = base
                .join(table, join_on.clone())
                .select_append(owned_columns());

            self.mapping.kinds[owner.0]
                .subclass_datasets
                .insert(id, dataset);
        }

        let join_query = Arc::new(join_query);

        mapping::Kind {
            id,
            owner: id,
            chain: Arc::from(chain),
            table_columns: Arc::new(table_columns),
            load_query: (*join_query).clone(),
            join_query,
            columns: Arc::new(columns),
            lazy_attributes: Arc::new(lazy_attributes),
            subclass_datasets: IndexMap::new(),
        }
    }

    /// Table-owning kinds from `kind` up to the root, nearest first.
    fn table_owners(&self, kind: KindId) -> Vec<KindId> {
        let mut owners = vec![];
        let mut next = Some(kind);

        while let Some(kind) = next {
            let owner = self.mapping.kinds[kind.0].owner;
            owners.push(owner);
            next = self.kinds[owner.0].parent;
        }

        owners
    }
}
