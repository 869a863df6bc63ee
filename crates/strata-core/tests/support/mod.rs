use indexmap::IndexMap;
use strata_core::{
    async_trait,
    driver::{Capability, Connection, Operation, Response},
    err,
    schema::db::{self, Column, Type},
    Error, Result,
};

/// An introspection-only connection over an in-memory table catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: IndexMap<String, Vec<Column>>,
    broken: Vec<String>,

    /// Every table name probed, in order
    pub probes: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table. A column named `id` is flagged as the primary key.
    pub fn table(mut self, name: &str, columns: &[(&str, Type)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, ty)| {
                let column = Column::new(*name, ty.clone());
                if *name == "id" {
                    column.primary_key()
                } else {
                    column
                }
            })
            .collect();
        self.tables.insert(name.to_string(), columns);
        self
    }

    /// Makes probing `name` fail.
    pub fn broken(mut self, name: &str) -> Self {
        self.broken.push(name.to_string());
        self
    }

    /// `employees -> managers -> executives`, plus `staff` and a `cooks`-less
    /// `Cook` as used by most tests.
    pub fn company() -> Self {
        Self::new()
            .table(
                "employees",
                &[("id", Type::Integer), ("name", Type::Text), ("kind", Type::Text)],
            )
            .table("managers", &[("id", Type::Integer), ("num_staff", Type::Integer)])
            .table(
                "executives",
                &[("id", Type::Integer), ("num_managers", Type::Integer)],
            )
            .table("staff", &[("id", Type::Integer), ("manager_id", Type::Integer)])
    }
}

#[async_trait]
impl Connection for Catalog {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn probe_columns(&mut self, table: &str) -> Result<Vec<Column>> {
        self.probes.push(table.to_string());

        if self.broken.iter().any(|name| name == table) {
            return Err(Error::schema_unavailable(table));
        }

        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }

    async fn exec(&mut self, _schema: &db::Schema, op: Operation) -> Result<Response> {
        Err(err!("catalog cannot execute {op:?}"))
    }
}
