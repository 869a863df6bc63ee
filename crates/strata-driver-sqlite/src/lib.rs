mod value;
pub(crate) use value::Value;

use rusqlite::Connection as RusqliteConnection;
use std::path::{Path, PathBuf};
use strata_core::{
    async_trait,
    driver::{operation::LastInsertKey, Capability, Driver, Operation, Response},
    schema::db::{self, Column, Schema, Type},
    stmt, Error, Result,
};
use strata_sql as sql;
use url::Url;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver from a connection URL: `sqlite::memory:` or
    /// `sqlite:path/to/file.db`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver_operation_failed)?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_configuration(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

#[async_trait]
impl Driver for Sqlite {
    async fn connect(&self) -> Result<Box<dyn strata_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;

        Ok(Self { connection })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;

        Ok(Self { connection })
    }

    /// Runs raw SQL, such as fixture DDL, outside the statement AST.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connection
            .execute_batch(sql)
            .map_err(Error::driver_operation_failed)
    }

    fn last_insert_key(&self, op: &LastInsertKey) -> Response {
        let key = self.connection.last_insert_rowid();
        let row: stmt::Row = [(op.primary_key.clone(), stmt::Value::I64(key))]
            .into_iter()
            .collect();

        Response::row_stream(vec![row])
    }
}

#[async_trait]
impl strata_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn probe_columns(&mut self, table: &str) -> Result<Vec<Column>> {
        let probe = || -> rusqlite::Result<Vec<Column>> {
            let mut stmt = self.connection.prepare_cached(
                r#"SELECT "name", "type", "notnull", "dflt_value", "pk" FROM pragma_table_info(?1)"#,
            )?;

            let columns = stmt.query_map([table], |row| {
                let name: String = row.get(0)?;
                let decl: String = row.get(1)?;
                let not_null: bool = row.get(2)?;
                let default: Option<String> = row.get(3)?;
                let pk: i64 = row.get(4)?;
                let ty = Type::from_declared(&decl);

                Ok(Column {
                    name,
                    nullable: !not_null && pk == 0,
                    primary_key: pk > 0,
                    // An INTEGER PRIMARY KEY aliases the rowid.
                    has_default: default.is_some() || (pk > 0 && ty.is_integer()),
                    ty,
                })
            })?;

            columns.collect()
        };

        let columns = probe().map_err(|err| {
            Error::driver_operation_failed(err).context(Error::schema_unavailable(table))
        })?;

        // `pragma_table_info` reports a missing table as an empty column list.
        if columns.is_empty() {
            return Err(Error::schema_unavailable(table));
        }

        Ok(columns)
    }

    async fn exec(&mut self, schema: &Schema, op: Operation) -> Result<Response> {
        let stmt = match op {
            Operation::LastInsertKey(op) => return Ok(self.last_insert_key(&op)),
            op => match op.into_statement() {
                Some(stmt) => stmt,
                None => return Err(Error::unsupported_feature("operation has no SQL form")),
            },
        };

        let mut params: Vec<stmt::Value> = vec![];
        let sql_str = sql::Serializer::sqlite(schema).serialize(&stmt, &mut params);

        tracing::trace!(sql = %sql_str, params = params.len(), "sqlite exec");

        let mut prepared = self
            .connection
            .prepare_cached(&sql_str)
            .map_err(Error::driver_operation_failed)?;

        let params = params.into_iter().map(Value::from).collect::<Vec<_>>();

        let returns_rows = match &stmt {
            stmt::Statement::Query(_) => true,
            stmt::Statement::Insert(insert) => insert.returning.is_some(),
            stmt::Statement::Update(_) | stmt::Statement::Delete(_) => false,
        };

        if !returns_rows {
            let count = prepared
                .execute(rusqlite::params_from_iter(params.iter()))
                .map_err(Error::driver_operation_failed)?;

            return Ok(Response::count(count as _));
        }

        let names: Vec<String> = prepared
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let types: Vec<Option<&Type>> = names
            .iter()
            .map(|name| column_type(schema, &stmt, name))
            .collect();

        let mut rows = prepared
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(Error::driver_operation_failed)?;

        let mut ret = vec![];

        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut fields = stmt::Row::new();

                    for (index, name) in names.iter().enumerate() {
                        let value = Value::from_sql(row, index, types[index])?;
                        fields.insert(name.clone(), value.into_inner());
                    }

                    ret.push(fields);
                }
                Ok(None) => break,
                Err(err) => return Err(Error::driver_operation_failed(err)),
            }
        }

        Ok(Response::row_stream(ret))
    }
}

/// The storage type of a result column, looked up in the tables the
/// statement reads from. Later tables win, matching column merge order.
fn column_type<'a>(schema: &'a Schema, stmt: &stmt::Statement, name: &str) -> Option<&'a Type> {
    let tables: Vec<db::TableId> = match stmt {
        stmt::Statement::Query(select) => {
            if let stmt::Returning::Columns(columns) = &select.returning {
                if let Some(table) = columns
                    .iter()
                    .find(|column| column.column == name)
                    .and_then(|column| column.table)
                {
                    return schema.table(table).column(name).map(|column| &column.ty);
                }
            }
            select.source.tables().collect()
        }
        stmt => vec![stmt.table()],
    };

    tables
        .iter()
        .rev()
        .find_map(|table| schema.table(*table).column(name))
        .map(|column| &column.ty)
}
