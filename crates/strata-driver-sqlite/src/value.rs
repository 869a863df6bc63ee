use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};
use strata_core::{
    schema::db,
    stmt::{self, Value as CoreValue},
    Error, Result,
};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Converts this SQLite driver value into the core value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a SQLite value within a row to a core value.
    ///
    /// `ty` is the storage type of the column, when the column is known to
    /// the schema. Integers stored in boolean columns become `Bool`.
    pub fn from_sql(row: &Row, index: usize, ty: Option<&db::Type>) -> Result<Self> {
        let value = row.get_ref(index).map_err(Error::driver_operation_failed)?;

        let core_value = match value {
            ValueRef::Null => stmt::Value::Null,
            ValueRef::Integer(value) => match ty {
                Some(db::Type::Boolean) => stmt::Value::Bool(value != 0),
                _ => stmt::Value::I64(value),
            },
            ValueRef::Text(value) => stmt::Value::String(String::from_utf8_lossy(value).into_owned()),
            ValueRef::Blob(value) => stmt::Value::Bytes(value.to_vec()),
            ValueRef::Real(value) => stmt::Value::from(value),
        };

        Ok(Value(core_value))
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use stmt::Value;

        match &self.0 {
            Value::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Value::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            Value::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(v.get()))),
            Value::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
        }
    }
}
