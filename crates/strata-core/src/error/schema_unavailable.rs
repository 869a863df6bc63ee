use super::Error;

/// Error when a table's columns cannot be introspected.
///
/// Raised by drivers from `Connection::probe_columns`. The schema resolver
/// treats it as "this kind has no table of its own".
#[derive(Debug)]
pub(super) struct SchemaUnavailable {
    table: Box<str>,
}

impl std::error::Error for SchemaUnavailable {}

impl core::fmt::Display for SchemaUnavailable {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "schema unavailable for table `{}`", self.table)
    }
}

impl Error {
    /// Creates a schema unavailable error for `table`.
    pub fn schema_unavailable(table: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::SchemaUnavailable(SchemaUnavailable {
            table: table.into().into(),
        }))
    }

    /// Returns `true` if this error is a schema unavailable error.
    pub fn is_schema_unavailable(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::SchemaUnavailable(_))
    }
}
