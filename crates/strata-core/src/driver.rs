mod capability;
pub use capability::Capability;

mod response;
pub use response::{Response, Rows};

pub mod operation;
pub use operation::Operation;

use crate::{async_trait, schema::db};

use std::fmt::Debug;

#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Opens a connection to the database.
    async fn connect(&self) -> crate::Result<Box<dyn Connection>>;
}

#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Describes the connection's capability, which informs the write
    /// coordinator.
    fn capability(&self) -> &'static Capability;

    /// Returns the columns of `table`, in table order.
    ///
    /// A table that does not exist yields a `SchemaUnavailable` error.
    /// Callers also treat an empty list as a missing table.
    async fn probe_columns(&mut self, table: &str) -> crate::Result<Vec<db::Column>>;

    /// Execute a database operation
    async fn exec(&mut self, schema: &db::Schema, op: Operation) -> crate::Result<Response>;
}
