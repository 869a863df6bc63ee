pub mod cursor;
pub use cursor::Cursor;

pub mod db;
pub use db::Db;

mod engine;

mod instance;
pub use instance::{Instance, State};

mod query;
pub use query::Query;

#[cfg(feature = "sqlite")]
pub use strata_driver_sqlite as sqlite;

pub use strata_core::{
    driver::{Connection, Driver},
    schema::{KindId, LoadStrategy, SubclassLoad},
    stmt::{Expr, Value},
    Error, Result, Schema,
};
