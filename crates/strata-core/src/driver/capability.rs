#[derive(Debug)]
pub struct Capability {
    /// When true, the database uses a SQL-based query language.
    pub sql: bool,

    /// SQL: supports `INSERT ... RETURNING`. When false, generated keys are
    /// fetched with a separate `Operation::LastInsertKey`.
    pub insert_returning: bool,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        sql: true,
        insert_returning: true,
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        insert_returning: false,
        ..Self::SQLITE
    };
}
