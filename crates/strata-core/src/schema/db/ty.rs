/// The storage type of a column, as reported by introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Blob,
    Boolean,
    Integer,
    Numeric,
    Real,
    Text,

    /// A declared type the engine does not interpret.
    Custom(String),
}

impl Type {
    /// Maps a declared SQL column type to a storage type using SQLite's
    /// affinity rules.
    pub fn from_declared(decl: &str) -> Self {
        let upper = decl.to_ascii_uppercase();

        if upper.contains("INT") {
            Self::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Self::Text
        } else if upper.contains("BLOB") || upper.is_empty() {
            Self::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Self::Real
        } else if upper.starts_with("BOOL") {
            Self::Boolean
        } else if upper.contains("NUMERIC") || upper.contains("DECIMAL") {
            Self::Numeric
        } else {
            Self::Custom(decl.to_string())
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}
