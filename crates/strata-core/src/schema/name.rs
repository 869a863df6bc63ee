use std_util::str;

use std::fmt;

/// The name of a kind, as declared (`UberManager`).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Name {
    name: String,
}

impl Name {
    pub fn new(src: &str) -> Self {
        Self {
            name: src.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn snake_case(&self) -> String {
        str::snake_case(&self.name)
    }

    /// The table name the naming convention derives from the kind name.
    pub fn implicit_table_name(&self) -> String {
        str::table_name(&self.name)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}
