use super::{Formatter, ToSql};

use strata_core::stmt;

pub trait Params {
    /// Records `value` and returns how the SQL text refers to it.
    fn push(&mut self, value: &stmt::Value) -> Placeholder;
}

pub enum Placeholder {
    /// A numbered bind parameter, starting at 1
    Numbered(usize),

    /// The value itself, rendered as a SQL literal
    Inline(stmt::Value),
}

/// Renders every value inline. Used to produce readable SQL for logs and
/// assertions; never used to execute statements.
#[derive(Debug, Default, Clone, Copy)]
pub struct Literal;

impl Params for Vec<stmt::Value> {
    fn push(&mut self, value: &stmt::Value) -> Placeholder {
        self.push(value.clone());
        Placeholder::Numbered(self.len())
    }
}

impl Params for Literal {
    fn push(&mut self, value: &stmt::Value) -> Placeholder {
        Placeholder::Inline(value.clone())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;

        match self {
            Self::Numbered(_) if f.serializer.is_mysql() => f.dst.push('?'),
            Self::Numbered(n) => {
                let _ = write!(f.dst, "?{n}");
            }
            Self::Inline(value) => super::value::SqlLiteral(&value).to_sql(f),
        }
    }
}
