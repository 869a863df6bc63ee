use super::{Comma, Ident, Params, ToSql};

use strata_core::stmt;

impl ToSql for &stmt::Statement {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            stmt::Statement::Delete(stmt) => stmt.to_sql(f),
            stmt::Statement::Insert(stmt) => stmt.to_sql(f),
            stmt::Statement::Query(stmt) => stmt.to_sql(f),
            stmt::Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        fmt!(f, "SELECT ", &self.returning, " FROM ", &self.source);
        Filter(self.filter.as_ref()).to_sql(f);
    }
}

impl ToSql for &stmt::Returning {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        match self {
            stmt::Returning::Star => fmt!(f, "*"),
            stmt::Returning::Columns(columns) => fmt!(f, Comma(columns)),
        }
    }
}

impl ToSql for &stmt::TableWithJoins {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let table_name = f.serializer.table_name(self.table);
        fmt!(f, table_name);

        for join in &self.joins {
            let table_name = f.serializer.table_name(join.table);

            match &join.constraint {
                stmt::JoinOp::Inner(on) => fmt!(f, " INNER JOIN ", table_name, " ON ", on),
            }
        }
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let table_name = f.serializer.table_name(self.table);
        fmt!(f, "INSERT INTO ", table_name);

        if self.is_empty() {
            fmt!(f, " DEFAULT VALUES");
        } else {
            let columns = Comma(self.columns.iter().map(Ident));
            fmt!(f, " (", columns, ") VALUES (", Comma(&self.values), ")");
        }

        if let Some(returning) = &self.returning {
            fmt!(f, " RETURNING ", returning);
        }
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let table_name = f.serializer.table_name(self.table);
        let assignments = Comma(self.assignments.iter().map(|(column, value)| Assignment(column, value)));

        fmt!(f, "UPDATE ", table_name, " SET ", assignments);
        Filter(Some(&self.filter)).to_sql(f);
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        let table_name = f.serializer.table_name(self.table);

        fmt!(f, "DELETE FROM ", table_name);
        Filter(Some(&self.filter)).to_sql(f);
    }
}

/// `column = value` in an `UPDATE ... SET` list
struct Assignment<'a>(&'a String, &'a stmt::Value);

impl ToSql for Assignment<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        fmt!(f, Ident(self.0), " = ", self.1);
    }
}

struct Filter<'a>(Option<&'a stmt::Expr>);

impl ToSql for Filter<'_> {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        if let Some(expr) = self.0 {
            fmt!(f, " WHERE ", expr);
        }
    }
}
