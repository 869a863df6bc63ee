use super::{Comma, Delimited, Ident, Params, ToSql};

use strata_core::stmt;

impl ToSql for &stmt::Expr {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        use stmt::Expr::*;

        match self {
            And(expr) => {
                fmt!(f, "(", Delimited(&expr.operands, " AND "), ")");
            }
            BinaryOp(expr) => {
                fmt!(f, "(", &*expr.lhs, " ", expr.op, " ", &*expr.rhs, ")");
            }
            Column(expr) => expr.to_sql(f),
            InList(expr) => {
                fmt!(f, "(", &*expr.expr, " IN (", Comma(&expr.list), "))");
            }
            Value(value) => value.to_sql(f),
        }
    }
}

impl ToSql for &stmt::ExprColumn {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        if let Some(table) = self.table {
            let table_name = f.serializer.table_name(table);
            fmt!(f, table_name, ".");
        }

        fmt!(f, Ident(&self.column));
    }
}

impl ToSql for stmt::BinaryOp {
    fn to_sql<P: Params>(self, f: &mut super::Formatter<'_, P>) {
        f.dst.push_str(match self {
            stmt::BinaryOp::Eq => "=",
            stmt::BinaryOp::Ne => "<>",
            stmt::BinaryOp::Ge => ">=",
            stmt::BinaryOp::Gt => ">",
            stmt::BinaryOp::Le => "<=",
            stmt::BinaryOp::Lt => "<",
        });
    }
}
