use super::{Formatter, Params, ToSql};

use strata_core::stmt;

/// A value rendered as a SQL literal
pub(super) struct SqlLiteral<'a>(pub(super) &'a stmt::Value);

impl ToSql for &stmt::Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let placeholder = f.params.push(self);
        fmt!(f, placeholder);
    }
}

impl ToSql for SqlLiteral<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;
        use stmt::Value::*;

        match self.0 {
            Bool(true) if f.serializer.is_sqlite() => f.dst.push('1'),
            Bool(false) if f.serializer.is_sqlite() => f.dst.push('0'),
            Bool(true) => f.dst.push_str("TRUE"),
            Bool(false) => f.dst.push_str("FALSE"),
            Bytes(bytes) => {
                f.dst.push_str("X'");
                for byte in bytes {
                    let _ = write!(f.dst, "{byte:02X}");
                }
                f.dst.push('\'');
            }
            F64(v) => {
                let _ = write!(f.dst, "{v}");
            }
            I64(v) => {
                let _ = write!(f.dst, "{v}");
            }
            Null => f.dst.push_str("NULL"),
            String(s) => {
                f.dst.push('\'');
                for ch in s.chars() {
                    if ch == '\'' {
                        f.dst.push('\'');
                    }
                    f.dst.push(ch);
                }
                f.dst.push('\'');
            }
        }
    }
}
