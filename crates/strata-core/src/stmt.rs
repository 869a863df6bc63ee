mod delete;
pub use delete::Delete;

mod expr;
pub use expr::Expr;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_binary_op;
pub use expr_binary_op::ExprBinaryOp;

mod expr_column;
pub use expr_column::ExprColumn;

mod expr_in_list;
pub use expr_in_list::ExprInList;

mod insert;
pub use insert::Insert;

mod join;
pub use join::{Join, JoinOp};

mod op_binary;
pub use op_binary::BinaryOp;

mod returning;
pub use returning::Returning;

mod row;
pub use row::Row;

mod row_stream;
pub use row_stream::RowStream;

mod select;
pub use select::Select;

mod statement;
pub use statement::Statement;

mod table_with_joins;
pub use table_with_joins::TableWithJoins;

mod update;
pub use update::Update;

mod value;
pub use value::{Value, F64};
