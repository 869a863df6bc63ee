use super::Error;

/// The statement kind of a failed per-table write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Insert,
    Update,
    Delete,
}

/// Error when one of the per-table statements of a logical write fails.
///
/// Used as context on top of the driver error, so the message names the
/// table while the root cause stays reachable through [`Error::root`].
#[derive(Debug)]
pub(super) struct WriteFailed {
    table: Box<str>,
    op: WriteOp,
}

impl std::error::Error for WriteFailed {}

impl core::fmt::Display for WriteFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let op = match self.op {
            WriteOp::Insert => "insert into",
            WriteOp::Update => "update of",
            WriteOp::Delete => "delete from",
        };
        write!(f, "{op} `{}` failed", self.table)
    }
}

impl Error {
    /// Creates a write failed error for `table`.
    pub fn write_failed(table: impl Into<String>, op: WriteOp) -> Error {
        Error::from(super::ErrorKind::WriteFailed(WriteFailed {
            table: table.into().into(),
            op,
        }))
    }

    /// Returns `true` if this error is a write failed error.
    pub fn is_write_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::WriteFailed(_))
    }
}
