use crate::{stmt::RowStream, Result};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Operation result, as a stream of rows
    Values(RowStream),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn row_stream(rows: impl Into<RowStream>) -> Self {
        Self {
            rows: Rows::Values(rows.into()),
        }
    }

    pub fn empty_row_stream() -> Self {
        Self {
            rows: Rows::Values(RowStream::default()),
        }
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    pub async fn dup(&mut self) -> Result<Self> {
        match self {
            Rows::Count(count) => Ok(Rows::Count(*count)),
            Rows::Values(rows) => Ok(Rows::Values(rows.dup().await?)),
        }
    }

    /// The affected row count; a row stream counts its rows.
    pub async fn count(self) -> Result<u64> {
        match self {
            Rows::Count(count) => Ok(count),
            Rows::Values(rows) => Ok(rows.collect().await?.len() as u64),
        }
    }

    /// The returned rows; a count yields none.
    pub fn into_rows(self) -> RowStream {
        match self {
            Self::Values(rows) => rows,
            Self::Count(_) => RowStream::default(),
        }
    }
}
