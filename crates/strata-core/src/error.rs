mod adhoc;
mod driver_operation_failed;
mod invalid_configuration;
mod record_not_found;
mod schema_unavailable;
mod stale_instance;
mod unsupported_feature;
mod write_failed;

use adhoc::AdhocError;
use driver_operation_failed::DriverOperationFailed;
use invalid_configuration::InvalidConfiguration;
use record_not_found::RecordNotFound;
use schema_unavailable::SchemaUnavailable;
use stale_instance::StaleInstance;
use std::sync::Arc;
use unsupported_feature::UnsupportedFeature;
use write_failed::WriteFailed;

pub use write_failed::WriteOp;

/// Returns early with an ad-hoc error built from format arguments.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Builds an ad-hoc error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur in Strata.
///
/// Cloning is cheap. An error may carry a cause, added with
/// [`Error::context`]; the chain displays as `outer: inner: root`.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Wraps this error as the cause of `outer`.
    ///
    /// `outer` must be freshly built: it cannot already have a cause or be
    /// shared with another clone.
    pub fn context(self, outer: Error) -> Error {
        let outer = match Arc::try_unwrap(outer.inner) {
            Ok(outer) if outer.cause.is_none() => outer,
            _ => panic!("context error must be fresh"),
        };

        Error {
            inner: Arc::new(ErrorInner {
                kind: outer.kind,
                cause: Some(self),
            }),
        }
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |err| err.inner.cause.as_ref())
    }

    /// Returns the innermost error of the context chain.
    pub fn root(&self) -> &Error {
        self.chain().last().unwrap_or(self)
    }

    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::DriverOperationFailed(err) => Some(err),
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        for (i, err) in self.chain().enumerate() {
            if i > 0 {
                f.write_str(": ")?;
            }
            core::fmt::Display::fmt(err.kind(), f)?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    DriverOperationFailed(DriverOperationFailed),
    InvalidConfiguration(InvalidConfiguration),
    RecordNotFound(RecordNotFound),
    SchemaUnavailable(SchemaUnavailable),
    StaleInstance(StaleInstance),
    UnsupportedFeature(UnsupportedFeature),
    WriteFailed(WriteFailed),
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            DriverOperationFailed(err) => core::fmt::Display::fmt(err, f),
            InvalidConfiguration(err) => core::fmt::Display::fmt(err, f),
            RecordNotFound(err) => core::fmt::Display::fmt(err, f),
            SchemaUnavailable(err) => core::fmt::Display::fmt(err, f),
            StaleInstance(err) => core::fmt::Display::fmt(err, f),
            UnsupportedFeature(err) => core::fmt::Display::fmt(err, f),
            WriteFailed(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Arc::new(ErrorInner { kind, cause: None }),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}
