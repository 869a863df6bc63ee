use super::Error;

/// Error when an operation targets an instance that was already destroyed.
#[derive(Debug)]
pub(super) struct StaleInstance {
    kind: Box<str>,
}

impl std::error::Error for StaleInstance {}

impl core::fmt::Display for StaleInstance {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "stale instance: `{}` has already been destroyed", self.kind)
    }
}

impl Error {
    /// Creates a stale instance error for an instance of kind `kind`.
    pub fn stale_instance(kind: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::StaleInstance(StaleInstance {
            kind: kind.into().into(),
        }))
    }

    /// Returns `true` if this error is a stale instance error.
    pub fn is_stale_instance(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::StaleInstance(_))
    }
}
