use super::Error;

/// Error when the hierarchy configuration is invalid.
///
/// This occurs when:
/// - A `key_map` assigns the same discriminator value to two kinds
/// - A discriminator value has a type the key column cannot hold
/// - A kind is declared twice, or under a parent that was never declared
/// - The root table or its discriminator column does not exist
/// - A query overrides a subclass loading strategy that is locked
/// - A write names a column the kind does not have
///
/// These errors are fatal for the operation that raised them.
#[derive(Debug)]
pub(super) struct InvalidConfiguration {
    message: Box<str>,
}

impl std::error::Error for InvalidConfiguration {}

impl core::fmt::Display for InvalidConfiguration {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidConfiguration(InvalidConfiguration {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid configuration error.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidConfiguration(_))
    }
}
