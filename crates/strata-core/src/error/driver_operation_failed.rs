use super::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A statement or probe the backend rejected.
#[derive(Debug)]
pub(super) struct DriverOperationFailed(BoxError);

impl std::error::Error for DriverOperationFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.0)
    }
}

impl core::fmt::Display for DriverOperationFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut backend: Option<&dyn std::error::Error> = Some(&*self.0);
        let mut first = true;

        while let Some(err) = backend {
            if !first {
                f.write_str(": ")?;
            }
            write!(f, "{err}")?;
            first = false;
            backend = err.source();
        }

        Ok(())
    }
}

impl Error {
    /// Wraps an error raised by the backend library.
    pub fn driver_operation_failed(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::DriverOperationFailed(DriverOperationFailed(
            Box::new(err),
        )))
    }

    pub fn is_driver_operation_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::DriverOperationFailed(_))
    }
}
