use std::sync::Arc;

pub type KeelResult<T> = Result<T, KeelError>;

/// Generic error that contains all the different kinds of errors that may cross from the backend
/// into keel
#[derive(Debug, Clone)]
pub enum KeelError {
    StringError(String),
    /// The device was lost while work was in flight. Nothing submitted after this will retire.
    DeviceLost,
    IoError(Arc<std::io::Error>),
}

impl std::error::Error for KeelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            KeelError::StringError(_) => None,
            KeelError::DeviceLost => None,
            KeelError::IoError(ref e) => Some(&**e),
        }
    }
}

impl core::fmt::Display for KeelError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            KeelError::StringError(ref e) => e.fmt(fmt),
            KeelError::DeviceLost => "device lost".fmt(fmt),
            KeelError::IoError(ref e) => e.fmt(fmt),
        }
    }
}

impl From<&str> for KeelError {
    fn from(str: &str) -> Self {
        KeelError::StringError(str.to_string())
    }
}

impl From<String> for KeelError {
    fn from(string: String) -> Self {
        KeelError::StringError(string)
    }
}

impl From<std::io::Error> for KeelError {
    fn from(error: std::io::Error) -> Self {
        KeelError::IoError(Arc::new(error))
    }
}
