use backtrace::Backtrace;
use parking_lot::RwLock;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for repository operations.
///
/// Validation kinds (`UnsupportedType`, `UnsupportedOperator`, `InvalidPageNumber`,
/// `InvalidPageSize`, `InvalidId`, `InvalidFieldName`) are raised locally before the
/// entity store is touched. Store failures surface to callers as `PersistenceFailure`
/// with the store's own `BackendError` attached as the cause.
///
/// # Examples
///
/// ```rust
/// use repono::errors::{ErrorKind, RepositoryError, RepositoryResult};
///
/// fn check(page_size: usize) -> RepositoryResult<()> {
///     if page_size == 0 {
///         return Err(RepositoryError::new("Page size must be positive", ErrorKind::InvalidPageSize));
///     }
///     Ok(())
/// }
///
/// assert!(check(0).is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Validation Errors
    /// A document field holds a value kind the entity store cannot persist
    UnsupportedType,
    /// A filter names an operator outside the supported set
    UnsupportedOperator,
    /// Page number is less than one
    InvalidPageNumber,
    /// Page size is less than one
    InvalidPageSize,
    /// The provided object id is invalid
    InvalidId,
    /// Invalid field name
    InvalidFieldName,
    /// Configuration value is invalid
    InvalidConfiguration,

    // Data Encoding Errors
    /// Error encoding or decoding wire data
    EncodingError,

    // Storage Errors
    /// A repository operation failed in the entity store
    PersistenceFailure,
    /// Error raised by the entity store itself
    BackendError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::UnsupportedType => write!(f, "Unsupported type"),
            ErrorKind::UnsupportedOperator => write!(f, "Unsupported operator"),
            ErrorKind::InvalidPageNumber => write!(f, "Invalid page number"),
            ErrorKind::InvalidPageSize => write!(f, "Invalid page size"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidFieldName => write!(f, "Invalid field name"),
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::PersistenceFailure => write!(f, "Persistence failure"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Repository error type.
///
/// `RepositoryError` carries a message, an [ErrorKind], an optional cause and the
/// backtrace captured where it was created. The backtrace is resolved lazily, the
/// first time the error is debug-printed.
///
/// ```rust
/// use repono::errors::{ErrorKind, RepositoryError};
///
/// let cause = RepositoryError::new("disk unavailable", ErrorKind::BackendError);
/// let err = RepositoryError::new_with_cause(
///     "Failed to add object to repository[users]",
///     ErrorKind::PersistenceFailure,
///     cause,
/// );
/// assert_eq!(err.kind(), &ErrorKind::PersistenceFailure);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct RepositoryError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<RepositoryError>>,
    backtrace: Arc<RwLock<Backtrace>>,
}

impl RepositoryError {
    /// Creates a new `RepositoryError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RepositoryError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(RwLock::new(Backtrace::new_unresolved())),
        }
    }

    /// Creates a new `RepositoryError` wrapping a cause error.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: RepositoryError) -> Self {
        RepositoryError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(RwLock::new(Backtrace::new_unresolved())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&RepositoryError> {
        self.cause.as_deref()
    }

    /// Walks the cause chain and returns the innermost error.
    pub fn root_cause(&self) -> &RepositoryError {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }
}

impl Display for RepositoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RepositoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = self.backtrace.write();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, *backtrace)
            }
        }
    }
}

impl Error for RepositoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::new(&format!("JSON error: {}", err), ErrorKind::EncodingError)
    }
}

impl From<base64::DecodeError> for RepositoryError {
    fn from(err: base64::DecodeError) -> Self {
        RepositoryError::new(
            &format!("Base64 decoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<String> for RepositoryError {
    fn from(msg: String) -> Self {
        RepositoryError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for RepositoryError {
    fn from(msg: &str) -> Self {
        RepositoryError::new(msg, ErrorKind::InternalError)
    }
}
