use warp::http::status::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure categories surfaced by the item service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing required input. Never reaches the store.
    Validation,
    /// An identifier could not be parsed from its external representation.
    InvalidArgument,
    /// The requested item does not exist.
    NotFound,
    /// The underlying store failed (I/O, constraint violation, pool, deadline).
    Persistence,
}

impl ErrorKind {
    /// HTTP status used when reporting this failure to a client.
    ///
    /// Every kind is reported as a generic client error, "not found" included.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation
            | ErrorKind::InvalidArgument
            | ErrorKind::NotFound
            | ErrorKind::Persistence => StatusCode::BAD_REQUEST,
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NotFound => "not found",
            ErrorKind::Persistence => "persistence error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Error {
        Error {
            kind: ErrorKind::Validation,
            msg: msg.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Error {
        Error {
            kind: ErrorKind::InvalidArgument,
            msg: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Error {
        Error {
            kind: ErrorKind::NotFound,
            msg: msg.into(),
        }
    }

    pub fn persistence(msg: impl Into<String>) -> Error {
        Error {
            kind: ErrorKind::Persistence,
            msg: msg.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let code = self.status_code();
        write!(f, "Error {} ({}), {}", code.as_str(), self.kind, self.msg)
    }
}

impl std::error::Error for Error {}

impl From<refinery::Error> for Error {
    fn from(err: refinery::Error) -> Error {
        Error::persistence(format!("Database 'refinery' migration error, {}", err))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Error {
        Error::persistence(format!("Database rusqlite error {}", err))
    }
}

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Error {
        Error::persistence(format!("Failed to get a database connection from pool, {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::validation(format!("JSON formatting error {}", err))
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for Error {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Error {
        Error::validation(format!("JSON deserialization error {}", err))
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(err: std::sync::PoisonError<T>) -> Error {
        Error::persistence(format!(
            "Failed to acquire internal lock because it was poisoned {}",
            err
        ))
    }
}

pub trait ErrorContext<T> {
    fn context<F>(self, context_add: F) -> Result<T>
    where
        F: FnOnce() -> String;
    fn context_str(self, context_add: &str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context<F>(self, context_add: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| append_context(err.into(), &context_add()))
    }
    fn context_str(self, context_add: &str) -> Result<T> {
        self.map_err(|err| append_context(err.into(), context_add))
    }
}

fn append_context(err: Error, context_add: &str) -> Error {
    let mut msg = err.msg;
    msg.push_str(", ");
    msg.push_str(context_add);
    Error {
        kind: err.kind,
        msg,
    }
}
