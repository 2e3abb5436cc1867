use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error that can occur in crumpet.
///
/// Definition and configuration errors are fatal to the operation that
/// produced them; backend errors are propagated unchanged after the
/// executor has rolled back and released the connection.
#[derive(Debug)]
pub enum Error {
    /// An entity definition declared no primary key field.
    MissingPrimaryKey { model: String },

    /// An entity definition declared a second primary key field.
    DuplicatePrimaryKey { model: String, field: String },

    /// An entity definition declared the same attribute twice.
    DuplicateField { model: String, field: String },

    /// Pool configuration was rejected before any connection was attempted.
    InvalidConfig { message: String },

    /// The pool could not be built or a connection could not be checked out.
    ConnectionPool { source: BoxError },

    /// The pool has been shut down.
    PoolClosed,

    /// An operation referenced an entity type that was never registered.
    ModelNotRegistered { model: String },

    /// A limit was neither a row count nor an (offset, count) pair.
    InvalidLimit { message: String },

    /// Statement placeholders and positional arguments disagree.
    PlaceholderMismatch { expected: usize, actual: usize },

    /// A database value has no representation in the runtime value domain.
    TypeConversion { message: String },

    /// An error raised by the database backend, propagated unchanged.
    Driver { source: BoxError },

    /// Escape hatch for collaborator layers.
    Other(anyhow::Error),
}

impl Error {
    pub fn missing_primary_key(model: impl Into<String>) -> Self {
        Self::MissingPrimaryKey {
            model: model.into(),
        }
    }

    pub fn duplicate_primary_key(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::DuplicatePrimaryKey {
            model: model.into(),
            field: field.into(),
        }
    }

    pub fn duplicate_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::DuplicateField {
            model: model.into(),
            field: field.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn connection_pool(source: impl Into<BoxError>) -> Self {
        Self::ConnectionPool {
            source: source.into(),
        }
    }

    pub fn model_not_registered(model: impl Into<String>) -> Self {
        Self::ModelNotRegistered {
            model: model.into(),
        }
    }

    pub fn invalid_limit(message: impl Into<String>) -> Self {
        Self::InvalidLimit {
            message: message.into(),
        }
    }

    pub fn placeholder_mismatch(expected: usize, actual: usize) -> Self {
        Self::PlaceholderMismatch { expected, actual }
    }

    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    pub fn driver(source: impl Into<BoxError>) -> Self {
        Self::Driver {
            source: source.into(),
        }
    }

    pub fn is_invalid_limit(&self) -> bool {
        matches!(self, Self::InvalidLimit { .. })
    }

    pub fn is_pool_closed(&self) -> bool {
        matches!(self, Self::PoolClosed)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrimaryKey { model } => {
                write!(f, "no primary key defined for model `{model}`")
            }
            Self::DuplicatePrimaryKey { model, field } => {
                write!(f, "duplicate primary key for field `{field}` on model `{model}`")
            }
            Self::DuplicateField { model, field } => {
                write!(f, "duplicate field `{field}` on model `{model}`")
            }
            Self::InvalidConfig { message } => write!(f, "invalid configuration: {message}"),
            Self::ConnectionPool { source } => write!(f, "connection pool: {source}"),
            Self::PoolClosed => f.write_str("pool not available"),
            Self::ModelNotRegistered { model } => {
                write!(f, "model `{model}` is not registered with this Db")
            }
            Self::InvalidLimit { message } => write!(f, "invalid limit: {message}"),
            Self::PlaceholderMismatch { expected, actual } => write!(
                f,
                "statement has {expected} placeholders but {actual} arguments were given"
            ),
            Self::TypeConversion { message } => write!(f, "type conversion: {message}"),
            Self::Driver { source } => fmt::Display::fmt(source, f),
            Self::Other(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConnectionPool { source } | Self::Driver { source } => Some(source.as_ref()),
            Self::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_error_display() {
        let err = Error::missing_primary_key("User");
        assert_eq!(err.to_string(), "no primary key defined for model `User`");

        let err = Error::duplicate_primary_key("User", "email");
        assert_eq!(
            err.to_string(),
            "duplicate primary key for field `email` on model `User`"
        );
    }

    #[test]
    fn pool_closed_display() {
        assert_eq!(Error::PoolClosed.to_string(), "pool not available");
    }

    #[test]
    fn placeholder_mismatch_display() {
        let err = Error::placeholder_mismatch(3, 2);
        assert_eq!(
            err.to_string(),
            "statement has 3 placeholders but 2 arguments were given"
        );
    }

    #[test]
    fn driver_error_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::driver(io);
        assert_eq!(err.to_string(), "refused");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn anyhow_bridge() {
        let err: Error = anyhow::anyhow!("something failed").into();
        assert_eq!(err.to_string(), "something failed");
    }
}
