use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("audit found {issues} issue(s) across {markets} market(s)")]
    AuditFailed { markets: usize, issues: usize },
}

impl Error {
    /// The ledger rule this error reports, if it is one.
    #[must_use]
    pub const fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketId;

    #[test]
    fn domain_errors_stay_inspectable() {
        let err: Error = DomainError::MarketNotFound {
            market_id: MarketId::new("gone"),
        }
        .into();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::MarketNotFound { .. })
        ));
        assert_eq!(err.to_string(), "market not found: gone");
    }

    #[test]
    fn infrastructure_errors_have_no_domain_view() {
        let err = Error::Database("locked".into());
        assert!(err.as_domain().is_none());
    }
}
