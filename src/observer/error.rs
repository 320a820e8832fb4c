use thiserror::Error;

use crate::attribute::CoercionError;
use crate::processor::PersistenceError;

/// Observer system errors. None of them are recovered from inside the
/// pipeline; the caller decides whether to skip, retry or abort.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ObserverError {
    #[error("Row {line}: missing value for key column '{column}'")]
    MissingKey { line: usize, column: &'static str },

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Coercion error: {0}")]
    Coercion(#[from] CoercionError),

    #[error("Unknown attribute set: {0}")]
    UnknownAttributeSet(String),

    #[error("Observer {observer} found no published entity id for SKU {sku}")]
    MissingEntityId { observer: &'static str, sku: String },

    #[error("Observer {observer} requires {requires}, which is not scheduled before it")]
    Ordering { observer: &'static str, requires: &'static str },

    #[error("Row {line} failed: {source}")]
    RowFailed {
        line: usize,
        #[source]
        source: Box<ObserverError>,
    },
}

impl ObserverError {
    /// Wrap a row-level failure with its source line
    pub fn at_line(self, line: usize) -> Self {
        match self {
            ObserverError::RowFailed { .. } => self,
            other => ObserverError::RowFailed { line, source: Box::new(other) },
        }
    }

    /// The underlying error, looking through the row wrapper
    pub fn root(&self) -> &ObserverError {
        match self {
            ObserverError::RowFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_line_wraps_once() {
        let err = ObserverError::UnknownAttributeSet("Bags".into()).at_line(4).at_line(9);
        match &err {
            ObserverError::RowFailed { line, .. } => assert_eq!(*line, 4),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.root(), &ObserverError::UnknownAttributeSet("Bags".into()));
    }

    #[test]
    fn persistence_errors_convert_unchanged() {
        let source = PersistenceError::Unavailable("db down".into());
        let err: ObserverError = source.clone().into();
        assert_eq!(err, ObserverError::Persistence(source));
    }
}
