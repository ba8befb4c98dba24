use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum CanonError {
    /// Vocabulary file does not exist. Callers may treat this as empty.
    VocabularyNotFound { path: PathBuf },
    /// Vocabulary file exists but could not be read.
    VocabularyRead { path: PathBuf, message: String },
    /// Vocabulary file could not be written. The previous file is untouched.
    VocabularyWrite { path: PathBuf, message: String },
    /// Another writer holds the vocabulary lock.
    VocabularyLocked { path: PathBuf },
    /// Resolver picked a candidate outside the offered list, too many times.
    InvalidResolverResponse { input: String, choice: usize, offered: usize },
    /// Resolver failed on its own (closed input, broken pipe, ...).
    Resolver(String),
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold order, zero limit, ...).
    ConfigValidation(String),
    /// Failure while resolving a specific record of a batch.
    AtRecord { column: usize, row: usize, source: Box<CanonError> },
}

impl CanonError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::VocabularyNotFound { .. })
    }

    pub(crate) fn at_record(self, column: usize, row: usize) -> Self {
        Self::AtRecord { column, row, source: Box::new(self) }
    }
}

impl fmt::Display for CanonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VocabularyNotFound { path } => {
                write!(f, "vocabulary not found: {}", path.display())
            }
            Self::VocabularyRead { path, message } => {
                write!(f, "cannot read vocabulary {}: {message}", path.display())
            }
            Self::VocabularyWrite { path, message } => {
                write!(f, "cannot write vocabulary {}: {message}", path.display())
            }
            Self::VocabularyLocked { path } => {
                write!(f, "vocabulary {} is locked by another writer", path.display())
            }
            Self::InvalidResolverResponse { input, choice, offered } => write!(
                f,
                "invalid selection {choice} for '{input}' ({offered} candidate(s) offered)"
            ),
            Self::Resolver(msg) => write!(f, "resolver error: {msg}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::AtRecord { column, row, source } => {
                write!(f, "column {column}, record {row}: {source}")
            }
        }
    }
}

impl std::error::Error for CanonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AtRecord { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
