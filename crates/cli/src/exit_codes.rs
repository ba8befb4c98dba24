//! CLI Exit Code Registry
//!
//! Single source of truth for `canonry` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | General error (unspecified)                     |
//! | 2    | Usage error (bad args, conflicting options)     |
//! | 3    | I/O error (records or vocabulary file)          |
//! | 4    | Invalid config                                  |
//! | 5    | Vocabulary locked by another writer             |
//! | 6    | Resolver failure (prompt input closed, invalid) |

use canonry_resolve::CanonError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// Reading or writing a records or vocabulary file failed.
pub const EXIT_IO: u8 = 3;

/// Config file could not be parsed or failed validation.
pub const EXIT_CONFIG: u8 = 4;

/// Vocabulary `.lock` file held by another process.
pub const EXIT_LOCKED: u8 = 5;

/// Interactive resolution failed (closed input, repeated invalid choice).
pub const EXIT_RESOLVER: u8 = 6;

/// Map an engine error to its exit code.
pub fn canon_exit_code(err: &CanonError) -> u8 {
    match err {
        CanonError::VocabularyNotFound { .. }
        | CanonError::VocabularyRead { .. }
        | CanonError::VocabularyWrite { .. } => EXIT_IO,
        CanonError::VocabularyLocked { .. } => EXIT_LOCKED,
        CanonError::InvalidResolverResponse { .. } | CanonError::Resolver(_) => EXIT_RESOLVER,
        CanonError::ConfigParse(_) | CanonError::ConfigValidation(_) => EXIT_CONFIG,
        CanonError::AtRecord { source, .. } => canon_exit_code(source),
    }
}
