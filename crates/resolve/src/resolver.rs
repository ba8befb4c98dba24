use crate::error::CanonError;
use crate::model::{Candidate, Selection};

/// Human (or scripted) decision maker consulted when a match is uncertain.
///
/// Calls block the batch until they return; there is no timeout.
pub trait Resolver {
    /// Accept `candidate` as the canonical form of `input`?
    fn confirm(&mut self, input: &str, candidate: &Candidate) -> Result<bool, CanonError>;

    /// Pick one of `candidates` for `input`, or keep the original.
    fn select(&mut self, input: &str, candidates: &[Candidate]) -> Result<Selection, CanonError>;

    /// Admit a previously unmatched `text` into the vocabulary?
    fn admit(&mut self, text: &str) -> Result<bool, CanonError>;
}

impl<R: Resolver + ?Sized> Resolver for &mut R {
    fn confirm(&mut self, input: &str, candidate: &Candidate) -> Result<bool, CanonError> {
        (**self).confirm(input, candidate)
    }

    fn select(&mut self, input: &str, candidates: &[Candidate]) -> Result<Selection, CanonError> {
        (**self).select(input, candidates)
    }

    fn admit(&mut self, text: &str) -> Result<bool, CanonError> {
        (**self).admit(text)
    }
}

/// Non-interactive resolver: only auto-accepted matches are applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unattended;

impl Resolver for Unattended {
    fn confirm(&mut self, _input: &str, _candidate: &Candidate) -> Result<bool, CanonError> {
        Ok(false)
    }

    fn select(&mut self, _input: &str, _candidates: &[Candidate]) -> Result<Selection, CanonError> {
        Ok(Selection::Keep)
    }

    fn admit(&mut self, _text: &str) -> Result<bool, CanonError> {
        Ok(false)
    }
}
