use std::collections::HashMap;

use log::debug;

use crate::config::{KeyMode, MatchConfig};
use crate::error::CanonError;
use crate::model::{Outcome, Resolution, Vocabulary};
use crate::policy::decide;
use crate::rank::rank;
use crate::resolver::Resolver;

/// Result of `MatchMemo::resolve_once`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Resolved just now through ranking and the policy.
    Fresh(Resolution),
    /// Served from an earlier resolution in this run.
    Cached(Outcome),
}

impl Lookup {
    pub fn outcome(&self) -> &Outcome {
        match self {
            Self::Fresh(res) => &res.outcome,
            Self::Cached(outcome) => outcome,
        }
    }
}

/// Per-run cache of resolved inputs. Each distinct input is ranked and
/// prompted for at most once; the memo is dropped at the end of the run.
#[derive(Debug, Default)]
pub struct MatchMemo {
    key_mode: KeyMode,
    resolved: HashMap<String, Outcome>,
    hits: usize,
    misses: usize,
}

impl MatchMemo {
    pub fn new(key_mode: KeyMode) -> Self {
        Self {
            key_mode,
            ..Self::default()
        }
    }

    /// Resolve `input` (trimmed), or return the outcome stored for it.
    ///
    /// Failures are not stored, so a later occurrence is asked again.
    pub fn resolve_once<R: Resolver + ?Sized>(
        &mut self,
        input: &str,
        vocabulary: &Vocabulary,
        resolver: &mut R,
        config: &MatchConfig,
    ) -> Result<Lookup, CanonError> {
        let trimmed = input.trim();
        let key = self.key_mode.key(trimmed);

        if let Some(outcome) = self.resolved.get(&key) {
            self.hits += 1;
            debug!("'{trimmed}': memo hit");
            return Ok(Lookup::Cached(outcome.clone()));
        }

        let candidates = rank(trimmed, vocabulary, config.limit);
        let resolution = decide(trimmed, &candidates, resolver, config)?;
        self.misses += 1;
        self.resolved.insert(key, resolution.outcome.clone());
        Ok(Lookup::Fresh(resolution))
    }

    pub fn get(&self, input: &str) -> Option<&Outcome> {
        self.resolved.get(&self.key_mode.key(input.trim()))
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
