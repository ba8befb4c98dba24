//! `canonry-resolve` — fuzzy name matching against a canonical vocabulary.
//!
//! Pure engine crate: receives pre-loaded records and a vocabulary, asks an
//! injected [`Resolver`] when a match is uncertain, and returns resolved
//! records plus statistics. The only IO is the vocabulary file in [`store`].

pub mod batch;
pub mod config;
pub mod error;
pub mod memo;
pub mod model;
pub mod policy;
pub mod rank;
pub mod resolver;
pub mod score;
pub mod store;

pub use batch::{grow_vocabulary, run, run_columns};
pub use config::{KeyMode, MatchConfig, Thresholds};
pub use error::CanonError;
pub use memo::MatchMemo;
pub use model::{
    BatchOutcome, BatchReport, CanonicalEntry, Candidate, Column, Outcome, RunStatistics,
    Selection, Vocabulary,
};
pub use resolver::{Resolver, Unattended};
pub use store::VocabularyStore;
