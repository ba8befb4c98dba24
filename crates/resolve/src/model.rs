use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

const QUOTES: &[char] = &['"', '\''];

/// A trusted vocabulary string. Always non-empty, trimmed and quote-stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalEntry(String);

impl CanonicalEntry {
    /// Normalize raw text into an entry. Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let unquoted = trimmed.strip_prefix(QUOTES).unwrap_or(trimmed);
        let unquoted = unquoted.strip_suffix(QUOTES).unwrap_or(unquoted);
        let text = unquoted.trim();
        if text.is_empty() {
            None
        } else {
            Some(Self(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CanonicalEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered set of canonical entries. First insertion wins; order is kept.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<CanonicalEntry>,
    index: HashSet<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Returns false if the text was already present.
    pub fn push(&mut self, entry: CanonicalEntry) -> bool {
        if self.index.contains(entry.as_str()) {
            return false;
        }
        self.index.insert(entry.as_str().to_string());
        self.entries.push(entry);
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        self.index.contains(text)
    }

    pub fn entries(&self) -> &[CanonicalEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Vocabulary {
    /// Blank items are skipped, duplicates collapse to the first occurrence.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut vocab = Vocabulary::new();
        for raw in iter {
            if let Some(entry) = CanonicalEntry::new(raw.as_ref()) {
                vocab.push(entry);
            }
        }
        vocab
    }
}

// ---------------------------------------------------------------------------
// Ranking + Resolution
// ---------------------------------------------------------------------------

/// A vocabulary entry scored against one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub entry: CanonicalEntry,
    pub score: f64,
    /// Index of the entry in the vocabulary it was ranked from.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "entry", rename_all = "snake_case")]
pub enum Outcome {
    Matched(CanonicalEntry),
    /// Keep the raw value; it is a vocabulary-growth candidate.
    Unmatched,
}

impl Outcome {
    pub fn matched(&self) -> Option<&CanonicalEntry> {
        match self {
            Self::Matched(entry) => Some(entry),
            Self::Unmatched => None,
        }
    }
}

/// How the policy reached its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPath {
    NoCandidates,
    AutoAccepted,
    Confirmed,
    Selected,
    KeptOriginal,
}

impl std::fmt::Display for DecisionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCandidates => write!(f, "no_candidates"),
            Self::AutoAccepted => write!(f, "auto_accepted"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Selected => write!(f, "selected"),
            Self::KeptOriginal => write!(f, "kept_original"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub path: DecisionPath,
}

/// Answer to a `select` prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Keep the original value; no match.
    Keep,
    /// 0-based index into the offered candidates.
    Pick(usize),
}

// ---------------------------------------------------------------------------
// Batch input / output
// ---------------------------------------------------------------------------

/// One column of cell values. `None` is an absent or non-text cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub cells: Vec<Option<String>>,
}

impl Column {
    pub fn new(index: usize, cells: Vec<Option<String>>) -> Self {
        Self { index, cells }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub total_processed: usize,
    pub changed: usize,
    pub unmatched: usize,
    pub auto_accepted: usize,
    pub confirmed: usize,
    pub selected: usize,
    pub kept_original: usize,
    pub memo_hits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellChange {
    pub column: usize,
    pub row: usize,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub columns: Vec<Column>,
    pub stats: RunStatistics,
    pub unmatched: BTreeSet<String>,
    pub changes: Vec<CellChange>,
}

impl BatchOutcome {
    /// Cells of the first column; the shape returned by single-column runs.
    pub fn records(&self) -> &[Option<String>] {
        self.columns.first().map(|c| c.cells.as_slice()).unwrap_or(&[])
    }

    pub fn into_records(self) -> Vec<Option<String>> {
        self.columns.into_iter().next().map(|c| c.cells).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    pub vocabulary_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub meta: RunMeta,
    pub stats: RunStatistics,
    pub unmatched: Vec<String>,
    pub changes: Vec<CellChange>,
}
