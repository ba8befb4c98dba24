use std::collections::BTreeSet;

use log::{debug, info};

use crate::config::MatchConfig;
use crate::error::CanonError;
use crate::memo::{Lookup, MatchMemo};
use crate::model::{
    BatchOutcome, BatchReport, CellChange, Column, DecisionPath, Outcome, RunMeta, RunStatistics,
    Vocabulary,
};
use crate::resolver::Resolver;

/// Resolve one column of records against `vocabulary`.
///
/// The input is not modified; resolved values come back in the outcome.
pub fn run<R: Resolver + ?Sized>(
    records: &[Option<String>],
    vocabulary: &Vocabulary,
    resolver: &mut R,
    config: &MatchConfig,
) -> Result<BatchOutcome, CanonError> {
    let column = Column::new(0, records.to_vec());
    run_columns(std::slice::from_ref(&column), vocabulary, resolver, config)
}

/// Resolve several columns in order with one shared memo, so an input seen
/// in an earlier column is not asked about again.
///
/// Any error aborts the whole run; no partial output is returned.
pub fn run_columns<R: Resolver + ?Sized>(
    columns: &[Column],
    vocabulary: &Vocabulary,
    resolver: &mut R,
    config: &MatchConfig,
) -> Result<BatchOutcome, CanonError> {
    let mut memo = MatchMemo::new(config.key_mode);
    let mut stats = RunStatistics::default();
    let mut unmatched = BTreeSet::new();
    let mut changes = Vec::new();
    let mut resolved = Vec::with_capacity(columns.len());

    for column in columns {
        let mut cells = column.cells.clone();

        for (row, cell) in cells.iter_mut().enumerate() {
            let Some(current) = cell.as_deref() else {
                continue;
            };
            let trimmed = current.trim();
            if trimmed.is_empty() {
                continue;
            }

            let lookup = memo
                .resolve_once(trimmed, vocabulary, resolver, config)
                .map_err(|e| e.at_record(column.index, row))?;

            stats.total_processed += 1;
            match &lookup {
                Lookup::Cached(_) => stats.memo_hits += 1,
                Lookup::Fresh(res) => match res.path {
                    DecisionPath::AutoAccepted => stats.auto_accepted += 1,
                    DecisionPath::Confirmed => stats.confirmed += 1,
                    DecisionPath::Selected => stats.selected += 1,
                    DecisionPath::KeptOriginal => stats.kept_original += 1,
                    DecisionPath::NoCandidates => {}
                },
            }

            match lookup.outcome() {
                Outcome::Matched(entry) => {
                    if entry.as_str() != current {
                        debug!("column {}, record {row}: '{current}' -> '{entry}'", column.index);
                        changes.push(CellChange {
                            column: column.index,
                            row,
                            from: current.to_string(),
                            to: entry.as_str().to_string(),
                        });
                        *cell = Some(entry.as_str().to_string());
                        stats.changed += 1;
                    }
                }
                Outcome::Unmatched => {
                    unmatched.insert(trimmed.to_string());
                    stats.unmatched += 1;
                }
            }
        }

        resolved.push(Column::new(column.index, cells));
    }

    info!(
        "processed {} record(s): {} changed, {} unmatched ({} distinct)",
        stats.total_processed,
        stats.changed,
        stats.unmatched,
        unmatched.len()
    );

    Ok(BatchOutcome {
        columns: resolved,
        stats,
        unmatched,
        changes,
    })
}

/// Ask the resolver which unmatched texts become canonical entries.
///
/// Texts are offered in sorted order. The admitted ones are returned for the
/// caller to persist with `VocabularyStore::merge_and_save`.
pub fn grow_vocabulary<R: Resolver + ?Sized>(
    unmatched: &BTreeSet<String>,
    resolver: &mut R,
) -> Result<Vec<String>, CanonError> {
    let mut admitted = Vec::new();
    for text in unmatched {
        if resolver.admit(text)? {
            debug!("admitted '{text}'");
            admitted.push(text.clone());
        }
    }
    Ok(admitted)
}

impl BatchOutcome {
    pub fn report(&self, vocabulary: &Vocabulary) -> BatchReport {
        BatchReport {
            meta: RunMeta {
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                vocabulary_size: vocabulary.len(),
            },
            stats: self.stats.clone(),
            unmatched: self.unmatched.iter().cloned().collect(),
            changes: self.changes.clone(),
        }
    }
}
