use log::{debug, warn};

use crate::config::MatchConfig;
use crate::error::CanonError;
use crate::model::{Candidate, DecisionPath, Outcome, Resolution, Selection};
use crate::resolver::Resolver;

/// Classify ranked candidates for `input` into an outcome.
///
/// 1. No candidates: unmatched, nobody is asked.
/// 2. Best score `>= auto`: matched without asking.
/// 3. Best score `>= ask`: the resolver confirms the best candidate. A
///    rejection falls through to 4.
/// 4. Otherwise the resolver selects from the full list or keeps the input.
///
/// An out-of-range selection is re-prompted up to `max_reprompts` times and
/// then reported; it never turns into a silent "unmatched".
pub fn decide<R: Resolver + ?Sized>(
    input: &str,
    candidates: &[Candidate],
    resolver: &mut R,
    config: &MatchConfig,
) -> Result<Resolution, CanonError> {
    let Some(best) = candidates.first() else {
        debug!("'{input}': no candidates");
        return Ok(Resolution {
            outcome: Outcome::Unmatched,
            path: DecisionPath::NoCandidates,
        });
    };

    if best.score >= config.thresholds.auto {
        debug!("'{input}' -> '{}' auto-accepted ({:.3})", best.entry, best.score);
        return Ok(Resolution {
            outcome: Outcome::Matched(best.entry.clone()),
            path: DecisionPath::AutoAccepted,
        });
    }

    if best.score >= config.thresholds.ask {
        if resolver.confirm(input, best)? {
            debug!("'{input}' -> '{}' confirmed ({:.3})", best.entry, best.score);
            return Ok(Resolution {
                outcome: Outcome::Matched(best.entry.clone()),
                path: DecisionPath::Confirmed,
            });
        }
        debug!("'{input}': '{}' rejected, offering full list", best.entry);
    }

    select(input, candidates, resolver, config.max_reprompts)
}

fn select<R: Resolver + ?Sized>(
    input: &str,
    candidates: &[Candidate],
    resolver: &mut R,
    max_reprompts: usize,
) -> Result<Resolution, CanonError> {
    let mut attempts = 0;
    loop {
        match resolver.select(input, candidates)? {
            Selection::Keep => {
                debug!("'{input}': kept original");
                return Ok(Resolution {
                    outcome: Outcome::Unmatched,
                    path: DecisionPath::KeptOriginal,
                });
            }
            Selection::Pick(i) if i < candidates.len() => {
                let chosen = &candidates[i];
                debug!("'{input}' -> '{}' selected", chosen.entry);
                return Ok(Resolution {
                    outcome: Outcome::Matched(chosen.entry.clone()),
                    path: DecisionPath::Selected,
                });
            }
            Selection::Pick(i) => {
                if attempts >= max_reprompts {
                    return Err(CanonError::InvalidResolverResponse {
                        input: input.to_string(),
                        choice: i,
                        offered: candidates.len(),
                    });
                }
                attempts += 1;
                warn!(
                    "'{input}': selection {i} out of range (0..{}), asking again",
                    candidates.len()
                );
            }
        }
    }
}
