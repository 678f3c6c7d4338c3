use crate::{ImportError, Selector};

/// A selectable unit offered by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry<P> {
    pub label: String,
    pub payload: P,
}

impl<P> CandidateEntry<P> {
    pub fn new(label: impl Into<String>, payload: P) -> Self {
        Self {
            label: label.into(),
            payload,
        }
    }
}

/// Ask the selector which candidates to import.
///
/// The result keeps list order regardless of the order indices come back in;
/// duplicate and out-of-range indices are ignored. An empty candidate list
/// never reaches the selector.
pub fn select_candidates<P>(
    selector: &dyn Selector,
    candidates: Vec<CandidateEntry<P>>,
) -> Vec<CandidateEntry<P>> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let labels: Vec<String> = candidates.iter().map(|c| c.label.clone()).collect();
    let mut chosen = selector.select(&labels);
    chosen.sort_unstable();
    chosen.dedup();

    let mut chosen = chosen.into_iter().peekable();
    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(idx, candidate)| {
            while chosen.next_if(|&c| c < idx).is_some() {}
            chosen.next_if_eq(&idx).map(|_| candidate)
        })
        .collect()
}

/// Result of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The source offered nothing; carries the informational message.
    NothingToImport(String),
    /// Nothing was selected.
    Cancelled,
    /// Listing the source failed before anything was offered.
    SourceUnavailable(ImportError),
    Completed(BatchSummary),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub attempted: usize,
    pub imported: usize,
    pub skipped: usize,
    pub last_destination: Option<String>,
    pub failures: Vec<(String, ImportError)>,
}

/// Folds per-entry results into a [`BatchSummary`].
#[derive(Debug, Default)]
pub struct BatchTally {
    summary: BatchSummary,
}

impl BatchTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one attempted import; returns its 1-based position.
    pub fn record(&mut self, label: &str, result: Result<String, ImportError>) -> usize {
        self.summary.attempted += 1;
        match result {
            Ok(destination) => {
                self.summary.imported += 1;
                self.summary.last_destination = Some(destination);
            }
            Err(err) => self.summary.failures.push((label.to_string(), err)),
        }
        self.summary.attempted
    }

    /// Records an entry the adapter chose not to import.
    pub fn record_skip(&mut self) -> usize {
        self.summary.attempted += 1;
        self.summary.skipped += 1;
        self.summary.attempted
    }

    pub fn finish(self) -> BatchSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSelector(Vec<usize>);

    impl Selector for FixedSelector {
        fn select(&self, _labels: &[String]) -> Vec<usize> {
            self.0.clone()
        }

        fn choose(&self, _prompt: &str, _options: &[String]) -> Option<usize> {
            None
        }
    }

    fn entries() -> Vec<CandidateEntry<u32>> {
        vec![
            CandidateEntry::new("a", 10),
            CandidateEntry::new("b", 20),
            CandidateEntry::new("c", 30),
        ]
    }

    #[test]
    fn selection_keeps_list_order_and_payloads() {
        let picked = select_candidates(&FixedSelector(vec![2, 0, 2, 9]), entries());
        let payloads: Vec<u32> = picked.iter().map(|c| c.payload).collect();
        assert_eq!(payloads, vec![10, 30]);
    }

    #[test]
    fn empty_selection_is_cancel() {
        assert!(select_candidates(&FixedSelector(vec![]), entries()).is_empty());
    }

    #[test]
    fn tally_counts_success_failure_and_skip() {
        let mut tally = BatchTally::new();
        assert_eq!(tally.record("one", Ok("Default".into())), 1);
        assert_eq!(
            tally.record("two", Err(ImportError::Network("refused".into()))),
            2
        );
        assert_eq!(tally.record_skip(), 3);
        let summary = tally.finish();
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.last_destination.as_deref(), Some("Default"));
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "two");
    }
}
