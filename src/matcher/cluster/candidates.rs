// src/matcher/cluster/candidates.rs
use ahash::AHashMap;
use crate::types::CellValue;
use crate::utils::string::default_process;
use crate::matcher::types::Candidate;

/// Distinct non-null values of a column in first-occurrence order, plus the
/// slot every row maps to.
///
/// A duplicate always scores exactly like its first occurrence and can only
/// lose the first-seen tie-break to it, so scoring one entry per distinct
/// value gives the same winner as scanning every row.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    entries: Vec<Candidate>,
    row_slots: Vec<Option<usize>>,
}

impl CandidatePool {
    pub fn from_values(values: &[CellValue]) -> Self {
        let mut entries: Vec<Candidate> = Vec::new();
        let mut row_slots = Vec::with_capacity(values.len());
        let mut seen: AHashMap<(u8, String), usize> = AHashMap::new();

        for (row, value) in values.iter().enumerate() {
            let text = match value.as_text() {
                Some(text) => text,
                None => {
                    row_slots.push(None);
                    continue;
                }
            };
            let tag = match value {
                CellValue::Bool(_) => 1,
                CellValue::Number(_) => 2,
                _ => 3,
            };
            let key = (tag, text.into_owned());
            let slot = match seen.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = entries.len();
                    entries.push(Candidate {
                        first_row: row,
                        value: value.clone(),
                        processed: default_process(&key.1),
                    });
                    seen.insert(key, slot);
                    slot
                }
            };
            row_slots.push(Some(slot));
        }

        Self { entries, row_slots }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> &Candidate {
        &self.entries[index]
    }

    /// Pool slot for each row, `None` for null cells.
    pub fn row_slots(&self) -> &[Option<usize>] {
        &self.row_slots
    }
}

/// Chooses which pool entries a query is scored against.
///
/// Indices may come back in any order; the matcher resolves ties by pool
/// index. A source that skips entries can change the winner, so it should
/// only drop entries that cannot win.
pub trait CandidateSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn select(&self, pool: &CandidatePool, query: &str) -> Vec<usize>;
}

/// Scores every query against every distinct value. O(n) per query, O(n²)
/// per column.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullScan;

impl CandidateSource for FullScan {
    fn name(&self) -> &'static str {
        "full_scan"
    }

    fn select(&self, pool: &CandidatePool, _query: &str) -> Vec<usize> {
        (0..pool.len()).collect()
    }
}
