// src/matcher/cluster/matcher.rs
use std::sync::Arc;
use std::time::Instant;
use rayon::prelude::*;
use log::{debug, info};
use crate::error::Result;
use crate::types::CellValue;
use crate::table::{Column, Table};
use crate::config::subsystems::matcher::MatcherConfig;
use crate::matcher::algorithms::{scorer_for, SimilarityScorer};
use crate::matcher::types::{BestMatch, ClusterOptions};
use super::candidates::{CandidatePool, CandidateSource, FullScan};

/// Assigns every value of a column the best matching value from the same
/// column.
///
/// Each distinct value is scored against every distinct value (itself
/// included) and the highest score wins, ties going to the value seen first.
/// This is O(n²) comparisons in the number of distinct values, which suits
/// interactive tables but not bulk deduplication.
pub struct ClusteringMatcher {
    config: MatcherConfig,
    scorer: Box<dyn SimilarityScorer>,
    candidates: Box<dyn CandidateSource>,
    thread_pool: Option<Arc<rayon::ThreadPool>>,
}

impl std::fmt::Debug for ClusteringMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusteringMatcher")
            .field("scorer", &self.scorer.kind())
            .field("candidates", &self.candidates.name())
            .field("parallel_threshold", &self.config.parallel_threshold)
            .field("dedicated_pool", &self.thread_pool.is_some())
            .finish()
    }
}

impl ClusteringMatcher {
    pub fn new(config: MatcherConfig) -> Result<Self> {
        config.validate()?;

        // A dedicated pool only when a thread count is configured, otherwise rayon's global pool
        let thread_pool = if config.worker_threads > 0 {
            Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.thread_count())
                    .thread_name(|i| format!("jadwal-matcher-{}", i))
                    .build()?,
            ))
        } else {
            None
        };

        Ok(Self {
            scorer: scorer_for(config.scorer),
            candidates: Box::new(FullScan),
            thread_pool,
            config,
        })
    }

    /// Replaces the candidate strategy, e.g. with a blocking index.
    pub fn with_candidate_source(mut self, source: Box<dyn CandidateSource>) -> Self {
        self.candidates = source;
        self
    }

    pub fn scorer(&self) -> &dyn SimilarityScorer {
        self.scorer.as_ref()
    }

    /// Highest scoring pool entry for an already-normalized query.
    ///
    /// Among equal scores the lowest pool index wins, whatever order the
    /// candidate source yields indices in.
    pub fn best_match(&self, pool: &CandidatePool, query: &str) -> Option<BestMatch> {
        let mut best: Option<BestMatch> = None;
        for index in self.candidates.select(pool, query) {
            let score = self.scorer.score_processed(query, &pool.get(index).processed);
            let better = best.map_or(true, |b| {
                score > b.score || (score == b.score && index < b.candidate)
            });
            if better {
                best = Some(BestMatch { candidate: index, score });
            }
        }
        best
    }

    /// Cluster assignment for every row of `column`; nulls stay null.
    pub fn assign(&self, column: &Column) -> Vec<CellValue> {
        let start = Instant::now();
        let pool = CandidatePool::from_values(&column.values);

        let winners: Vec<Option<usize>> = if pool.len() >= self.config.parallel_threshold.max(1) {
            let run = || -> Vec<Option<usize>> {
                pool.entries()
                    .par_iter()
                    .map(|entry| self.best_match(&pool, &entry.processed).map(|m| m.candidate))
                    .collect()
            };
            match self.thread_pool {
                Some(ref thread_pool) => thread_pool.install(run),
                None => run(),
            }
        } else {
            pool.entries()
                .iter()
                .map(|entry| self.best_match(&pool, &entry.processed).map(|m| m.candidate))
                .collect()
        };

        let assignments = pool
            .row_slots()
            .iter()
            .map(|slot| match slot.and_then(|s| winners[s]) {
                Some(winner) => pool.get(winner).value.clone(),
                None => CellValue::Null,
            })
            .collect();

        debug!(
            "Assigned clusters for '{}': {} rows, {} distinct values, {} scorer, {:?}",
            column.name,
            column.len(),
            pool.len(),
            self.scorer.kind().as_str(),
            start.elapsed()
        );
        assignments
    }

    /// Inserts the cluster column right after `options.column`, then drops
    /// the source column and renames the derived one as requested.
    ///
    /// An empty record list carries no column names, so it is returned
    /// unchanged without checking `options.column`. A table that has columns
    /// but no rows is checked as usual and gains an empty derived column.
    pub fn cluster(&self, mut table: Table, options: &ClusterOptions) -> Result<Table> {
        if table.is_empty() {
            debug!(
                "Clustering '{}' on an empty record list, nothing to do",
                options.column
            );
            return Ok(table);
        }

        let index = table.require_column(&options.column)?;
        let assignments = self.assign(&table.columns()[index]);
        let derived = options.derived_name();
        table.insert_column(index + 1, Column::new(derived.clone(), assignments))?;

        if options.replace_col {
            table.remove_column(&options.column)?;
        }
        if let Some(ref name) = options.cluster_col_name {
            table.rename_column(&derived, name)?;
        }

        info!(
            "Clustered column '{}' across {} rows",
            options.column,
            table.row_count()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::error::Error;
    use crate::config::subsystems::matcher::ScorerKind;

    fn matcher() -> ClusteringMatcher {
        ClusteringMatcher::new(MatcherConfig::default()).unwrap()
    }

    fn column(values: serde_json::Value) -> Column {
        let values = values
            .as_array()
            .unwrap()
            .iter()
            .cloned()
            .map(|v| CellValue::try_from(v).unwrap())
            .collect();
        Column::new("c", values)
    }

    #[test]
    fn test_exact_duplicates_cluster_together() {
        let out = matcher().assign(&column(json!(["apple", "apple", "banana"])));
        assert_eq!(
            out,
            vec![CellValue::from("apple"), CellValue::from("apple"), CellValue::from("banana")]
        );
    }

    #[test]
    fn test_near_duplicates_take_first_occurrence() {
        let out = matcher().assign(&column(json!(["New York", "new york", "Boston"])));
        assert_eq!(
            out,
            vec![CellValue::from("New York"), CellValue::from("New York"), CellValue::from("Boston")]
        );
    }

    #[test]
    fn test_distinct_dissimilar_values_map_to_themselves() {
        let values = json!(["alpha", "zebra", "mountain", "quick"]);
        let out = matcher().assign(&column(values.clone()));
        let expected: Vec<CellValue> = column(values).values;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_nulls_stay_null_and_numbers_keep_type() {
        let out = matcher().assign(&column(json!([null, 42, "42", null])));
        assert_eq!(
            out,
            vec![CellValue::Null, CellValue::from(42i64), CellValue::from(42i64), CellValue::Null]
        );
    }

    #[test]
    fn test_best_match_prefers_earliest_on_ties() {
        let m = matcher();
        let pool = CandidatePool::from_values(&[
            CellValue::from("Acme Inc"),
            CellValue::from("ACME, inc."),
        ]);
        let best = m.best_match(&pool, "acme inc").unwrap();
        assert_eq!(best.candidate, 0);
        assert_eq!(best.score, 100.0);
        assert!(m.best_match(&CandidatePool::default(), "acme").is_none());
    }

    /// Yields pool indices last to first.
    struct Reversed;

    impl CandidateSource for Reversed {
        fn name(&self) -> &'static str {
            "reversed"
        }

        fn select(&self, pool: &CandidatePool, _query: &str) -> Vec<usize> {
            (0..pool.len()).rev().collect()
        }
    }

    #[test]
    fn test_candidate_order_does_not_change_winner() {
        let values = json!(["New York", "new york", "Boston", "NEW YORK", "boston"]);
        let full_scan = matcher().assign(&column(values.clone()));
        let reversed = matcher()
            .with_candidate_source(Box::new(Reversed))
            .assign(&column(values));

        assert_eq!(reversed, full_scan);
        assert_eq!(
            reversed,
            vec![
                CellValue::from("New York"),
                CellValue::from("New York"),
                CellValue::from("Boston"),
                CellValue::from("New York"),
                CellValue::from("Boston"),
            ]
        );
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let values = json!(["Jon Smith", "John Smith", "jane doe", "Jane Doe", "J. Smith", null, "Boston"]);
        let sequential = matcher().assign(&column(values.clone()));
        let parallel = ClusteringMatcher::new(MatcherConfig {
            parallel_threshold: 1,
            worker_threads: 2,
            ..MatcherConfig::default()
        })
        .unwrap()
        .assign(&column(values));
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_cluster_inserts_after_target() {
        let table = Table::from_json(json!([
            {"id": 1, "city": "New York", "n": 5},
            {"id": 2, "city": "new york", "n": 6},
        ]))
        .unwrap();
        let out = matcher().cluster(table, &ClusterOptions::new("city")).unwrap();
        assert_eq!(out.column_names(), vec!["id", "city", "city (clustered)", "n"]);
        assert_eq!(
            out.to_json(),
            json!([
                {"id": 1, "city": "New York", "city (clustered)": "New York", "n": 5},
                {"id": 2, "city": "new york", "city (clustered)": "New York", "n": 6},
            ])
        );
    }

    #[test]
    fn test_cluster_replace_and_rename() {
        let table = Table::from_json(json!([{"city": "Boston", "n": 1}])).unwrap();
        let options = ClusterOptions::new("city").with_name("city").replacing(true);
        let out = matcher().cluster(table, &options).unwrap();
        assert_eq!(out.column_names(), vec!["city", "n"]);
        assert_eq!(out.to_json(), json!([{"city": "Boston", "n": 1}]));
    }

    #[test]
    fn test_cluster_rename_collision_is_error() {
        let table = Table::from_json(json!([{"city": "Boston", "n": 1}])).unwrap();
        let options = ClusterOptions::new("city").with_name("n");
        assert!(matches!(
            matcher().cluster(table, &options),
            Err(Error::DuplicateColumns(_))
        ));
    }

    #[test]
    fn test_cluster_missing_column() {
        let table = Table::from_json(json!([{"a": 1}])).unwrap();
        assert!(matches!(
            matcher().cluster(table, &ClusterOptions::new("b")),
            Err(Error::MissingColumn(_))
        ));
    }

    #[test]
    fn test_cluster_empty_record_list_skips_column_check() {
        let empty = Table::from_json(json!([])).unwrap();
        let out = matcher().cluster(empty, &ClusterOptions::new("anything")).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.to_json(), json!([]));
    }

    #[test]
    fn test_cluster_columns_without_rows_are_still_checked() {
        let no_rows = Table::new(vec![Column::new("a", vec![])]).unwrap();
        assert!(matches!(
            matcher().cluster(no_rows.clone(), &ClusterOptions::new("typo")),
            Err(Error::MissingColumn(_))
        ));

        let out = matcher().cluster(no_rows, &ClusterOptions::new("a")).unwrap();
        assert_eq!(out.column_names(), vec!["a", "a (clustered)"]);
        assert_eq!(out.row_count(), 0);
    }

    #[test]
    fn test_configured_scorer_is_used() {
        let m = ClusteringMatcher::new(MatcherConfig {
            scorer: ScorerKind::Ratio,
            ..MatcherConfig::default()
        })
        .unwrap();
        assert_eq!(m.scorer().kind(), ScorerKind::Ratio);
    }
}
