// cluster/mod.rs
pub mod matcher;
pub mod candidates;

// Re-export the matcher and candidate strategies
pub use self::matcher::ClusteringMatcher;
pub use self::candidates::{CandidatePool, CandidateSource, FullScan};
