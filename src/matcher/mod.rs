pub mod algorithms;
pub mod similarity;
pub mod cluster;
pub mod types;
// Re-export the main types
pub use self::cluster::{ClusteringMatcher, CandidatePool, CandidateSource, FullScan};
pub use self::algorithms::{scorer_for, SimilarityScorer};
pub use self::types::{
    BestMatch,
    Candidate,
    ClusterOptions,
};
