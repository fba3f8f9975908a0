pub mod matcher;
pub mod server;
pub mod logging;

pub use matcher::{MatcherConfig, ScorerKind};
pub use server::ServerConfig;
pub use logging::LoggingConfig;
