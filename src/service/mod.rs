pub mod auto_match;
pub mod matcher;
pub mod normalizer;
pub mod similarity;

pub use auto_match::AutoMatchService;
pub use matcher::{MatchEngine, MatchError, MatchOptions};
