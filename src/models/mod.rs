pub mod candidate;
pub mod item;
pub mod record;

pub use candidate::{MatchCandidate, MatchType};
pub use item::{IttItem, ResponseItem};
pub use record::{MatchPairRow, MatchRecord, MatchRunStats, MatchStatus};
