pub mod trick;
pub mod challenge;

pub use trick::{Stance, TrickEntry, TrickId, TrickStatus};
pub use challenge::{ChallengeData, ChallengeId, LandedSet};
