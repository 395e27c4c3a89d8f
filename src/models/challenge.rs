use super::TrickId;
use crate::constants::MAX_CHALLENGE_TRICKS;

/// Index of a challenge in the catalog arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChallengeId(pub usize);

/// Fixed-size bitset of the challenge tricks landed in the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LandedSet(u64);

impl LandedSet {
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    fn mask(position: usize) -> u64 {
        if position < MAX_CHALLENGE_TRICKS {
            1u64 << position
        } else {
            0
        }
    }

    /// Marks `position` as landed. Positions past the bitset width are ignored.
    pub fn set(&mut self, position: usize) {
        self.0 |= Self::mask(position);
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn contains(self, position: usize) -> bool {
        self.0 & Self::mask(position) != 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every position in `0..len` is set.
    pub fn is_complete(self, len: usize) -> bool {
        (0..len.min(MAX_CHALLENGE_TRICKS)).all(|i| self.contains(i))
    }

    /// First position in `0..len` that is not yet set.
    pub fn first_unset(self, len: usize) -> Option<usize> {
        (0..len.min(MAX_CHALLENGE_TRICKS)).find(|&i| !self.contains(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeData {
    pub id: ChallengeId,
    pub name: String,
    /// The defender whose line this challenge reproduces.
    pub person: String,
    pub category: String,
    pub difficulty: i32,
    pub tricks: Vec<TrickId>,
    pub hash: u32,
    /// Position among challenges sharing `hash`.
    pub index: u8,
    pub completed: bool,
    pub landed: LandedSet,
}

impl ChallengeData {
    pub fn has_progress(&self) -> bool {
        self.completed || !self.landed.is_empty()
    }

    /// Fraction of constituent tricks landed in the current attempt.
    pub fn attempt_fraction(&self) -> f32 {
        if self.completed {
            return 1.0;
        }
        crate::progress::safe_fraction(self.landed.count(), u32::try_from(self.tricks.len()).unwrap_or(u32::MAX))
    }
}
