//! Catch roll for throwing a Pokeball
//!
//! Harder Pokemon are those with more base experience. Difficulty is a fifth of
//! the base experience, capped so that every Pokemon stays catchable.

use rand::Rng;

/// Highest difficulty a roll can face
const MAX_DIFFICULTY: u32 = 90;

/// Roll range is `0..ROLL_SIDES`
const ROLL_SIDES: u32 = 100;

/// Difficulty a roll must beat for a Pokemon with the given base experience
///
/// A missing base experience counts as zero.
pub fn difficulty(base_experience: Option<u32>) -> u32 {
    (base_experience.unwrap_or(0) / 5).min(MAX_DIFFICULTY)
}

/// Returns true if a roll in `0..100` beats the difficulty
pub fn attempt_catch<R: Rng + ?Sized>(base_experience: Option<u32>, rng: &mut R) -> bool {
    let chance = rng.gen_range(0..ROLL_SIDES);
    chance > difficulty(base_experience)
}
