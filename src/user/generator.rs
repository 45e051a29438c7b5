//! Synthetic audience generation
//!
//! This module contains the generator that fills the stage with fake
//! connected users. None of these users represent real clients.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::UserId;
use crate::user::User;

/// Nickname stems used for synthetic audience members
pub const AUDIENCE_NICKNAMES: [&str; 19] = [
    "RantMaster",
    "CringeKing",
    "SoapboxSally",
    "VentViper",
    "RageRabbit",
    "FuryFox",
    "MadMike",
    "AngryAnna",
    "IrateIan",
    "LivelyLisa",
    "BoldBob",
    "FieryFred",
    "PassionatePam",
    "IntenseIvy",
    "WildWill",
    "HotTakeHunter",
    "ReactionKing",
    "TomatoThrower",
    "BasedViewer",
];

/// Generator for synthetic audience members
#[derive(Debug)]
pub struct UserGenerator {
    rng: StdRng,
}

impl Default for UserGenerator {
    fn default() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl UserGenerator {
    /// Generator seeded from OS entropy
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that produces the same audiences for the same seed
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Generate between `min` and `max` (inclusive) synthetic users
    pub fn generate_audience(
        &mut self,
        min: usize,
        max: usize,
        created_at: DateTime<Utc>,
    ) -> Vec<User> {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let count = self.rng.gen_range(low..=high);

        (0..count).map(|_| self.generate_user(created_at)).collect()
    }

    /// Generate a single synthetic user with a nickname like `FuryFox417`
    pub fn generate_user(&mut self, created_at: DateTime<Utc>) -> User {
        let stem = AUDIENCE_NICKNAMES.choose(&mut self.rng).copied().unwrap_or("Viewer");
        let suffix: u32 = self.rng.gen_range(0..1000);

        User::with_id(UserId::new(), format!("{}{}", stem, suffix), created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_size_within_bounds() {
        let mut generator = UserGenerator::with_seed(7);
        for _ in 0..40 {
            let audience = generator.generate_audience(5, 12, Utc::now());
            assert!((5..=12).contains(&audience.len()));
        }
    }

    #[test]
    fn test_generated_users_are_distinct_and_not_scripted() {
        let mut generator = UserGenerator::with_seed(11);
        let audience = generator.generate_audience(12, 12, Utc::now());

        let mut ids: Vec<_> = audience.iter().map(|u| u.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 12);
        assert!(audience.iter().all(|u| !u.is_example_speaker()));
    }

    #[test]
    fn test_same_seed_same_audience() {
        let now = Utc::now();
        let nicknames = |seed| -> Vec<String> {
            UserGenerator::with_seed(seed).generate_audience(5, 12, now).into_iter().map(|u| u.nickname).collect()
        };
        assert_eq!(nicknames(21), nicknames(21));
    }

    #[test]
    fn test_nicknames_use_known_stems() {
        let mut generator = UserGenerator::with_seed(3);
        let user = generator.generate_user(Utc::now());
        assert!(AUDIENCE_NICKNAMES.iter().any(|stem| user.nickname.starts_with(stem)));
    }
}
