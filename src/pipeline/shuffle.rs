use std::sync::Mutex;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::types::Track;

/// Ordering applied to a candidate list before it is truncated.
pub trait Shuffle: Send + Sync {
    fn shuffle(&self, tracks: &mut Vec<Track>);
}

/// Thread-local randomness, a different order every run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomShuffle;

impl Shuffle for RandomShuffle {
    fn shuffle(&self, tracks: &mut Vec<Track>) {
        tracks.shuffle(&mut rand::rng());
    }
}

/// Reproducible order from a fixed seed.
pub struct SeededShuffle {
    rng: Mutex<StdRng>,
}

impl SeededShuffle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Shuffle for SeededShuffle {
    fn shuffle(&self, tracks: &mut Vec<Track>) {
        match self.rng.lock() {
            Ok(mut rng) => tracks.shuffle(&mut *rng),
            Err(poisoned) => tracks.shuffle(&mut *poisoned.into_inner()),
        }
    }
}

/// Leaves the collected order untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepOrder;

impl Shuffle for KeepOrder {
    fn shuffle(&self, _tracks: &mut Vec<Track>) {}
}
