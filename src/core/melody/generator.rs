use log::debug;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::Melody;
use crate::core::error::InvalidInput;
use crate::core::theory::{NoteSet, Pitch};

/// Constrained random walk over `note_set`.
///
/// The first pitch is drawn uniformly from the pool. Every following pitch is
/// drawn uniformly from the pool members within `max_interval` semitones of the
/// previous pitch; when no member qualifies the draw falls back to the whole
/// pool instead of failing.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    note_set: &NoteSet,
    length: usize,
    max_interval: i32,
) -> Result<Melody, InvalidInput> {
    if note_set.is_empty() {
        return Err(InvalidInput::EmptyNoteSet);
    }
    if length == 0 {
        return Err(InvalidInput::ZeroLength);
    }

    let pool = note_set.to_vec();
    let mut notes = Vec::with_capacity(length);
    let mut last = pick(rng, &pool);
    notes.push(last);

    while notes.len() < length {
        let nearby: Vec<Pitch> = pool
            .iter()
            .copied()
            .filter(|&p| (p as i32 - last as i32).abs() <= max_interval)
            .collect();

        last = if nearby.is_empty() {
            debug!("no pitch within {} of {}, drawing from the full pool", max_interval, last);
            pick(rng, &pool)
        } else {
            pick(rng, &nearby)
        };
        notes.push(last);
    }

    Ok(Melody::new(notes))
}

// Callers guarantee `from` is non-empty.
fn pick<R: Rng + ?Sized>(rng: &mut R, from: &[Pitch]) -> Pitch {
    from.choose(rng).copied().unwrap_or_default()
}

/// Owns the random source used for every round
pub struct MelodyGenerator {
    rng: StdRng,
}

impl MelodyGenerator {
    pub fn from_os_rng() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn generate(
        &mut self,
        note_set: &NoteSet,
        length: usize,
        max_interval: i32,
    ) -> Result<Melody, InvalidInput> {
        generate(&mut self.rng, note_set, length, max_interval)
    }
}
