// Motif mutation.
//
// Produces a perturbed copy of a motif; the input is never touched. Each
// note draws two offsets, pitch first then duration:
// - pitch moves by a uniform integer in [-max_pitch_step, max_pitch_step]
//   and is clamped to 0-127;
// - duration moves by a uniform number of hundredths in
//   [-max_duration_step_hundredths, +max] and is clamped to 0.1-0.7.
//
// The offset is added to the duration as given; a duration off the
// hundredth grid (0.125, say) stays off it.

use crate::config::MutationConfig;
use crate::note::{DURATION_MAX, DURATION_MIN, Note, PITCH_MAX, PITCH_MIN};
use motif_grove_prng::RandomSource;

/// Return a mutated copy of `motif`, same length.
pub fn mutate_motif<R: RandomSource + ?Sized>(
    motif: &[Note],
    config: &MutationConfig,
    rng: &mut R,
) -> Vec<Note> {
    motif.iter().map(|&note| mutate_note(note, config, rng)).collect()
}

/// Perturb a single note.
pub fn mutate_note<R: RandomSource + ?Sized>(
    note: Note,
    config: &MutationConfig,
    rng: &mut R,
) -> Note {
    let pitch_step = i64::from(config.max_pitch_step);
    let duration_step = i64::from(config.max_duration_step_hundredths);

    let pitch = (i64::from(note.pitch) + rng.range_i64_inclusive(-pitch_step, pitch_step))
        .clamp(i64::from(PITCH_MIN), i64::from(PITCH_MAX)) as u8;

    let offset = rng.range_i64_inclusive(-duration_step, duration_step) as f64 / 100.0;
    let duration = (note.duration + offset).clamp(DURATION_MIN, DURATION_MAX);

    Note { pitch, duration }
}
