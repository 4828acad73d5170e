// Fitness model: how good does a motif sound?
//
// The harmonic model sums three kinds of terms over a motif:
//
// - Scale membership: each note whose pitch class is in the C major scale
//   {0,2,4,5,7,9,11} earns a reward; every other note pays a penalty.
// - Intervals: each adjacent pair is classified by `|p[i] - p[i-1]| mod 12`.
//   Consonant intervals {4,5,7} earn a reward, dissonant ones {1,6,10} pay a
//   penalty, everything else is neutral.
// - Range: a note outside the acceptable pitch range pays a penalty, and a
//   second one if it is also outside the extreme range.
//
// Every magnitude is a fresh uniform draw in `[0, max)`, so the same motif
// scores differently each time it is evaluated. Draws happen only for terms
// that apply, in the order above, which keeps seeded runs reproducible.
//
// The raw sum is rescaled linearly from `[raw_worst, raw_best]` to [0, 100]
// and clamped unless `FitnessConfig::clamp` is off.

use crate::config::FitnessConfig;
use crate::note::Note;
use motif_grove_prng::RandomSource;

/// Pitch classes of the diatonic major scale on C.
const MAJOR_SCALE: [bool; 12] = [
    true, false, true, false, true, true, false, true, false, true, false, true,
];

/// Interval classes (semitones mod 12) that sound stable.
const CONSONANT_INTERVALS: [u8; 3] = [4, 5, 7];

/// Interval classes that clash.
const DISSONANT_INTERVALS: [u8; 3] = [1, 6, 10];

/// Anything that can rate a motif.
///
/// The tree calls this once per node, at creation. Implementations may draw
/// from `rng`; the draw order becomes part of the run's determinism.
pub trait FitnessModel {
    fn score<R: RandomSource + ?Sized>(&self, motif: &[Note], rng: &mut R) -> f64;
}

/// Scale, interval and range scoring with noisy magnitudes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HarmonicFitness {
    pub config: FitnessConfig,
}

impl HarmonicFitness {
    pub fn new(config: FitnessConfig) -> Self {
        HarmonicFitness { config }
    }
}

impl FitnessModel for HarmonicFitness {
    fn score<R: RandomSource + ?Sized>(&self, motif: &[Note], rng: &mut R) -> f64 {
        rescale(harmonic_score(motif, &self.config, rng), &self.config)
    }
}

/// Raw, unscaled harmonic score.
pub fn harmonic_score<R: RandomSource + ?Sized>(
    motif: &[Note],
    config: &FitnessConfig,
    rng: &mut R,
) -> f64 {
    let mut score = 0.0;

    for note in motif {
        let magnitude = draw(rng, config.scale_reward_max);
        if MAJOR_SCALE[note.pitch_class() as usize] {
            score += magnitude;
        } else {
            score -= magnitude;
        }
    }

    for pair in motif.windows(2) {
        let interval = pair[1].pitch.abs_diff(pair[0].pitch) % 12;
        if DISSONANT_INTERVALS.contains(&interval) {
            score -= draw(rng, config.interval_reward_max);
        } else if CONSONANT_INTERVALS.contains(&interval) {
            score += draw(rng, config.interval_reward_max);
        }
    }

    let [lo, hi] = config.acceptable_pitch;
    let [xlo, xhi] = config.extreme_pitch;
    for note in motif {
        if !(lo..=hi).contains(&note.pitch) {
            score -= draw(rng, config.range_penalty_max);
        }
        if !(xlo..=xhi).contains(&note.pitch) {
            score -= draw(rng, config.range_penalty_max);
        }
    }

    score
}

/// Map a raw score from `[raw_worst, raw_best]` onto [0, 100].
pub fn rescale(raw: f64, config: &FitnessConfig) -> f64 {
    let scaled = (raw - config.raw_worst) / (config.raw_best - config.raw_worst) * 100.0;
    if config.clamp {
        scaled.clamp(0.0, 100.0)
    } else {
        scaled
    }
}

/// Uniform magnitude in `[0, max)`; a zero bound disables the term.
fn draw<R: RandomSource + ?Sized>(rng: &mut R, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    rng.range_u64(0, u64::from(max)) as f64
}
