// The evolutionary tree and its generation loop.
//
// `MusicalTree` owns a `MotifTree`, the exact reachable-node count, the run
// configuration and the fitness model. `run_evolution` is a single linear
// pass through these phases:
//
//   Idle -> PreEvolve -> Generation(0..n) -> FinalPrune -> Done
//
// - PreEvolve: `pre_evolve_rounds` rounds of select -> mutate -> attach.
// - Generation(i): `rounds_per_generation` such rounds, then prune passes
//   with a threshold that starts at `initial_prune_threshold` and rises by
//   `generation_threshold_step` after each pass until the tree holds at most
//   `max_population` nodes.
// - FinalPrune: keeps raising the threshold from wherever the last
//   generation stopped, by `final_threshold_step` per pass, until at most
//   `final_population` nodes remain.
//
// With `config.verbose` set, every prune pass reports its threshold and the
// resulting size at `info` level, next to the selection and reproduction
// lines.
//
// Raising the threshold is the backpressure: a pass at a low threshold may
// remove nothing, so each retry cuts deeper until the population fits.
//
// Within a round, selection sees the tree as it was before the round began;
// children attached during the round are not candidates until the next one.
//
// The node count is exact at all times: +1 per attached child, -1 per pruned
// node, and recounted from the root after every prune pass.
//
// All randomness comes from the `RandomSource` passed to `new`/`run_evolution`
// and is consumed in a fixed order (selection draws for the whole tree, then
// per candidate: mutation draws, then fitness draws for the child).

use crate::config::EvolutionConfig;
use crate::error::{EvolveError, TreeResult};
use crate::fitness::{FitnessModel, HarmonicFitness};
use crate::melody::generate_melody;
use crate::mutation::mutate_motif;
use crate::node::MotifNode;
use crate::note::{Note, default_seed_motif, format_motif};
use crate::selection::select_candidates;
use crate::tree::{MotifTree, NodeId};
use motif_grove_prng::RandomSource;
use serde::Serialize;
use tracing::{debug, info};

/// Where a `MusicalTree` is in its single pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PreEvolve,
    Generation(usize),
    FinalPrune,
    Done,
}

/// Sizes and thresholds from one generation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    /// Node count after the generation's rounds, before pruning.
    pub grown_size: usize,
    /// Node count after pruning.
    pub pruned_size: usize,
    pub prune_passes: usize,
    /// Threshold the next prune pass would have used.
    pub next_threshold: f64,
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvolutionReport {
    pub pre_evolve_size: usize,
    pub generations: Vec<GenerationStats>,
    pub final_prune_passes: usize,
    pub final_threshold: f64,
    pub final_size: usize,
}

/// A motif tree plus everything needed to evolve it.
///
/// `Clone` deep-copies the tree: scores and structure are copied, nodes are
/// not shared.
#[derive(Clone, Debug)]
pub struct MusicalTree<F = HarmonicFitness> {
    tree: MotifTree,
    size: usize,
    phase: Phase,
    config: EvolutionConfig,
    fitness: F,
}

impl MusicalTree<HarmonicFitness> {
    /// A tree seeded with the default motif, scored by the harmonic model
    /// configured in `config.fitness`.
    pub fn new<R: RandomSource + ?Sized>(config: EvolutionConfig, rng: &mut R) -> Self {
        Self::with_seed(default_seed_motif(), config, rng)
    }

    /// A tree seeded with `seed`, scored by the harmonic model.
    pub fn with_seed<R: RandomSource + ?Sized>(
        seed: Vec<Note>,
        config: EvolutionConfig,
        rng: &mut R,
    ) -> Self {
        let fitness = HarmonicFitness::new(config.fitness.clone());
        Self::with_fitness(seed, config, fitness, rng)
    }
}

impl<F: FitnessModel> MusicalTree<F> {
    /// A tree seeded with `seed` and scored by a caller-supplied model.
    pub fn with_fitness<R: RandomSource + ?Sized>(
        seed: Vec<Note>,
        config: EvolutionConfig,
        fitness: F,
        rng: &mut R,
    ) -> Self {
        let root = MotifNode::new(seed, &fitness, rng);
        MusicalTree {
            tree: MotifTree::new(root),
            size: 1,
            phase: Phase::Idle,
            config,
            fitness,
        }
    }

    pub fn tree(&self) -> &MotifTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn root_node(&self) -> Option<&MotifNode> {
        self.tree.get(self.tree.root())
    }

    /// Exact number of nodes reachable from the root.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Read the current tree as one melody.
    pub fn generate_melody(&self) -> Vec<Note> {
        generate_melody(&self.tree)
    }

    /// Run the whole pre-evolve -> generations -> final prune pass.
    ///
    /// The configuration is validated first; an invalid one is returned as
    /// `EvolveError::Config` with the tree still `Idle`.
    pub fn run_evolution<R: RandomSource + ?Sized>(
        &mut self,
        num_generations: usize,
        rng: &mut R,
    ) -> Result<EvolutionReport, EvolveError> {
        if self.phase != Phase::Idle {
            return Err(EvolveError::AlreadyRun(self.phase));
        }
        self.config.validate()?;

        self.phase = Phase::PreEvolve;
        debug!(rounds = self.config.pre_evolve_rounds, "pre-evolve");
        for _ in 0..self.config.pre_evolve_rounds {
            self.evolve_round(rng)?;
        }
        let pre_evolve_size = self.size;

        let mut threshold = self.config.initial_prune_threshold;
        let mut generations = Vec::with_capacity(num_generations);
        for generation in 0..num_generations {
            self.phase = Phase::Generation(generation);
            debug!(generation, size = self.size, "generation start");
            for _ in 0..self.config.rounds_per_generation {
                self.evolve_round(rng)?;
            }
            let grown_size = self.size;

            threshold = self.config.initial_prune_threshold;
            let mut prune_passes = 0;
            while self.size > self.config.max_population {
                self.prune_pass(threshold)?;
                prune_passes += 1;
                if self.config.verbose {
                    info!(generation, threshold, size = self.size, "prune pass");
                }
                threshold += self.config.generation_threshold_step;
            }

            generations.push(GenerationStats {
                generation,
                grown_size,
                pruned_size: self.size,
                prune_passes,
                next_threshold: threshold,
            });
        }

        self.phase = Phase::FinalPrune;
        debug!(size = self.size, threshold, "final prune");
        let mut final_prune_passes = 0;
        while self.size > self.config.final_population {
            self.prune_pass(threshold)?;
            final_prune_passes += 1;
            if self.config.verbose {
                info!(threshold, size = self.size, "final prune pass");
            }
            threshold += self.config.final_threshold_step;
        }
        debug!(size = self.size, passes = final_prune_passes, "final size");

        self.phase = Phase::Done;
        Ok(EvolutionReport {
            pre_evolve_size,
            generations,
            final_prune_passes,
            final_threshold: threshold,
            final_size: self.size,
        })
    }

    /// One round of select -> mutate -> attach. Returns how many children
    /// were added.
    fn evolve_round<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> TreeResult<usize> {
        let verbose = self.config.verbose;
        let candidates = select_candidates(
            &self.tree,
            self.config.min_selection_probability,
            verbose,
            rng,
        );

        for &parent in &candidates {
            let motif = self.tree.node(parent)?.motif();
            let mutated = mutate_motif(motif, &self.config.mutation, rng);
            if verbose {
                info!(
                    parent = %parent,
                    reproduce = %format_motif(motif),
                    child = %format_motif(&mutated),
                    "reproduce"
                );
            }
            let child = self.tree.insert(MotifNode::new(mutated, &self.fitness, rng));
            self.tree.attach_child(parent, child)?;
            self.size += 1;
        }
        Ok(candidates.len())
    }

    /// Prune the whole tree once and reconcile the node count.
    fn prune_pass(&mut self, threshold: f64) -> TreeResult<usize> {
        let removed = self.tree.prune_all(threshold)?;
        self.size -= removed;
        let counted = self.tree.size();
        debug_assert_eq!(self.size, counted, "node count drifted during prune");
        self.size = counted;
        Ok(removed)
    }
}
