// Fitness-proportional selection over the whole tree.
//
// Every node is visited in preorder and gets exactly one uniform draw. It is
// selected when the draw falls below `max(fitness / 100, floor)`, so even the
// weakest node keeps a `floor` chance to reproduce. The returned ids follow
// the same preorder, which fixes the order in which children get attached.

use crate::note::format_motif;
use crate::tree::{MotifTree, NodeId};
use motif_grove_prng::RandomSource;
use tracing::info;

/// Probability that a node with `fitness` is selected.
pub fn selection_probability(fitness: f64, floor: f64) -> f64 {
    (fitness / 100.0).max(floor)
}

/// Pick the nodes that reproduce this round.
pub fn select_candidates<R: RandomSource + ?Sized>(
    tree: &MotifTree,
    floor: f64,
    verbose: bool,
    rng: &mut R,
) -> Vec<NodeId> {
    let mut selected = Vec::new();
    for id in tree.preorder() {
        let Some(node) = tree.get(id) else { continue };
        let probability = selection_probability(node.fitness(), floor);
        let draw = rng.next_f64();
        let chosen = draw < probability;
        if verbose {
            info!(
                node = %id,
                motif = %format_motif(node.motif()),
                fitness = node.fitness(),
                probability,
                draw,
                selected = chosen,
                "select"
            );
        }
        if chosen {
            selected.push(id);
        }
    }
    selected
}
