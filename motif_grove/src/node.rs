// A single node of the evolutionary tree.
//
// A `MotifNode` holds one motif, its fitness score, and the links that place
// it in a `MotifTree`: an optional parent id and an ordered list of child ids.
// The links are private and only `tree.rs` rewrites them, so every mutation
// goes through the arena's checked attach/replace/detach operations. Fresh
// nodes are always detached: no parent, no children.
//
// The fitness score is computed once, at construction, from whatever
// `FitnessModel` the caller supplies. Copies of a tree carry their scores
// across verbatim rather than re-scoring (scoring is noisy).

use crate::fitness::FitnessModel;
use crate::note::Note;
use crate::tree::NodeId;
use motif_grove_prng::RandomSource;

#[derive(Clone, Debug, PartialEq)]
pub struct MotifNode {
    motif: Vec<Note>,
    fitness: f64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl MotifNode {
    /// Create a detached node, scoring `motif` immediately.
    pub fn new<F, R>(motif: Vec<Note>, fitness: &F, rng: &mut R) -> Self
    where
        F: FitnessModel + ?Sized,
        R: RandomSource + ?Sized,
    {
        let score = fitness.score(&motif, rng);
        Self::with_fitness(motif, score)
    }

    /// Create a detached node with a known score.
    pub fn with_fitness(motif: Vec<Note>, fitness: f64) -> Self {
        MotifNode {
            motif,
            fitness,
            parent: None,
            children: Vec::new(),
        }
    }

    /// The node's motif. Empty motifs are valid and yield an empty slice.
    pub fn motif(&self) -> &[Note] {
        &self.motif
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// The owning parent, or `None` for the root and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in attachment order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_grove_prng::ScriptedRng;

    struct LengthFitness;

    impl FitnessModel for LengthFitness {
        fn score<R: RandomSource + ?Sized>(&self, motif: &[Note], _rng: &mut R) -> f64 {
            motif.len() as f64
        }
    }

    #[test]
    fn new_node_is_scored_and_detached() {
        let mut rng = ScriptedRng::constant(0.5);
        let node = MotifNode::new(
            vec![Note::new(60, 0.2), Note::new(62, 0.2)],
            &LengthFitness,
            &mut rng,
        );
        assert_eq!(node.fitness(), 2.0);
        assert_eq!(node.parent(), None);
        assert!(node.is_leaf());
    }

    #[test]
    fn empty_motif_is_an_empty_slice() {
        let node = MotifNode::with_fitness(Vec::new(), 12.5);
        assert!(node.motif().is_empty());
        assert_eq!(node.fitness(), 12.5);
    }
}
