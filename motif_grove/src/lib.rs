// Motif Grove: tree-structured evolution of short musical phrases.
//
// A seed motif becomes the root of a tree. Each round, nodes are selected in
// proportion to their fitness, each selected node gains a mutated copy of its
// motif as a new child, and weak nodes are periodically pruned with their
// children re-homed rather than dropped. A melody is read off the surviving
// tree by preorder traversal.
//
// Architecture:
// - note.rs: Note value type, seed motif, motif formatting
// - config.rs: EvolutionConfig + MutationConfig + FitnessConfig (JSON-loadable)
// - error.rs: TreeError, ConfigError, EvolveError
// - fitness.rs: FitnessModel trait and the noisy harmonic scoring model
// - node.rs: MotifNode (motif, score, parent/child ids)
// - tree.rs: MotifTree arena with checked attach/replace/detach and validation
// - prune.rs: Postorder pruning with survivor re-parenting
// - selection.rs: Fitness-proportional selection with a probability floor
// - mutation.rs: Bounded pitch/duration perturbation
// - evolution.rs: MusicalTree and the pre-evolve -> generations -> final
//   prune loop
// - melody.rs: Preorder melody reader
//
// All randomness flows through an explicit `RandomSource` (see the
// `motif_grove_prng` crate), so runs are reproducible given a seed.

pub mod config;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod melody;
pub mod mutation;
pub mod node;
pub mod note;
pub mod prune;
pub mod selection;
pub mod tree;

pub use motif_grove_prng as prng;
