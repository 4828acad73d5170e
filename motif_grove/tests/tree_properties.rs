// Structural properties of the motif tree under random attach and prune
// sequences: acyclic parent chains, consistent back-references, no lost
// children on prune, a root that always survives, and complete melodies.

use motif_grove::config::MutationConfig;
use motif_grove::error::TreeError;
use motif_grove::melody::generate_melody;
use motif_grove::mutation::mutate_note;
use motif_grove::node::MotifNode;
use motif_grove::note::Note;
use motif_grove::prng::{GroveRng, RandomSource};
use motif_grove::tree::{MotifTree, NodeId};

fn random_node(rng: &mut GroveRng) -> MotifNode {
    let len = rng.range_u64(0, 5) as usize;
    let motif = (0..len)
        .map(|_| Note::new(rng.range_u64(40, 90) as u8, 0.25))
        .collect();
    MotifNode::with_fitness(motif, rng.next_f64() * 100.0)
}

/// A tree of `n` nodes, each attached under a uniformly chosen earlier node.
fn random_tree(n: usize, rng: &mut GroveRng) -> MotifTree {
    let mut tree = MotifTree::new(random_node(rng));
    let mut ids = vec![tree.root()];
    for _ in 1..n {
        let parent = ids[rng.range_u64(0, ids.len() as u64) as usize];
        let id = tree.insert(random_node(rng));
        tree.attach_child(parent, id).unwrap();
        ids.push(id);
    }
    tree
}

fn assert_well_formed(tree: &MotifTree) {
    tree.validate().unwrap();
    let root = tree.root();
    assert_eq!(tree.node(root).unwrap().parent(), None);

    for id in tree.preorder() {
        let node = tree.node(id).unwrap();

        // Parent chain reaches the root in exactly `depth` steps.
        let chain: Vec<NodeId> = tree.ancestors(id).collect();
        assert_eq!(chain.len(), tree.depth(id).unwrap());
        if id != root {
            assert_eq!(chain.last(), Some(&root), "{id} does not reach the root");
        }
        let mut seen = chain.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), chain.len(), "{id} revisits an ancestor");

        // Back-references agree in both directions.
        if let Some(parent) = node.parent() {
            let listed = tree
                .node(parent)
                .unwrap()
                .children()
                .iter()
                .filter(|&&c| c == id)
                .count();
            assert_eq!(listed, 1, "{id} listed {listed} times under {parent}");
        }
        for &child in node.children() {
            assert_eq!(tree.node(child).unwrap().parent(), Some(id));
        }
    }
}

#[test]
fn random_attach_and_prune_keep_the_tree_well_formed() {
    for seed in 0..20 {
        let mut rng = GroveRng::new(seed);
        let mut tree = random_tree(60, &mut rng);
        assert_well_formed(&tree);
        assert_eq!(tree.size(), 60);

        for threshold in [10.0, 30.0, 55.0, 80.0] {
            let before = tree.size();
            let removed = tree.prune_all(threshold).unwrap();
            assert_eq!(tree.size(), before - removed);
            assert_eq!(tree.live_count(), tree.size());
            assert_well_formed(&tree);
        }
    }
}

#[test]
fn pruning_one_node_loses_only_that_node() {
    for seed in 0..20 {
        let mut rng = GroveRng::new(100 + seed);
        let mut tree = random_tree(40, &mut rng);

        let ids = tree.preorder();
        for &id in &ids {
            tree.set_fitness(id, 100.0).unwrap();
        }
        // Doom the first non-root node that has children, or the root.
        let victim = ids
            .iter()
            .copied()
            .find(|&id| id != tree.root() && !tree.node(id).unwrap().is_leaf())
            .unwrap_or(tree.root());
        tree.set_fitness(victim, 0.0).unwrap();
        let before = tree.size();

        assert_eq!(tree.prune_all(50.0), Ok(1));
        assert_eq!(tree.size(), before - 1);
        for &id in &ids {
            assert_eq!(tree.contains(id), id != victim, "{id} changed liveness");
        }
        assert_well_formed(&tree);
    }
}

#[test]
fn pruning_never_empties_the_tree() {
    for seed in 0..10 {
        let mut rng = GroveRng::new(200 + seed);
        let mut tree = random_tree(30, &mut rng);
        tree.prune_all(f64::INFINITY).unwrap();
        assert_eq!(tree.size(), 1);
        for _ in 0..3 {
            assert_eq!(tree.prune_all(f64::INFINITY), Ok(0));
            assert_eq!(tree.size(), 1);
        }
        assert_well_formed(&tree);
    }
}

#[test]
fn melody_covers_every_motif_in_preorder() {
    for n in [1, 5, 50] {
        let mut rng = GroveRng::new(n as u64);
        let tree = random_tree(n, &mut rng);

        let expected: Vec<Note> = tree
            .preorder()
            .into_iter()
            .flat_map(|id| tree.node(id).unwrap().motif().to_vec())
            .collect();
        let total: usize = tree
            .preorder()
            .into_iter()
            .map(|id| tree.node(id).unwrap().motif().len())
            .sum();

        let melody = generate_melody(&tree);
        assert_eq!(melody.len(), total, "wrong length for {n} nodes");
        assert_eq!(melody, expected);
    }
}

#[test]
fn mutation_stays_in_bounds() {
    let config = MutationConfig::default();
    let mut rng = GroveRng::new(64);
    for _ in 0..10_000 {
        let out = mutate_note(Note::new(64, 0.4), &config, &mut rng);
        assert!(out.pitch <= 127, "pitch out of range: {}", out.pitch);
        assert!(
            (0.1..=0.7).contains(&out.duration),
            "duration out of range: {}",
            out.duration
        );
    }
}

#[test]
fn rejected_edits_leave_the_tree_unchanged() {
    let mut rng = GroveRng::new(7);
    let mut tree = random_tree(20, &mut rng);
    let root = tree.root();
    let leaf = tree
        .preorder()
        .into_iter()
        .find(|&id| tree.node(id).unwrap().is_leaf())
        .unwrap();
    let parent = tree.node(leaf).unwrap().parent().unwrap();
    let before = generate_melody(&tree);

    assert!(matches!(
        tree.attach_child(leaf, root),
        Err(TreeError::Cycle { .. })
    ));
    assert!(matches!(
        tree.attach_child(parent, leaf),
        Err(TreeError::DuplicateChild { .. })
    ));
    assert!(matches!(
        tree.destroy_subtree(leaf),
        Err(TreeError::StillAttached(_))
    ));

    assert_eq!(generate_melody(&tree), before);
    assert_eq!(tree.size(), 20);
    assert_well_formed(&tree);
}
