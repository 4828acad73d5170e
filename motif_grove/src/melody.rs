// Melody reader: flatten the tree into one note sequence.
//
// A preorder walk concatenates each node's motif: the root's notes first,
// then each child's subtree in child order. Reading never touches the tree,
// so the same tree always yields the same melody.

use crate::note::Note;
use crate::tree::MotifTree;

/// Concatenate every reachable motif in preorder.
pub fn generate_melody(tree: &MotifTree) -> Vec<Note> {
    tree.preorder()
        .into_iter()
        .filter_map(|id| tree.get(id))
        .flat_map(|node| node.motif().iter().copied())
        .collect()
}
