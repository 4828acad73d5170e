// Pruning: removing weak nodes without losing their descendants.
//
// `MotifTree::prune` walks a subtree in postorder. Children are pruned first,
// then the node itself is judged against the threshold. A doomed node with
// children hands them to its *last* child (the survivor): the survivor is
// detached, the other children are moved under it in their existing order,
// and the survivor takes the doomed node's place under its parent (appended
// to the parent's child list). If the doomed node was the root, the survivor
// becomes the new root. A doomed leaf is simply detached and freed.
//
// The one exception is a childless root, which is never removed, so the tree
// can shrink to one node but never to zero.
//
// Every call leaves the tree connected and acyclic and removes exactly the
// doomed nodes, one at a time; no subtree is ever dropped along with its
// parent.

use crate::error::TreeResult;
use crate::tree::{MotifTree, NodeId};

impl MotifTree {
    /// Prune the subtree at `id` with `threshold`, returning how many nodes
    /// were removed. The root may change; re-read `root()` afterwards.
    pub fn prune(&mut self, id: NodeId, threshold: f64) -> TreeResult<usize> {
        let node = self.node(id)?;
        if id == self.root() && node.is_leaf() {
            return Ok(0);
        }

        let mut removed = 0;
        for child in node.children().to_vec() {
            removed += self.prune(child, threshold)?;
        }

        let node = self.node(id)?;
        let doomed = node.fitness() < threshold;
        if !doomed {
            return Ok(removed);
        }
        let parent = node.parent();
        let children = node.children().to_vec();

        match children.split_last() {
            Some((&survivor, siblings)) => {
                self.detach_child(id, survivor)?;
                for &sibling in siblings {
                    self.detach_child(id, sibling)?;
                    self.attach_child(survivor, sibling)?;
                }
                match parent {
                    Some(parent) => {
                        self.attach_child(parent, survivor)?;
                        self.detach_child(parent, id)?;
                    }
                    None => self.set_root(survivor)?,
                }
            }
            None => match parent {
                Some(parent) => {
                    self.detach_child(parent, id)?;
                }
                // Lone root.
                None => return Ok(removed),
            },
        }

        self.destroy_subtree(id)?;
        Ok(removed + 1)
    }

    /// Prune the whole tree once.
    pub fn prune_all(&mut self, threshold: f64) -> TreeResult<usize> {
        self.prune(self.root(), threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MotifNode;
    use crate::note::Note;

    fn scored(fitness: f64) -> MotifNode {
        MotifNode::with_fitness(vec![Note::new(60, 0.2)], fitness)
    }

    fn add(tree: &mut MotifTree, parent: NodeId, fitness: f64) -> NodeId {
        let id = tree.insert(scored(fitness));
        tree.attach_child(parent, id).unwrap();
        id
    }

    #[test]
    fn weak_leaf_is_removed() {
        let mut tree = MotifTree::new(scored(90.0));
        let root = tree.root();
        let weak = add(&mut tree, root, 5.0);
        let strong = add(&mut tree, root, 50.0);

        assert_eq!(tree.prune_all(10.0), Ok(1));
        assert!(!tree.contains(weak));
        assert_eq!(tree.node(root).unwrap().children(), &[strong]);
        tree.validate().unwrap();
    }

    #[test]
    fn lone_root_survives_any_threshold() {
        let mut tree = MotifTree::new(scored(0.0));
        assert_eq!(tree.prune_all(1_000.0), Ok(0));
        assert_eq!(tree.size(), 1);
        tree.validate().unwrap();
    }

    #[test]
    fn survivor_adopts_siblings_and_takes_parents_slot() {
        // root -> [x, p -> [c1, c2, c3 -> [g]], y], only p is weak.
        let mut tree = MotifTree::new(scored(90.0));
        let root = tree.root();
        let x = add(&mut tree, root, 80.0);
        let p = add(&mut tree, root, 5.0);
        let y = add(&mut tree, root, 80.0);
        let c1 = add(&mut tree, p, 50.0);
        let c2 = add(&mut tree, p, 50.0);
        let c3 = add(&mut tree, p, 50.0);
        let g = add(&mut tree, c3, 50.0);
        assert_eq!(tree.size(), 8);

        assert_eq!(tree.prune_all(10.0), Ok(1));

        assert_eq!(tree.size(), 7);
        assert!(!tree.contains(p));
        assert_eq!(tree.node(root).unwrap().children(), &[x, y, c3]);
        assert_eq!(tree.node(c3).unwrap().children(), &[g, c1, c2]);
        assert_eq!(tree.node(c1).unwrap().parent(), Some(c3));
        assert_eq!(tree.node(c3).unwrap().parent(), Some(root));
        tree.validate().unwrap();
    }

    #[test]
    fn weak_root_is_replaced_by_its_last_child() {
        let mut tree = MotifTree::new(scored(1.0));
        let old_root = tree.root();
        let a = add(&mut tree, old_root, 50.0);
        let b = add(&mut tree, old_root, 60.0);

        assert_eq!(tree.prune_all(10.0), Ok(1));

        assert_eq!(tree.root(), b);
        assert_eq!(tree.node(b).unwrap().parent(), None);
        assert_eq!(tree.node(b).unwrap().children(), &[a]);
        assert!(!tree.contains(old_root));
        tree.validate().unwrap();
    }

    #[test]
    fn children_are_judged_before_parents() {
        // A weak chain under a strong root collapses leaf-first.
        let mut tree = MotifTree::new(scored(90.0));
        let root = tree.root();
        let a = add(&mut tree, root, 5.0);
        let b = add(&mut tree, a, 5.0);
        add(&mut tree, b, 5.0);

        assert_eq!(tree.prune_all(10.0), Ok(3));
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.root(), root);
        tree.validate().unwrap();
    }

    #[test]
    fn everything_weak_leaves_only_the_root() {
        let mut tree = MotifTree::new(scored(1.0));
        let root = tree.root();
        for _ in 0..3 {
            let mid = add(&mut tree, root, 2.0);
            add(&mut tree, mid, 3.0);
            add(&mut tree, mid, 4.0);
        }
        assert_eq!(tree.size(), 10);

        assert_eq!(tree.prune_all(50.0), Ok(9));
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.root(), root);
        tree.validate().unwrap();
    }

    #[test]
    fn nodes_at_threshold_are_kept() {
        let mut tree = MotifTree::new(scored(90.0));
        let root = tree.root();
        add(&mut tree, root, 10.0);
        assert_eq!(tree.prune_all(10.0), Ok(0));
        assert_eq!(tree.size(), 2);
    }

    #[test]
    fn pruning_a_subtree_leaves_the_rest_alone() {
        let mut tree = MotifTree::new(scored(90.0));
        let root = tree.root();
        let left = add(&mut tree, root, 50.0);
        let right = add(&mut tree, root, 50.0);
        add(&mut tree, left, 1.0);
        let kept = add(&mut tree, right, 1.0);

        assert_eq!(tree.prune(left, 10.0), Ok(1));
        assert!(tree.contains(kept));
        assert_eq!(tree.size(), 4);
        tree.validate().unwrap();
    }
}
