// Arena-backed motif tree.
//
// Nodes live in a slot vector and refer to each other by `NodeId`: a parent
// is an `Option<NodeId>`, children are a `Vec<NodeId>`. Attaching, replacing
// and detaching only rewrite id lists, so there are no dangling references to
// chase, and ancestor walks for cycle checks stay O(depth).
//
// Ownership rules enforced here:
// - Exactly one root, and the root never has a parent.
// - A non-root reachable node appears in exactly one child list, and its
//   parent id names that list's owner.
// - A node is never attached under itself or under one of its descendants.
// - A node is attached only while detached; moving a subtree means detaching
//   it first, so nothing is ever owned twice.
// - `destroy_subtree` refuses nodes that are still attached.
//
// Freed slots go on a free list and are reused by later inserts, so ids stay
// small across long runs with heavy pruning.
//
// The pruning algorithm lives in `prune.rs`; selection and melody reading
// walk the tree through `preorder()`.

use crate::error::{TreeError, TreeResult};
use crate::node::MotifNode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to a node in a `MotifTree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A rooted tree of motif nodes.
///
/// `Clone` deep-copies every node: the copy shares no storage with the
/// original and keeps the same ids and fitness scores.
#[derive(Clone, Debug)]
pub struct MotifTree {
    slots: Vec<Option<MotifNode>>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl MotifTree {
    /// Create a tree whose root is `root`.
    pub fn new(root: MotifNode) -> Self {
        let mut tree = MotifTree {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            live: 0,
        };
        tree.root = tree.insert(root);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, attached or not.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Number of nodes reachable from the root.
    pub fn size(&self) -> usize {
        self.count_reachable(self.root)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&MotifNode> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Like `get`, but a missing node is an error.
    pub fn node(&self, id: NodeId) -> TreeResult<&MotifNode> {
        self.get(id).ok_or(TreeError::MissingNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut MotifNode> {
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(TreeError::MissingNode(id))
    }

    /// Overwrite a node's score.
    pub fn set_fitness(&mut self, id: NodeId, fitness: f64) -> TreeResult<()> {
        self.node_mut(id)?.set_fitness(fitness);
        Ok(())
    }

    /// Add a detached node to the arena and return its id.
    pub fn insert(&mut self, mut node: MotifNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot as usize] = Some(node);
            NodeId(slot)
        } else {
            self.slots.push(Some(node));
            NodeId((self.slots.len() - 1) as u32)
        }
    }

    // -----------------------------------------------------------------------
    // Structural edits
    // -----------------------------------------------------------------------

    /// Append `child` to `parent`'s children.
    ///
    /// Fails if either node is missing, if `child` is already one of
    /// `parent`'s children, if `child` is `parent` or one of its ancestors,
    /// or if `child` is still owned elsewhere.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        self.check_adoptable(parent, child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Swap `old_child` for `new_child` in place.
    ///
    /// Returns `Ok(false)` and changes nothing if `old_child` is not one of
    /// `parent`'s children. On success `old_child` is left detached.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> TreeResult<bool> {
        self.node(new_child)?;
        self.node(old_child)?;
        let Some(pos) = self.position_of(parent, old_child)? else {
            return Ok(false);
        };
        if new_child == old_child {
            return Ok(true);
        }
        self.check_adoptable(parent, new_child)?;

        self.node_mut(parent)?.children[pos] = new_child;
        self.node_mut(new_child)?.parent = Some(parent);
        self.node_mut(old_child)?.parent = None;
        Ok(true)
    }

    /// Remove `child` from `parent`'s children, leaving it detached.
    ///
    /// Returns `Ok(false)` if `child` was not one of them. The detached
    /// subtree stays in the arena; the caller re-attaches or destroys it.
    pub fn detach_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<bool> {
        self.node(child)?;
        let Some(pos) = self.position_of(parent, child)? else {
            return Ok(false);
        };
        self.node_mut(parent)?.children.remove(pos);
        self.node_mut(child)?.parent = None;
        Ok(true)
    }

    /// Cut `id` loose from its parent, if it has one.
    pub fn clear_parent(&mut self, id: NodeId) -> TreeResult<()> {
        if let Some(parent) = self.node(id)?.parent {
            self.detach_child(parent, id)?;
        }
        Ok(())
    }

    /// Make a detached node the root. The previous root must already have
    /// been attached elsewhere or destroyed by the caller.
    pub(crate) fn set_root(&mut self, id: NodeId) -> TreeResult<()> {
        let owner = self.node(id)?.parent;
        if owner.is_some() {
            return Err(TreeError::AlreadyAttached { child: id, owner });
        }
        self.root = id;
        Ok(())
    }

    /// Free a detached node and everything below it. Returns how many nodes
    /// were freed.
    pub fn destroy_subtree(&mut self, id: NodeId) -> TreeResult<usize> {
        if id == self.root || self.node(id)?.parent.is_some() {
            return Err(TreeError::StillAttached(id));
        }
        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.slots[next.index()].take() {
                stack.extend(node.children);
                self.free.push(next.0);
                self.live -= 1;
                freed += 1;
            }
        }
        Ok(freed)
    }

    fn position_of(&self, parent: NodeId, child: NodeId) -> TreeResult<Option<usize>> {
        Ok(self.node(parent)?.children.iter().position(|&c| c == child))
    }

    /// Shared precondition of attach and replace.
    fn check_adoptable(&self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if parent_node.children.contains(&child) {
            return Err(TreeError::DuplicateChild { parent, child });
        }
        if child == parent || self.is_descendant(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }
        if child_node.parent.is_some() || child == self.root {
            return Err(TreeError::AlreadyAttached {
                child,
                owner: child_node.parent,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Iterate over `id`'s proper ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).and_then(MotifNode::parent),
            steps: 0,
        }
    }

    /// Is `node` strictly below `ancestor`?
    pub fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Number of parent hops from `id` to the top of its tree.
    pub fn depth(&self, id: NodeId) -> TreeResult<usize> {
        self.node(id)?;
        Ok(self.ancestors(id).count())
    }

    /// Nodes in the subtree rooted at `id`, including `id`.
    pub fn count_nodes(&self, id: NodeId) -> TreeResult<usize> {
        self.node(id)?;
        Ok(self.count_reachable(id))
    }

    fn count_reachable(&self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut count = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.get(next) {
                count += 1;
                stack.extend_from_slice(&node.children);
            }
        }
        count
    }

    /// Every node reachable from the root: root first, then each child's
    /// subtree in child order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.live);
        let mut stack = vec![self.root];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.get(next) {
                order.push(next);
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }

    /// Check every structural invariant. Intended for tests and debugging;
    /// a correctly driven tree always passes.
    pub fn validate(&self) -> TreeResult<()> {
        let invariant = |msg: String| Err(TreeError::Invariant(msg));

        let root = self.node(self.root)?;
        if let Some(p) = root.parent {
            return invariant(format!("root {} has parent {p}", self.root));
        }

        let mut seen = vec![false; self.slots.len()];
        seen[self.root.index()] = true;
        let mut reached = 1;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                return invariant(format!("{id} is listed as a child but not live"));
            };
            for &child in &node.children {
                let Some(child_node) = self.get(child) else {
                    return invariant(format!("{id} lists missing child {child}"));
                };
                if child_node.parent != Some(id) {
                    return invariant(format!(
                        "{child} is a child of {id} but points at {:?}",
                        child_node.parent
                    ));
                }
                if std::mem::replace(&mut seen[child.index()], true) {
                    return invariant(format!("{child} is reachable twice"));
                }
                reached += 1;
                stack.push(child);
            }
        }

        if reached != self.live {
            return invariant(format!(
                "{} live nodes but only {reached} reachable from the root",
                self.live
            ));
        }
        Ok(())
    }
}

/// Iterator returned by `MotifTree::ancestors`.
///
/// Stops after as many steps as there are slots, so a corrupted parent chain
/// cannot loop forever.
pub struct Ancestors<'a> {
    tree: &'a MotifTree,
    next: Option<NodeId>,
    steps: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        if self.steps >= self.tree.slots.len() {
            return None;
        }
        self.steps += 1;
        self.next = self.tree.get(current).and_then(MotifNode::parent);
        Some(current)
    }
}
