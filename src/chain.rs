//! Chain: structural layer keeping a group's sibling nodes in a doubly
//! linked list over a slotmap arena.
//!
//! Links are stable generational keys rather than addresses, so nodes may
//! be relocated by the arena without invalidating any link. This layer
//! knows nothing about the resource or about ownership; it only maintains
//! the prev/next structure.

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable, generational identifier of one handle's node in its chain.
    pub(crate) struct NodeKey;
}

#[derive(Debug, Default)]
struct Node {
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

#[derive(Debug)]
pub(crate) struct Chain {
    nodes: SlotMap<NodeKey, Node>,
}

/// Link neighborhood of a node that was just removed from its chain.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Removed {
    pub(crate) prev: Option<NodeKey>,
    pub(crate) next: Option<NodeKey>,
}

impl Chain {
    /// One-node chain for a fresh acquisition.
    pub(crate) fn singleton() -> (Self, NodeKey) {
        let mut nodes = SlotMap::with_key();
        let key = nodes.insert(Node::default());
        (Self { nodes }, key)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a new node immediately before `at` and return its key.
    pub(crate) fn insert_before(&mut self, at: NodeKey) -> NodeKey {
        debug_assert!(self.nodes.contains_key(at));
        let prev = self.nodes[at].prev;
        let key = self.nodes.insert(Node {
            prev,
            next: Some(at),
        });
        if let Some(p) = prev {
            self.nodes[p].next = Some(key);
        }
        self.nodes[at].prev = Some(key);
        key
    }

    /// Unlink and discard `key`, stitching its neighbors together.
    pub(crate) fn remove(&mut self, key: NodeKey) -> Removed {
        let node = self
            .nodes
            .remove(key)
            .expect("a handle's node is always linked in its own chain");
        if let Some(p) = node.prev {
            self.nodes[p].next = node.next;
        }
        if let Some(n) = node.next {
            self.nodes[n].prev = node.prev;
        }
        Removed {
            prev: node.prev,
            next: node.next,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub(crate) fn prev_of(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes[key].prev
    }

    #[cfg(test)]
    pub(crate) fn next_of(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes[key].next
    }
}
