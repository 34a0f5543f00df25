//! The mutable tree decomposition: a rooted tree whose nodes carry bags and
//! induced hyperedges, with the structural edits and derived queries that
//! manipulation operations are built from.
//!
//! Modeled directly on the parent/children `HashMap` bookkeeping of
//! `ModuleTree` (see `module.rs` in the teacher crate) -- a rooted tree with
//! a distinguished root id, a children map, and a counter for fresh ids.
//! Unlike `ModuleTree`, nodes here can be reparented, removed with their
//! children re-homed, and have whole subtrees swapped, so the tree exposes
//! a richer structural-edit surface.

use std::collections::HashMap;

use crate::bag::{Bag, InducedEdges};
use crate::error::DecompError;
use crate::hypergraph::Hypergraph;
use crate::id::{NodeId, VertexId};
use crate::labeling::{LabelValue, NodeLabelMap};

#[derive(Clone)]
struct NodeRecord {
    bag: Bag,
    induced: InducedEdges,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    labels: NodeLabelMap,
}

/// A rooted, mutable tree decomposition of a hypergraph.
#[derive(Clone)]
pub struct MutableTreeDecomposition {
    nodes: HashMap<NodeId, NodeRecord>,
    root: NodeId,
    next_id: u32,
}

impl MutableTreeDecomposition {
    /// Creates a decomposition with a single root node carrying `root_bag`.
    ///
    /// Returns [`DecompError::VertexNotInGraph`] if `root_bag` contains a
    /// vertex absent from `graph`.
    pub fn new(graph: &dyn Hypergraph, root_bag: Bag) -> Result<Self, DecompError> {
        check_bag_in_graph(graph, NodeId(0), &root_bag)?;
        let induced = InducedEdges::compute(&root_bag, graph.edges());
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            NodeRecord {
                bag: root_bag,
                induced,
                parent: None,
                children: Vec::new(),
                labels: NodeLabelMap::new(),
            },
        );
        Ok(MutableTreeDecomposition {
            nodes,
            root,
            next_id: 1,
        })
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn record(&self, v: NodeId) -> Result<&NodeRecord, DecompError> {
        self.nodes.get(&v).ok_or(DecompError::NodeNotFound { id: v })
    }

    fn record_mut(&mut self, v: NodeId) -> Result<&mut NodeRecord, DecompError> {
        self.nodes
            .get_mut(&v)
            .ok_or(DecompError::NodeNotFound { id: v })
    }

    // -- accessors ----------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn bag(&self, v: NodeId) -> Result<&Bag, DecompError> {
        Ok(&self.record(v)?.bag)
    }

    pub fn induced(&self, v: NodeId) -> Result<&InducedEdges, DecompError> {
        Ok(&self.record(v)?.induced)
    }

    pub fn parent(&self, v: NodeId) -> Result<Option<NodeId>, DecompError> {
        Ok(self.record(v)?.parent)
    }

    pub fn children(&self, v: NodeId) -> Result<&[NodeId], DecompError> {
        Ok(&self.record(v)?.children)
    }

    /// Reads a label previously stored under `name` in `v`'s own label map
    /// (the `label_map` field of the node tuple, distinct from the
    /// graph-level `LabelingCollection`).
    pub fn node_label(&self, v: NodeId, name: &str) -> Result<Option<&dyn LabelValue>, DecompError> {
        Ok(self.record(v)?.labels.get(name))
    }

    /// Stores `value` under `name` in `v`'s own label map, as written by
    /// labeling functions invoked on newly created nodes.
    pub fn set_node_label(
        &mut self,
        v: NodeId,
        name: &str,
        value: Box<dyn LabelValue>,
    ) -> Result<(), DecompError> {
        self.record_mut(v)?.labels.set(name, value);
        Ok(())
    }

    /// Clones `v`'s full label map, for passing to a labeling function
    /// alongside the bag without holding a borrow of the decomposition.
    pub fn node_label_map_snapshot(&self, v: NodeId) -> Result<NodeLabelMap, DecompError> {
        Ok(self.record(v)?.labels.clone())
    }

    pub fn contains_node(&self, v: NodeId) -> bool {
        self.nodes.contains_key(&v)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node ids, in unspecified order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn is_leaf(&self, v: NodeId) -> Result<bool, DecompError> {
        Ok(self.children(v)?.is_empty())
    }

    pub fn is_join(&self, v: NodeId) -> Result<bool, DecompError> {
        Ok(self.children(v)?.len() >= 2)
    }

    /// True if `v` is strictly above `w` in the tree (or equal to it).
    pub fn is_ancestor(&self, v: NodeId, w: NodeId) -> bool {
        let mut cur = Some(w);
        while let Some(n) = cur {
            if n == v {
                return true;
            }
            cur = self.nodes.get(&n).and_then(|r| r.parent);
        }
        false
    }

    // -- node classification -------------------------------------------------

    /// `v` introduces relative to `c`: `bag(v) ⊋ bag(c)`.
    pub fn is_introduce_relative_to(&self, v: NodeId, c: NodeId) -> Result<bool, DecompError> {
        Ok(self.bag(v)?.strictly_contains(self.bag(c)?))
    }

    /// `v` forgets relative to `c`: `bag(v) ⊊ bag(c)`.
    pub fn is_forget_relative_to(&self, v: NodeId, c: NodeId) -> Result<bool, DecompError> {
        Ok(self.bag(c)?.strictly_contains(self.bag(v)?))
    }

    /// `v` is an exchange node: it has exactly one child and is neither an
    /// introduce nor a forget node relative to it.
    pub fn is_exchange_node(&self, v: NodeId) -> Result<bool, DecompError> {
        let children = self.children(v)?;
        if children.len() != 1 {
            return Ok(false);
        }
        let c = children[0];
        Ok(!self.is_introduce_relative_to(v, c)? && !self.is_forget_relative_to(v, c)?)
    }

    /// Vertices in `bag(v)` that no child's bag contains.
    pub fn introduced_vertices(&self, v: NodeId) -> Result<Vec<VertexId>, DecompError> {
        let children_union = self.children_bag_union(v)?;
        Ok(self.bag(v)?.difference(&children_union))
    }

    /// Vertices in `bag(v)` not present in `bag(c)`.
    pub fn introduced_vertices_relative_to(
        &self,
        v: NodeId,
        c: NodeId,
    ) -> Result<Vec<VertexId>, DecompError> {
        Ok(self.bag(v)?.difference(self.bag(c)?))
    }

    /// Vertices present in some child's bag but absent from `bag(v)`.
    pub fn forgotten_vertices(&self, v: NodeId) -> Result<Vec<VertexId>, DecompError> {
        let children_union = self.children_bag_union(v)?;
        Ok(children_union.difference(self.bag(v)?))
    }

    /// Vertices in `bag(c)` not present in `bag(v)`.
    pub fn forgotten_vertices_relative_to(
        &self,
        v: NodeId,
        c: NodeId,
    ) -> Result<Vec<VertexId>, DecompError> {
        Ok(self.bag(c)?.difference(self.bag(v)?))
    }

    /// Vertices carried over from below: `bag(v) ∩ (union of children bags)`.
    pub fn remembered_vertices(&self, v: NodeId) -> Result<Vec<VertexId>, DecompError> {
        let children_union = self.children_bag_union(v)?;
        Ok(self.bag(v)?.intersection(&children_union))
    }

    /// Vertices in `bag(v) ∩ bag(c)`.
    pub fn remembered_vertices_relative_to(
        &self,
        v: NodeId,
        c: NodeId,
    ) -> Result<Vec<VertexId>, DecompError> {
        Ok(self.bag(v)?.intersection(self.bag(c)?))
    }

    fn children_bag_union(&self, v: NodeId) -> Result<Bag, DecompError> {
        let mut union = Bag::empty();
        for c in self.children(v)? {
            union = union.union(self.bag(*c)?);
        }
        Ok(union)
    }

    // -- structural edits -----------------------------------------------------

    /// Creates a fresh child of `p` with an empty bag. Fails if `p` is unknown.
    pub fn add_child(&mut self, p: NodeId) -> Result<NodeId, DecompError> {
        if !self.contains_node(p) {
            return Err(DecompError::NodeNotFound { id: p });
        }
        let id = self.fresh_id();
        self.nodes.insert(
            id,
            NodeRecord {
                bag: Bag::empty(),
                induced: InducedEdges::empty(),
                parent: Some(p),
                children: Vec::new(),
                labels: NodeLabelMap::new(),
            },
        );
        self.record_mut(p)?.children.push(id);
        Ok(id)
    }

    /// Inserts a fresh node between `v` and its old parent, inheriting `v`'s
    /// bag. If `v` is the root, the fresh node becomes the new root.
    pub fn add_parent(&mut self, v: NodeId) -> Result<NodeId, DecompError> {
        let old_parent = self.record(v)?.parent;
        let bag = self.record(v)?.bag.clone();
        let induced = self.record(v)?.induced.clone();

        let id = self.fresh_id();
        self.nodes.insert(
            id,
            NodeRecord {
                bag,
                induced,
                parent: old_parent,
                children: vec![v],
                labels: NodeLabelMap::new(),
            },
        );

        match old_parent {
            Some(op) => self.replace_child(op, v, id)?,
            None => self.root = id,
        }
        self.record_mut(v)?.parent = Some(id);
        Ok(id)
    }

    /// Removes `v`, re-parenting its children to `v`'s parent in their
    /// current order. Removing the root requires it to have exactly one
    /// child, which becomes the new root.
    pub fn remove_node(&mut self, v: NodeId) -> Result<(), DecompError> {
        let record = self.nodes.remove(&v).ok_or(DecompError::NodeNotFound { id: v })?;

        match record.parent {
            None => {
                if record.children.len() != 1 {
                    // Put the node back -- this operation does not partially mutate.
                    self.nodes.insert(v, record);
                    return Err(DecompError::InvalidRootRemoval {
                        child_count: self
                            .nodes
                            .get(&v)
                            .map(|r| r.children.len())
                            .unwrap_or_default(),
                    });
                }
                let new_root = record.children[0];
                self.record_mut(new_root)?.parent = None;
                self.root = new_root;
            }
            Some(p) => {
                let idx = self
                    .record(p)?
                    .children
                    .iter()
                    .position(|&c| c == v)
                    .expect("parent's children list must contain v");
                for &c in &record.children {
                    self.record_mut(c)?.parent = Some(p);
                }
                let parent_children = &mut self.record_mut(p)?.children;
                parent_children.splice(idx..idx + 1, record.children.iter().copied());
            }
        }
        Ok(())
    }

    /// Moves `c` (and its subtree) to become a child of `p`. Fails if `p` is
    /// `c` or lies within `c`'s subtree, which would create a cycle.
    pub fn set_parent(&mut self, c: NodeId, p: NodeId) -> Result<(), DecompError> {
        if !self.contains_node(p) {
            return Err(DecompError::NodeNotFound { id: p });
        }
        if !self.contains_node(c) {
            return Err(DecompError::NodeNotFound { id: c });
        }
        if self.is_ancestor(c, p) {
            return Err(DecompError::WouldCreateCycle {
                reason: format!("NodeId({}) lies within NodeId({})'s subtree", p.0, c.0),
            });
        }

        let old_parent = self.record(c)?.parent;
        if old_parent == Some(p) {
            return Ok(());
        }
        if let Some(op) = old_parent {
            self.remove_from_children(op, c)?;
        }
        self.record_mut(p)?.children.push(c);
        self.record_mut(c)?.parent = Some(p);
        Ok(())
    }

    /// Swaps the subtrees rooted at `a` and `b`. Fails if either is an
    /// ancestor of (or equal to) the other.
    pub fn swap_subtrees(&mut self, a: NodeId, b: NodeId) -> Result<(), DecompError> {
        if !self.contains_node(a) {
            return Err(DecompError::NodeNotFound { id: a });
        }
        if !self.contains_node(b) {
            return Err(DecompError::NodeNotFound { id: b });
        }
        if self.is_ancestor(a, b) || self.is_ancestor(b, a) {
            return Err(DecompError::WouldCreateCycle {
                reason: format!(
                    "NodeId({}) and NodeId({}) are in an ancestor relationship",
                    a.0, b.0
                ),
            });
        }

        let pa = self.record(a)?.parent;
        let pb = self.record(b)?.parent;

        if let Some(p) = pa {
            self.replace_child(p, a, b)?;
        }
        if let Some(p) = pb {
            self.replace_child(p, b, a)?;
        }
        self.record_mut(a)?.parent = pb;
        self.record_mut(b)?.parent = pa;
        if pa.is_none() {
            self.root = b;
        }
        if pb.is_none() {
            self.root = a;
        }
        Ok(())
    }

    /// Replaces `v`'s bag and recomputes its induced hyperedges against
    /// `graph`. Does not itself re-establish I5/I6 across the whole tree --
    /// callers (manipulation operations) are responsible for that.
    pub fn set_bag(&mut self, graph: &dyn Hypergraph, v: NodeId, bag: Bag) -> Result<(), DecompError> {
        if !self.contains_node(v) {
            return Err(DecompError::NodeNotFound { id: v });
        }
        check_bag_in_graph(graph, v, &bag)?;
        let induced = InducedEdges::compute(&bag, graph.edges());
        let record = self.record_mut(v)?;
        record.bag = bag;
        record.induced = induced;
        Ok(())
    }

    /// Makes `new_root` the root, reversing parent/child direction along the
    /// path from the old root down to it. Bags and induced edges are
    /// untouched, so I4/I7 continue to hold without recomputation. Returns
    /// the path (old root to new root order reversed: `new_root` first),
    /// the set of nodes whose local neighborhood changed -- used by the
    /// optimizer as `relevant_vertices` for a local pipeline re-application.
    pub fn reroot(&mut self, new_root: NodeId) -> Result<Vec<NodeId>, DecompError> {
        if !self.contains_node(new_root) {
            return Err(DecompError::NodeNotFound { id: new_root });
        }
        if new_root == self.root {
            return Ok(Vec::new());
        }

        let mut path = vec![new_root];
        let mut cur = new_root;
        while let Some(p) = self.record(cur)?.parent {
            path.push(p);
            cur = p;
        }

        for w in path.windows(2) {
            let (child, parent) = (w[0], w[1]);
            self.remove_from_children(parent, child)?;
            self.record_mut(parent)?.parent = Some(child);
            self.record_mut(child)?.children.push(parent);
        }
        self.record_mut(new_root)?.parent = None;
        self.root = new_root;
        Ok(path)
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<(), DecompError> {
        let children = &mut self.record_mut(parent)?.children;
        let idx = children
            .iter()
            .position(|&c| c == old)
            .expect("parent's children list must contain old");
        children[idx] = new;
        Ok(())
    }

    fn remove_from_children(&mut self, parent: NodeId, child: NodeId) -> Result<(), DecompError> {
        let children = &mut self.record_mut(parent)?.children;
        let idx = children
            .iter()
            .position(|&c| c == child)
            .expect("parent's children list must contain child");
        children.remove(idx);
        Ok(())
    }

    /// Checks invariants I1-I4 and I7 that can be verified from the tree
    /// alone (I5/I6 additionally need the full vertex/edge set and are
    /// checked by the property tests in `tests/`).
    pub fn check_local_invariants(&self, graph: &dyn Hypergraph) -> Result<(), DecompError> {
        // I1: exactly one root -- enforced structurally (single `root` field,
        // parent chains never form a second root without going through
        // `add_parent`/`remove_node`, both of which maintain `self.root`).
        if !self.nodes.contains_key(&self.root) || self.record(self.root)?.parent.is_some() {
            return Err(DecompError::WouldCreateCycle {
                reason: "root invariant violated".to_string(),
            });
        }

        for (&id, record) in &self.nodes {
            // I2: child lists are distinct and back-pointers agree.
            let mut seen = std::collections::HashSet::new();
            for &c in &record.children {
                if !seen.insert(c) {
                    return Err(DecompError::WouldCreateCycle {
                        reason: format!("duplicate child id under NodeId({})", id.0),
                    });
                }
                if self.record(c)?.parent != Some(id) {
                    return Err(DecompError::WouldCreateCycle {
                        reason: format!("back-pointer mismatch for NodeId({})", c.0),
                    });
                }
            }

            // I4: bag is a subset of the input graph's vertex set.
            check_bag_in_graph(graph, id, &record.bag)?;

            // I7: induced edges equal exactly the edges whose endpoints lie in the bag.
            let expected = InducedEdges::compute(&record.bag, graph.edges());
            if expected != record.induced {
                return Err(DecompError::WouldCreateCycle {
                    reason: format!("stale induced edges at NodeId({})", id.0),
                });
            }
        }

        // I3: no cycles -- walk from every node to the root and ensure termination.
        for &id in self.nodes.keys() {
            let mut cur = id;
            let mut steps = 0usize;
            loop {
                match self.record(cur)?.parent {
                    None => break,
                    Some(p) => {
                        cur = p;
                        steps += 1;
                        if steps > self.nodes.len() {
                            return Err(DecompError::WouldCreateCycle {
                                reason: "cycle detected while walking to root".to_string(),
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn check_bag_in_graph(graph: &dyn Hypergraph, node: NodeId, bag: &Bag) -> Result<(), DecompError> {
    for v in bag.as_slice() {
        if !graph.contains_vertex(*v) {
            return Err(DecompError::VertexNotInGraph { node, vertex: *v });
        }
    }
    Ok(())
}
