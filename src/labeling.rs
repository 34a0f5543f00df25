//! Move-only label values and the per-name labeling collection.
//!
//! Labels are opaque values supporting only clone, equality, and transfer of
//! ownership -- the core never inspects a label's contents. `LabelValue` is
//! a move-only owning box, mirroring the original's raw-pointer label
//! ownership re-expressed without manual memory management.

use std::any::Any;
use std::collections::HashMap;

use indexmap::IndexMap;

use crate::id::{EdgeId, VertexId};

/// An opaque, cloneable label value. Implementors decide their own payload;
/// the core only ever clones, compares, or moves instances of this trait.
pub trait LabelValue: LabelValueClone + std::fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn eq_label(&self, other: &dyn LabelValue) -> bool;
}

/// Object-safe clone helper, following the standard `dyn`-clone pattern.
pub trait LabelValueClone {
    fn clone_box(&self) -> Box<dyn LabelValue>;
}

impl<T> LabelValueClone for T
where
    T: 'static + LabelValue + Clone,
{
    fn clone_box(&self) -> Box<dyn LabelValue> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn LabelValue> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl PartialEq for Box<dyn LabelValue> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_label(other.as_ref())
    }
}

/// A single label's storage: per-vertex and per-edge value dictionaries.
///
/// The mapping is a partial function -- at most one value per entity.
#[derive(Default)]
pub struct GraphLabeling {
    vertex_labels: HashMap<VertexId, Box<dyn LabelValue>>,
    edge_labels: HashMap<EdgeId, Box<dyn LabelValue>>,
}

impl GraphLabeling {
    pub fn new() -> Self {
        GraphLabeling::default()
    }

    pub fn vertex_value(&self, v: VertexId) -> Option<&dyn LabelValue> {
        self.vertex_labels.get(&v).map(|b| b.as_ref())
    }

    pub fn edge_value(&self, e: EdgeId) -> Option<&dyn LabelValue> {
        self.edge_labels.get(&e).map(|b| b.as_ref())
    }

    pub fn set_vertex(&mut self, v: VertexId, value: Box<dyn LabelValue>) {
        self.vertex_labels.insert(v, value);
    }

    pub fn set_edge(&mut self, e: EdgeId, value: Box<dyn LabelValue>) {
        self.edge_labels.insert(e, value);
    }

    pub fn remove_vertex(&mut self, v: VertexId) -> Option<Box<dyn LabelValue>> {
        self.vertex_labels.remove(&v)
    }

    pub fn remove_edge(&mut self, e: EdgeId) -> Option<Box<dyn LabelValue>> {
        self.edge_labels.remove(&e)
    }
}

/// Maps `label_name -> GraphLabeling`, with the bulk operations the tree
/// rewrite operations need: removing all labels for a vertex, and swapping
/// labels between two vertices across every registered name.
#[derive(Default)]
pub struct LabelingCollection {
    labelings: IndexMap<String, GraphLabeling>,
}

impl LabelingCollection {
    pub fn new() -> Self {
        LabelingCollection::default()
    }

    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labelings.keys().map(|s| s.as_str())
    }

    fn labeling_mut(&mut self, name: &str) -> &mut GraphLabeling {
        self.labelings
            .entry(name.to_string())
            .or_insert_with(GraphLabeling::new)
    }

    /// Takes ownership of `value`; replaces any prior value under `name` at `v`.
    pub fn set_vertex_label(&mut self, name: &str, v: VertexId, value: Box<dyn LabelValue>) {
        self.labeling_mut(name).set_vertex(v, value);
    }

    /// Takes ownership of `value`; replaces any prior value under `name` at `e`.
    pub fn set_edge_label(&mut self, name: &str, e: EdgeId, value: Box<dyn LabelValue>) {
        self.labeling_mut(name).set_edge(e, value);
    }

    pub fn vertex_label(&self, name: &str, v: VertexId) -> Option<&dyn LabelValue> {
        self.labelings.get(name)?.vertex_value(v)
    }

    pub fn edge_label(&self, name: &str, e: EdgeId) -> Option<&dyn LabelValue> {
        self.labelings.get(name)?.edge_value(e)
    }

    /// Removes and returns the label value under `name` at `v`, moving it
    /// out without cloning. Used to move labels from a node about to be
    /// deleted to its replacement.
    pub fn transfer_vertex_label(&mut self, name: &str, v: VertexId) -> Option<Box<dyn LabelValue>> {
        self.labelings.get_mut(name)?.remove_vertex(v)
    }

    pub fn transfer_edge_label(&mut self, name: &str, e: EdgeId) -> Option<Box<dyn LabelValue>> {
        self.labelings.get_mut(name)?.remove_edge(e)
    }

    /// Removes every label value attached to `v`, across all label names.
    pub fn remove_all_vertex_labels(&mut self, v: VertexId) {
        for labeling in self.labelings.values_mut() {
            labeling.remove_vertex(v);
        }
    }

    /// Swaps the two vertices' label values, across every registered name.
    pub fn swap_vertex_labels(&mut self, v1: VertexId, v2: VertexId) {
        for labeling in self.labelings.values_mut() {
            let a = labeling.remove_vertex(v1);
            let b = labeling.remove_vertex(v2);
            if let Some(value) = a {
                labeling.set_vertex(v2, value);
            }
            if let Some(value) = b {
                labeling.set_vertex(v1, value);
            }
        }
    }
}

/// The label map carried directly on a decomposition node (the `label_map`
/// field of the `(id, bag, induced_edges, label_map)` node tuple). Distinct
/// from [`LabelingCollection`], which labels the *input graph*'s vertices
/// and edges rather than decomposition nodes -- labeling functions read and
/// write this map for the node they were invoked on.
#[derive(Default)]
pub struct NodeLabelMap(IndexMap<String, Box<dyn LabelValue>>);

impl NodeLabelMap {
    pub fn new() -> Self {
        NodeLabelMap::default()
    }

    pub fn get(&self, name: &str) -> Option<&dyn LabelValue> {
        self.0.get(name).map(|b| b.as_ref())
    }

    pub fn set(&mut self, name: &str, value: Box<dyn LabelValue>) {
        self.0.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn LabelValue>> {
        self.0.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|s| s.as_str())
    }
}

impl Clone for NodeLabelMap {
    fn clone(&self) -> Self {
        NodeLabelMap(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.clone_box()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct IntLabel(i64);

    impl LabelValue for IntLabel {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn eq_label(&self, other: &dyn LabelValue) -> bool {
            other
                .as_any()
                .downcast_ref::<IntLabel>()
                .is_some_and(|o| o == self)
        }
    }

    #[test]
    fn set_and_get_vertex_label() {
        let mut labels = LabelingCollection::new();
        labels.set_vertex_label("width", VertexId(1), Box::new(IntLabel(5)));
        assert!(labels.vertex_label("width", VertexId(1)).is_some());
        assert!(labels.vertex_label("width", VertexId(2)).is_none());
        assert!(labels.vertex_label("depth", VertexId(1)).is_none());
    }

    #[test]
    fn transfer_moves_value_out() {
        let mut labels = LabelingCollection::new();
        labels.set_vertex_label("width", VertexId(1), Box::new(IntLabel(5)));
        let taken = labels.transfer_vertex_label("width", VertexId(1));
        assert!(taken.is_some());
        assert!(labels.vertex_label("width", VertexId(1)).is_none());
    }

    #[test]
    fn swap_vertex_labels_across_all_names() {
        let mut labels = LabelingCollection::new();
        labels.set_vertex_label("a", VertexId(1), Box::new(IntLabel(1)));
        labels.set_vertex_label("b", VertexId(2), Box::new(IntLabel(2)));

        labels.swap_vertex_labels(VertexId(1), VertexId(2));

        assert!(labels.vertex_label("a", VertexId(1)).is_none());
        assert!(labels.vertex_label("a", VertexId(2)).is_some());
        assert!(labels.vertex_label("b", VertexId(1)).is_some());
        assert!(labels.vertex_label("b", VertexId(2)).is_none());
    }

    #[test]
    fn remove_all_vertex_labels() {
        let mut labels = LabelingCollection::new();
        labels.set_vertex_label("a", VertexId(1), Box::new(IntLabel(1)));
        labels.set_vertex_label("b", VertexId(1), Box::new(IntLabel(2)));

        labels.remove_all_vertex_labels(VertexId(1));

        assert!(labels.vertex_label("a", VertexId(1)).is_none());
        assert!(labels.vertex_label("b", VertexId(1)).is_none());
    }

    #[test]
    fn label_names_lists_registered_names_in_insertion_order() {
        let mut labels = LabelingCollection::new();
        labels.set_vertex_label("z", VertexId(1), Box::new(IntLabel(1)));
        labels.set_vertex_label("a", VertexId(1), Box::new(IntLabel(2)));
        let names: Vec<&str> = labels.label_names().collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn boxed_label_value_eq_and_clone() {
        let a: Box<dyn LabelValue> = Box::new(IntLabel(3));
        let b: Box<dyn LabelValue> = Box::new(IntLabel(3));
        let c: Box<dyn LabelValue> = Box::new(IntLabel(4));
        assert_eq!(a, b);
        assert_ne!(a, c);
        let cloned = a.clone();
        assert_eq!(a, cloned);
    }

    #[test]
    fn node_label_map_set_get_remove() {
        let mut map = NodeLabelMap::new();
        map.set("width", Box::new(IntLabel(3)));
        assert!(map.get("width").is_some());
        assert!(map.get("depth").is_none());

        let removed = map.remove("width");
        assert!(removed.is_some());
        assert!(map.get("width").is_none());
    }

    #[test]
    fn node_label_map_clone_is_independent() {
        let mut map = NodeLabelMap::new();
        map.set("width", Box::new(IntLabel(3)));
        let mut cloned = map.clone();
        cloned.set("width", Box::new(IntLabel(9)));

        assert_eq!(map.get("width").unwrap().as_any().downcast_ref::<IntLabel>(), Some(&IntLabel(3)));
        assert_eq!(cloned.get("width").unwrap().as_any().downcast_ref::<IntLabel>(), Some(&IntLabel(9)));
    }
}
