//! The fitness-function contract consumed by the optimization operation.

use crate::decomposition::MutableTreeDecomposition;
use crate::hypergraph::Hypergraph;

/// A scalar fitness value with a total order -- bigger is better. Lexicographic
/// tuples (e.g. `(width, node_count)`) satisfy this via their derived `Ord`.
pub trait FitnessFunction {
    type Value: Ord + Clone;

    /// Evaluates the fitness of `decomposition` over `graph`. Bigger is better.
    fn evaluate(&self, graph: &dyn Hypergraph, decomposition: &MutableTreeDecomposition) -> Self::Value;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::Bag;
    use crate::hypergraph::SimpleHypergraph;
    use crate::id::VertexId;

    struct NegatedWidth;

    impl FitnessFunction for NegatedWidth {
        type Value = i64;

        fn evaluate(&self, _graph: &dyn Hypergraph, decomposition: &MutableTreeDecomposition) -> i64 {
            let max_bag = decomposition
                .node_ids()
                .map(|n| decomposition.bag(n).unwrap().len())
                .max()
                .unwrap_or(0);
            -(max_bag as i64)
        }
    }

    #[test]
    fn larger_fitness_value_means_smaller_width() {
        let mut g = SimpleHypergraph::new();
        g.add_vertex(VertexId(1));
        g.add_vertex(VertexId(2));
        let d = MutableTreeDecomposition::new(&g, Bag::new([VertexId(1)])).unwrap();

        let f = NegatedWidth;
        let score = f.evaluate(&g, &d);
        assert_eq!(score, -1);
    }
}
