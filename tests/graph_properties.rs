use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

use assetflow::graph::DependencyGraph;
use proptest::prelude::*;

fn file(i: usize) -> PathBuf {
    PathBuf::from(format!("/styles/_f{i:02}.scss"))
}

fn graph_from(edges: &[(usize, usize)], nodes: usize) -> DependencyGraph {
    let mut g = DependencyGraph::new();
    for i in 0..nodes {
        g.add_file(file(i));
    }
    for &(importer, imported) in edges {
        g.add_import(file(importer), file(imported));
    }
    g
}

/// Everything that transitively imports `seed`, by breadth-first search.
fn reverse_reachable(edges: &[(usize, usize)], seed: usize) -> BTreeSet<PathBuf> {
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([seed]);
    let mut visited = BTreeSet::from([seed]);
    while let Some(current) = queue.pop_front() {
        for &(importer, imported) in edges {
            if imported == current && visited.insert(importer) {
                seen.insert(file(importer));
                queue.push_back(importer);
            }
        }
    }
    seen.remove(&file(seed));
    seen
}

fn edges_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|n| {
        let edge = (0..n, 0..n);
        (Just(n), prop::collection::vec(edge, 0..40))
    })
}

proptest! {
    #[test]
    fn impacted_set_is_exactly_the_transitive_importers(
        (n, edges) in edges_strategy(),
        seed_pick in any::<prop::sample::Index>(),
    ) {
        let seed = seed_pick.index(n);
        let graph = graph_from(&edges, n);
        let impacted = graph.impacted_by(&file(seed));

        let unique: BTreeSet<PathBuf> = impacted.iter().cloned().collect();
        prop_assert_eq!(unique.len(), impacted.len(), "duplicates in {:?}", impacted);
        prop_assert!(!unique.contains(&file(seed)));
        prop_assert_eq!(unique, reverse_reachable(&edges, seed));
    }

    #[test]
    fn traversal_is_deterministic_regardless_of_insertion_order(
        (n, edges) in edges_strategy(),
        seed_pick in any::<prop::sample::Index>(),
    ) {
        let seed = seed_pick.index(n);
        let forward = graph_from(&edges, n);
        let mut reversed_edges = edges.clone();
        reversed_edges.reverse();
        let backward = graph_from(&reversed_edges, n);

        prop_assert_eq!(
            forward.impacted_by(&file(seed)),
            backward.impacted_by(&file(seed))
        );
    }

    #[test]
    fn direct_importers_precede_their_own_importers_on_chains(len in 2usize..10) {
        // f(i+1) imports f(i): a straight chain up from f00.
        let edges: Vec<(usize, usize)> = (0..len - 1).map(|i| (i + 1, i)).collect();
        let graph = graph_from(&edges, len);
        let expected: Vec<PathBuf> = (1..len).map(file).collect();
        prop_assert_eq!(graph.impacted_by(&file(0)), expected);
    }
}
