//! Shortest element path across the mesh.

use log::debug;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::error::{FieldError, Result};
use crate::mesh::MeshIndex;

/// Ordered elements of a path plus the cumulative distance at each one.
#[derive(Clone, Debug, PartialEq)]
pub struct Transect {
    pub elements: Vec<usize>,
    /// Running sum of centroid-to-centroid distances; starts at 0.
    pub distance: Vec<f64>,
}

impl Transect {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Distance from the first to the last element along the path.
    pub fn total_length(&self) -> f64 {
        self.distance.last().copied().unwrap_or(0.0)
    }
}

/// Element adjacency graph: graph node `i` is element `i`, edges join
/// elements sharing a side and weigh the planar centroid distance.
#[derive(Clone, Debug)]
pub struct ElementGraph {
    graph: UnGraph<(), f64>,
}

impl ElementGraph {
    pub fn from_mesh(mesh: &MeshIndex) -> Self {
        let n = mesh.n_elements();
        let mut graph = UnGraph::with_capacity(n, n * 3 / 2);
        for _ in 0..n {
            graph.add_node(());
        }
        for e in 0..n {
            for nb in mesh.real_neighbors(e) {
                // Each side is listed by both elements; update_edge keeps one edge.
                graph.update_edge(
                    NodeIndex::new(e),
                    NodeIndex::new(nb),
                    mesh.centroid_distance(e, nb),
                );
            }
        }
        debug!(
            "Element graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Self { graph }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Shortest path from `from` to `to` (Dijkstra: A* with a zero heuristic).
    pub fn shortest_path(&self, mesh: &MeshIndex, from: usize, to: usize) -> Result<Transect> {
        let n = self.graph.node_count();
        if from >= n || to >= n {
            return Err(FieldError::NoPath { from, to });
        }
        let (_, nodes) = astar(
            &self.graph,
            NodeIndex::new(from),
            |node| node == NodeIndex::new(to),
            |edge| *edge.weight(),
            |_| 0.0,
        )
        .ok_or(FieldError::NoPath { from, to })?;

        let elements: Vec<usize> = nodes.into_iter().map(NodeIndex::index).collect();
        let mut distance = Vec::with_capacity(elements.len());
        let mut total = 0.0;
        distance.push(total);
        for pair in elements.windows(2) {
            total += mesh.centroid_distance(pair[0], pair[1]);
            distance.push(total);
        }
        Ok(Transect { elements, distance })
    }
}
