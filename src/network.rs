//! Layer graph built from a [`Topology`] and the edge geometry derived from node positions.

use std::time::Duration;

use crate::topology::Topology;

/// Opacity applied to every connection once a run has started.
pub const EDGE_OPACITY: f64 = 0.3;

/// Delay between two consecutive connections fading in.
pub const EDGE_REVEAL_STEP: Duration = Duration::from_millis(20);

/// Layer-local node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub layer: usize,
    pub index: usize,
}

impl NodeId {
    pub fn new(layer: usize, index: usize) -> Self {
        Self { layer, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Input,
    Hidden,
    Output,
}

impl NodeRole {
    /// Short glyph drawn inside the node.
    pub fn label(self) -> &'static str {
        match self {
            NodeRole::Input => "I",
            NodeRole::Output => "O",
            NodeRole::Hidden => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub layer_name: &'static str,
    pub role: NodeRole,
}

/// A connection from a node in layer `i` to a node in layer `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Nodes and edges of a fully connected layer stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.role == role)
    }
}

/// Builds one node per unit and connects every pair of adjacent layers.
pub fn build_graph(topology: &Topology) -> Graph {
    let layers = topology.layers();
    let last = layers.len() - 1;

    let nodes = layers
        .iter()
        .enumerate()
        .flat_map(|(li, layer)| {
            let role = if li == 0 {
                NodeRole::Input
            } else if li == last {
                NodeRole::Output
            } else {
                NodeRole::Hidden
            };
            (0..layer.units).map(move |i| Node {
                id: NodeId::new(li, i),
                layer_name: layer.name,
                role,
            })
        })
        .collect();

    let mut edges = Vec::with_capacity(topology.edge_count());
    for (li, pair) in layers.windows(2).enumerate() {
        for to in 0..pair[1].units {
            for from in 0..pair[0].units {
                edges.push(Edge {
                    from: NodeId::new(li, from),
                    to: NodeId::new(li + 1, to),
                });
            }
        }
    }

    Graph { nodes, edges }
}

/// Center of a node on the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Placement of a single connection: anchored at `origin`, rotated by `angle` radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub edge: Edge,
    pub origin: Point,
    pub length: f64,
    pub angle: f64,
}

impl EdgeGeometry {
    /// The far end of the connection.
    pub fn end(&self) -> Point {
        Point::new(
            self.origin.x + self.length * self.angle.cos(),
            self.origin.y + self.length * self.angle.sin(),
        )
    }
}

/// Computes length and angle for every edge whose endpoints both have a position.
///
/// Edges touching a node that `position` cannot resolve are skipped.
pub fn layout_edges<F>(graph: &Graph, position: F) -> Vec<EdgeGeometry>
where
    F: Fn(NodeId) -> Option<Point>,
{
    graph
        .edges
        .iter()
        .filter_map(|edge| {
            let from = position(edge.from)?;
            let to = position(edge.to)?;
            let (dx, dy) = (to.x - from.x, to.y - from.y);
            Some(EdgeGeometry {
                edge: *edge,
                origin: from,
                length: dx.hypot(dy),
                angle: dy.atan2(dx),
            })
        })
        .collect()
}

/// Fade-in delay of the connection at `edge_index` when a run starts.
pub fn reveal_delay(edge_index: usize) -> Duration {
    EDGE_REVEAL_STEP * edge_index as u32
}

/// Owns the graph of the currently selected topology.
#[derive(Debug, Clone)]
pub struct NetworkRenderer {
    topology: Topology,
    graph: Graph,
}

impl NetworkRenderer {
    pub fn new(topology: Topology) -> Self {
        Self {
            graph: build_graph(&topology),
            topology,
        }
    }

    /// Replaces the graph; nothing from the previous topology survives.
    pub fn rebuild(&mut self, topology: Topology) {
        log::debug!(
            variant = topology.variant().label(),
            nodes = topology.unit_count(),
            edges = topology.edge_count();
            "rebuilding network graph"
        );
        self.graph = build_graph(&topology);
        self.topology = topology;
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn layout<F>(&self, position: F) -> Vec<EdgeGeometry>
    where
        F: Fn(NodeId) -> Option<Point>,
    {
        layout_edges(&self.graph, position)
    }
}
