//! Particles travelling from input to output neurons on each epoch.

use std::time::Duration;

use rand::Rng;

use super::epoch_rng;
use crate::network::{Graph, NodeId, NodeRole, Point};

/// Chance that an input node emits a particle on an epoch update.
pub const SPAWN_PROBABILITY: f64 = 0.3;
pub const PARTICLE_LIFETIME: Duration = Duration::from_millis(1000);

const SALT: u64 = 0xF10E;

/// A particle's path from an input node to an output node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub from: NodeId,
    pub to: NodeId,
}

/// A route placed on the host surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub route: Route,
    pub start: Point,
    pub dx: f64,
    pub dy: f64,
}

impl Particle {
    /// Position after `elapsed`, linearly interpolated over the particle lifetime.
    pub fn position_at(&self, elapsed: Duration) -> Point {
        let t = (elapsed.as_secs_f64() / PARTICLE_LIFETIME.as_secs_f64()).clamp(0.0, 1.0);
        Point::new(self.start.x + self.dx * t, self.start.y + self.dy * t)
    }

    pub fn is_expired(&self, elapsed: Duration) -> bool {
        elapsed >= PARTICLE_LIFETIME
    }
}

/// Picks which input nodes fire toward which output nodes on a given epoch.
#[derive(Debug, Clone, Copy)]
pub struct DataFlow {
    seed: u64,
}

impl DataFlow {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn routes(&self, graph: &Graph, epoch: usize) -> Vec<Route> {
        let outputs: Vec<NodeId> = graph
            .nodes_with_role(NodeRole::Output)
            .map(|n| n.id)
            .collect();
        if outputs.is_empty() {
            return Vec::new();
        }

        let mut rng = epoch_rng(self.seed, epoch, SALT);
        graph
            .nodes_with_role(NodeRole::Input)
            .filter_map(|n| {
                let fires = rng.random_bool(SPAWN_PROBABILITY);
                let target = outputs[rng.random_range(0..outputs.len())];
                fires.then_some(Route {
                    from: n.id,
                    to: target,
                })
            })
            .collect()
    }
}

/// Places routes on the surface; routes with an unresolved endpoint are dropped.
pub fn place<F>(routes: &[Route], position: F) -> Vec<Particle>
where
    F: Fn(NodeId) -> Option<Point>,
{
    routes
        .iter()
        .filter_map(|route| {
            let start = position(route.from)?;
            let end = position(route.to)?;
            Some(Particle {
                route: *route,
                start,
                dx: end.x - start.x,
                dy: end.y - start.y,
            })
        })
        .collect()
}
