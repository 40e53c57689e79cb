//! Grid of feature maps that fade from noise into a pattern as training progresses.

use rand::Rng;

use super::epoch_rng;
use crate::driver::Snapshot;

pub const MAP_COUNT: usize = 6;
pub const MAP_SIZE: usize = 5;

const SALT: u64 = 0xFEA7;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    pub index: usize,
    pub visible: bool,
    /// Row-major activations in `0..=1`, `MAP_SIZE * MAP_SIZE` long.
    pub cells: Vec<f64>,
}

impl FeatureMap {
    pub fn cell(&self, row: usize, col: usize) -> f64 {
        self.cells[row * MAP_SIZE + col]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMapFrame {
    pub maps: Vec<FeatureMap>,
}

impl FeatureMapFrame {
    /// Every map hidden with zero activation.
    pub fn hidden() -> Self {
        let maps = (0..MAP_COUNT)
            .map(|index| FeatureMap {
                index,
                visible: false,
                cells: vec![0.0; MAP_SIZE * MAP_SIZE],
            })
            .collect();
        Self { maps }
    }

    pub fn visible_count(&self) -> usize {
        self.maps.iter().filter(|m| m.visible).count()
    }
}

/// Grid of fake convolution activations that sharpen into stripes as training advances.
#[derive(Debug, Clone, Copy)]
pub struct FeatureMapGrid {
    seed: u64,
}

impl FeatureMapGrid {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn render(&self, snapshot: &Snapshot<'_>) -> FeatureMapFrame {
        if snapshot.epoch == 0 {
            return FeatureMapFrame::hidden();
        }

        let progress = snapshot.progress.clamp(0.0, 1.0);
        let shown = ((progress * MAP_COUNT as f64).ceil() as usize).clamp(1, MAP_COUNT);
        let mut rng = epoch_rng(self.seed, snapshot.epoch, SALT);

        let maps = (0..MAP_COUNT)
            .map(|index| {
                // Each map converges on stripes of its own orientation.
                let theta = index as f64 * std::f64::consts::PI / MAP_COUNT as f64;
                let (sin, cos) = theta.sin_cos();
                let cells = (0..MAP_SIZE * MAP_SIZE)
                    .map(|i| {
                        let (r, c) = ((i / MAP_SIZE) as f64, (i % MAP_SIZE) as f64);
                        let pattern = 0.5 + 0.5 * (1.7 * (c * cos + r * sin)).sin();
                        let noise: f64 = rng.random();
                        ((1.0 - progress) * noise + progress * pattern).clamp(0.0, 1.0)
                    })
                    .collect();
                FeatureMap {
                    index,
                    visible: index < shown,
                    cells,
                }
            })
            .collect();

        FeatureMapFrame { maps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        driver::RunState,
        topology::{layers_for, Variant},
    };

    fn snap(topology: &crate::topology::Topology, epoch: usize, max: usize) -> Snapshot<'_> {
        Snapshot {
            state: RunState::Running,
            epoch,
            max_epochs: max,
            progress: epoch as f64 / max as f64,
            history: &[],
            topology,
        }
    }

    #[test]
    fn visible_maps_grow_with_progress() {
        let t = layers_for(Variant::Cnn);
        let grid = FeatureMapGrid::new(3);
        assert_eq!(grid.render(&snap(&t, 0, 10)).visible_count(), 0);
        assert_eq!(grid.render(&snap(&t, 1, 100)).visible_count(), 1);
        assert_eq!(grid.render(&snap(&t, 5, 10)).visible_count(), 3);
        assert_eq!(grid.render(&snap(&t, 10, 10)).visible_count(), MAP_COUNT);
    }

    #[test]
    fn activations_are_bounded_and_repeatable() {
        let t = layers_for(Variant::Cnn);
        let grid = FeatureMapGrid::new(9);
        for epoch in 1..=10 {
            let s = snap(&t, epoch, 10);
            let frame = grid.render(&s);
            assert_eq!(frame, grid.render(&s));
            for m in &frame.maps {
                assert_eq!(m.cells.len(), MAP_SIZE * MAP_SIZE);
                assert!(m.cells.iter().all(|v| (0.0..=1.0).contains(v)));
            }
        }
    }
}
