//! Per-head attention weights for the transformer view.

use rand::Rng;

use super::epoch_rng;
use crate::{driver::Snapshot, topology::Variant};

pub const HEADS: usize = 4;
pub const TOKENS: usize = 6;

const SALT: u64 = 0xA77E;

#[derive(Debug, Clone, PartialEq)]
pub struct AttentionHead {
    /// Display scale in `0..=1`; 0 means collapsed.
    pub scale: f64,
    /// `TOKENS x TOKENS`, every row sums to 1.
    pub weights: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttentionFrame {
    pub heads: Vec<AttentionHead>,
}

impl AttentionFrame {
    /// Collapsed heads with uniform weights.
    pub fn hidden() -> Self {
        let uniform = vec![vec![1.0 / TOKENS as f64; TOKENS]; TOKENS];
        Self {
            heads: (0..HEADS)
                .map(|_| AttentionHead {
                    scale: 0.0,
                    weights: uniform.clone(),
                })
                .collect(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.heads.iter().any(|h| h.scale > 0.0)
    }
}

/// Attention heatmaps for the transformer topology.
#[derive(Debug, Clone, Copy)]
pub struct AttentionOverlay {
    seed: u64,
}

impl AttentionOverlay {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn render(&self, snapshot: &Snapshot<'_>) -> AttentionFrame {
        if snapshot.variant() != Variant::Transformer || snapshot.epoch == 0 {
            return AttentionFrame::hidden();
        }

        let progress = snapshot.progress.clamp(0.0, 1.0);
        let sharpness = 1.0 + 4.0 * progress;
        let mut rng = epoch_rng(self.seed, snapshot.epoch, SALT);

        let heads = (0..HEADS)
            .map(|h| {
                // Head `h` learns to look `h` tokens back.
                let weights = (0..TOKENS)
                    .map(|i| {
                        let focus = (i + TOKENS - h % TOKENS) % TOKENS;
                        let logits: Vec<f64> = (0..TOKENS)
                            .map(|j| {
                                let target = if j == focus { sharpness } else { 0.0 };
                                target + rng.random::<f64>() * 0.5
                            })
                            .collect();
                        softmax(&logits)
                    })
                    .collect();
                AttentionHead {
                    scale: progress,
                    weights,
                }
            })
            .collect();

        AttentionFrame { heads }
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        driver::RunState,
        topology::{layers_for, Topology},
    };

    fn snap(topology: &Topology, epoch: usize) -> Snapshot<'_> {
        Snapshot {
            state: RunState::Running,
            epoch,
            max_epochs: 9,
            progress: epoch as f64 / 9.0,
            history: &[],
            topology,
        }
    }

    #[test]
    fn rows_are_distributions() {
        let t = layers_for(Variant::Transformer);
        let frame = AttentionOverlay::new(1).render(&snap(&t, 6));
        assert_eq!(frame.heads.len(), HEADS);
        for head in &frame.heads {
            assert!((head.scale - 6.0 / 9.0).abs() < 1e-12);
            for row in &head.weights {
                let sum: f64 = row.iter().sum();
                assert!((sum - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn focus_dominates_late_in_training() {
        let t = layers_for(Variant::Transformer);
        let frame = AttentionOverlay::new(5).render(&snap(&t, 9));
        let head0 = &frame.heads[0];
        for (i, row) in head0.weights.iter().enumerate() {
            let argmax = row
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(j, _)| j);
            assert_eq!(argmax, Some(i));
        }
    }

    #[test]
    fn other_topologies_stay_hidden() {
        let t = layers_for(Variant::Rnn);
        let frame = AttentionOverlay::new(1).render(&snap(&t, 3));
        assert!(!frame.is_visible());
        assert_eq!(frame, AttentionFrame::hidden());
    }
}
