//! Synthetic confusion matrix whose diagonal sharpens with accuracy.

use rand::Rng;

use super::epoch_rng;
use crate::driver::Snapshot;

pub const SAMPLES_PER_CLASS: u32 = 100;

const SALT: u64 = 0xC0F5;

/// Predicted-vs-actual counts, one row per true class.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionFrame {
    pub visible: bool,
    pub counts: Vec<Vec<u32>>,
}

impl ConfusionFrame {
    /// A zeroed, hidden matrix.
    pub fn hidden(classes: usize) -> Self {
        Self {
            visible: false,
            counts: vec![vec![0; classes]; classes],
        }
    }

    pub fn classes(&self) -> usize {
        self.counts.len()
    }

    /// Fraction of the row's samples that landed in `col`.
    pub fn intensity(&self, row: usize, col: usize) -> f64 {
        let total: u32 = self.counts[row].iter().sum();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.counts[row][col]) / f64::from(total)
    }
}

/// Confusion matrix over the output units of the current topology.
#[derive(Debug, Clone, Copy)]
pub struct ConfusionMatrix {
    seed: u64,
}

impl ConfusionMatrix {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn render(&self, snapshot: &Snapshot<'_>) -> ConfusionFrame {
        let classes = snapshot.topology.output().units;
        let Some(latest) = snapshot.latest() else {
            return ConfusionFrame::hidden(classes);
        };

        let correct = (latest.accuracy.round().clamp(0.0, f64::from(SAMPLES_PER_CLASS))) as u32;
        let mut rng = epoch_rng(self.seed, snapshot.epoch, SALT);

        let counts = (0..classes)
            .map(|row| {
                let mut counts = vec![0; classes];
                if classes == 1 {
                    counts[0] = SAMPLES_PER_CLASS;
                    return counts;
                }
                counts[row] = correct;
                for _ in correct..SAMPLES_PER_CLASS {
                    // Pick any class but the true one.
                    let mut col = rng.random_range(0..classes - 1);
                    if col >= row {
                        col += 1;
                    }
                    counts[col] += 1;
                }
                counts
            })
            .collect();

        ConfusionFrame {
            visible: true,
            counts,
        }
    }
}
