//! Closed-form synthetic training curves with bounded uniform noise.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const TRAIN_LOSS_FLOOR: f64 = 0.1;
pub const VAL_LOSS_FLOOR: f64 = 0.15;
pub const ACCURACY_CEILING: f64 = 98.0;

const TRAIN_NOISE: f64 = 0.1;
const VAL_NOISE: f64 = 0.15;
const ACCURACY_NOISE: f64 = 2.0;

/// Metrics of a single synthetic epoch. Never modified once appended to a history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 1-based epoch index.
    pub epoch: usize,
    pub train_loss: f64,
    pub val_loss: f64,
    /// Percentage in `0..=98`.
    pub accuracy: f64,
}

/// Noise-free training loss at `epoch`.
pub fn baseline_train_loss(epoch: usize) -> f64 {
    (2.0 * 0.5f64.powf(epoch as f64 / 2.0)).max(TRAIN_LOSS_FLOOR)
}

/// Noise-free validation loss at `epoch`.
pub fn baseline_val_loss(epoch: usize) -> f64 {
    (2.2 * 0.6f64.powf(epoch as f64 / 2.0)).max(VAL_LOSS_FLOOR)
}

/// Noise-free accuracy at `epoch`.
pub fn baseline_accuracy(epoch: usize) -> f64 {
    (10.0 + 88.0 * (1.0 - 0.7f64.powf(epoch as f64 / 2.0))).min(ACCURACY_CEILING)
}

/// Draws the metrics of `epoch` using `rng` as the uniform noise source.
pub fn synthetic_metrics<R: Rng + ?Sized>(epoch: usize, rng: &mut R) -> EpochRecord {
    let train_loss = baseline_train_loss(epoch) + TRAIN_NOISE * rng.random::<f64>();
    let val_loss = baseline_val_loss(epoch) + VAL_NOISE * rng.random::<f64>();
    let raw_accuracy = 10.0 + 88.0 * (1.0 - 0.7f64.powf(epoch as f64 / 2.0));
    let accuracy = (raw_accuracy + ACCURACY_NOISE * rng.random::<f64>()).min(ACCURACY_CEILING);

    EpochRecord {
        epoch,
        train_loss,
        val_loss,
        accuracy,
    }
}

/// Seedable source of synthetic epochs.
#[derive(Debug, Clone)]
pub struct MetricsGenerator {
    rng: StdRng,
}

impl MetricsGenerator {
    /// Creates a generator; `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    pub fn generate(&mut self, epoch: usize) -> EpochRecord {
        synthetic_metrics(epoch, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for epoch in [1, 2, 3, 5, 10, 25, 100, 1000] {
            for _ in 0..1000 {
                let r = synthetic_metrics(epoch, &mut rng);
                assert_eq!(r.epoch, epoch);
                assert!(r.train_loss >= TRAIN_LOSS_FLOOR, "{r:?}");
                assert!(r.train_loss <= baseline_train_loss(epoch) + TRAIN_NOISE);
                assert!(r.val_loss >= VAL_LOSS_FLOOR, "{r:?}");
                assert!(r.val_loss <= baseline_val_loss(epoch) + VAL_NOISE);
                assert!((0.0..=ACCURACY_CEILING).contains(&r.accuracy), "{r:?}");
            }
        }
    }

    #[test]
    fn baselines_are_monotone() {
        for epoch in 1..200 {
            assert!(baseline_train_loss(epoch + 1) <= baseline_train_loss(epoch));
            assert!(baseline_val_loss(epoch + 1) <= baseline_val_loss(epoch));
            assert!(baseline_accuracy(epoch + 1) >= baseline_accuracy(epoch));
        }
        assert_eq!(baseline_train_loss(10_000), TRAIN_LOSS_FLOOR);
        assert_eq!(baseline_val_loss(10_000), VAL_LOSS_FLOOR);
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = MetricsGenerator::new(Some(42));
        let mut b = MetricsGenerator::new(Some(42));
        for epoch in 1..=10 {
            assert_eq!(a.generate(epoch), b.generate(epoch));
        }
    }

    #[test]
    fn first_epoch_values() {
        let r = synthetic_metrics(1, &mut StdRng::seed_from_u64(0));
        // 2.0 * 0.5^0.5
        assert!(r.train_loss >= 1.414 && r.train_loss < 1.515);
        assert!(r.accuracy > 10.0 && r.accuracy < 30.0);
    }
}
