//! How often the secondary panels refresh during a run.

use serde::{Deserialize, Serialize};

use crate::topology::Variant;

/// When the secondary panels refresh during a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cadence {
    /// Feature maps refresh on every epoch divisible by this.
    pub feature_maps_every: usize,
    /// Attention heads refresh on every epoch divisible by this (transformer only).
    pub attention_every: usize,
    /// The confusion matrix refreshes once `epoch > max_epochs * confusion_after`.
    pub confusion_after: f64,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            feature_maps_every: 2,
            attention_every: 3,
            confusion_after: 0.5,
        }
    }
}

impl Cadence {
    pub fn refresh_feature_maps(&self, epoch: usize) -> bool {
        self.feature_maps_every > 0 && epoch > 0 && epoch % self.feature_maps_every == 0
    }

    pub fn refresh_attention(&self, epoch: usize, variant: Variant) -> bool {
        variant == Variant::Transformer
            && self.attention_every > 0
            && epoch > 0
            && epoch % self.attention_every == 0
    }

    pub fn refresh_confusion(&self, epoch: usize, max_epochs: usize) -> bool {
        epoch as f64 > max_epochs as f64 * self.confusion_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let c = Cadence::default();
        let maps: Vec<_> = (1..=10).filter(|e| c.refresh_feature_maps(*e)).collect();
        assert_eq!(maps, [2, 4, 6, 8, 10]);

        let attn: Vec<_> = (1..=10)
            .filter(|e| c.refresh_attention(*e, Variant::Transformer))
            .collect();
        assert_eq!(attn, [3, 6, 9]);
        assert!((1..=10).all(|e| !c.refresh_attention(e, Variant::Cnn)));

        let conf: Vec<_> = (1..=10).filter(|e| c.refresh_confusion(*e, 10)).collect();
        assert_eq!(conf, [6, 7, 8, 9, 10]);
        // Odd bound: 7 / 2 = 3.5
        assert!(!c.refresh_confusion(3, 7));
        assert!(c.refresh_confusion(4, 7));
    }

    #[test]
    fn zero_period_never_refreshes() {
        let c = Cadence {
            feature_maps_every: 0,
            attention_every: 0,
            confusion_after: 0.5,
        };
        assert!((0..20).all(|e| !c.refresh_feature_maps(e)));
        assert!((0..20).all(|e| !c.refresh_attention(e, Variant::Transformer)));
    }
}
