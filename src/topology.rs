//! Static catalog of the model topologies the dashboard can display.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named layer and its number of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    pub name: &'static str,
    pub units: usize,
}

const fn layer(name: &'static str, units: usize) -> Layer {
    Layer { name, units }
}

const MLP: &[Layer] = &[
    layer("Input", 4),
    layer("Hidden1", 8),
    layer("Hidden2", 6),
    layer("Output", 3),
];

const CNN: &[Layer] = &[
    layer("Input", 3),
    layer("Conv1", 8),
    layer("Pool1", 8),
    layer("Conv2", 16),
    layer("Pool2", 16),
    layer("Flatten", 1),
    layer("Dense", 64),
    layer("Output", 10),
];

const RNN: &[Layer] = &[
    layer("Input", 1),
    layer("Embed", 8),
    layer("LSTM", 16),
    layer("Dense", 32),
    layer("Output", 10),
];

const TRANSFORMER: &[Layer] = &[
    layer("Input", 1),
    layer("Embed", 8),
    layer("Attention", 8),
    layer("FFN", 8),
    layer("Norm", 8),
    layer("Output", 10),
];

/// The fixed set of model presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Variant {
    #[default]
    Mlp,
    Cnn,
    Rnn,
    Transformer,
}

impl Variant {
    /// Parses a variant name, falling back to [`Variant::Mlp`] for anything unknown.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "cnn" => Self::Cnn,
            "rnn" => Self::Rnn,
            "transformer" => Self::Transformer,
            "mlp" => Self::Mlp,
            other => {
                log::debug!("unknown model type {other:?}, using mlp");
                Self::Mlp
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mlp => "mlp",
            Self::Cnn => "cnn",
            Self::Rnn => "rnn",
            Self::Transformer => "transformer",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Mlp => "Multi-Layer Perceptron",
            Self::Cnn => "Convolutional Network",
            Self::Rnn => "Recurrent Network",
            Self::Transformer => "Transformer",
        }
    }

    pub fn all() -> &'static [Variant] {
        &[Self::Mlp, Self::Cnn, Self::Rnn, Self::Transformer]
    }

    /// The next variant in catalog order, wrapping around.
    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|v| *v == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Variant> for String {
    fn from(value: Variant) -> Self {
        value.label().to_string()
    }
}

/// An immutable, ordered layer list for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    variant: Variant,
    layers: &'static [Layer],
}

impl Topology {
    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn layers(&self) -> &'static [Layer] {
        self.layers
    }

    pub fn input(&self) -> Layer {
        self.layers[0]
    }

    pub fn output(&self) -> Layer {
        self.layers[self.layers.len() - 1]
    }

    /// Total number of units across every layer.
    pub fn unit_count(&self) -> usize {
        self.layers.iter().map(|l| l.units).sum()
    }

    /// Number of connections when adjacent layers are fully connected.
    pub fn edge_count(&self) -> usize {
        self.layers.windows(2).map(|w| w[0].units * w[1].units).sum()
    }
}

/// Returns the layer list of `variant`.
pub fn layers_for(variant: Variant) -> Topology {
    let layers = match variant {
        Variant::Mlp => MLP,
        Variant::Cnn => CNN,
        Variant::Rnn => RNN,
        Variant::Transformer => TRANSFORMER,
    };
    Topology { variant, layers }
}

/// Looks a topology up by name; unknown names resolve to the mlp preset.
pub fn layers_for_name(name: &str) -> Topology {
    layers_for(Variant::parse(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_input_and_output() {
        for v in Variant::all() {
            let t = layers_for(*v);
            assert!(t.layers().len() >= 2, "{v} has fewer than two layers");
            assert!(t.layers().iter().all(|l| l.units > 0));
            assert_eq!(t.input().name, "Input");
            assert_eq!(t.output().name, "Output");
        }
    }

    #[test]
    fn mlp_layers() {
        let t = layers_for_name("mlp");
        let shape: Vec<_> = t.layers().iter().map(|l| (l.name, l.units)).collect();
        assert_eq!(
            shape,
            [("Input", 4), ("Hidden1", 8), ("Hidden2", 6), ("Output", 3)]
        );
        assert_eq!(t.edge_count(), 4 * 8 + 8 * 6 + 6 * 3);
    }

    #[test]
    fn cnn_edge_count() {
        let t = layers_for(Variant::Cnn);
        assert_eq!(t.layers().len(), 8);
        assert_eq!(
            t.edge_count(),
            3 * 8 + 8 * 8 + 8 * 16 + 16 * 16 + 16 + 64 + 64 * 10
        );
    }

    #[test]
    fn unknown_name_falls_back_to_mlp() {
        assert_eq!(layers_for_name("resnet").variant(), Variant::Mlp);
        assert_eq!(layers_for_name("").variant(), Variant::Mlp);
        assert_eq!(layers_for_name(" Transformer ").variant(), Variant::Transformer);
    }

    #[test]
    fn variant_cycles_through_catalog() {
        let mut v = Variant::Mlp;
        for _ in 0..Variant::all().len() {
            v = v.next();
        }
        assert_eq!(v, Variant::Mlp);
    }

    #[test]
    fn variant_serde_is_lenient() {
        let v: Variant = serde_json::from_str("\"rnn\"").unwrap();
        assert_eq!(v, Variant::Rnn);
        let v: Variant = serde_json::from_str("\"lstm\"").unwrap();
        assert_eq!(v, Variant::Mlp);
        assert_eq!(serde_json::to_string(&Variant::Cnn).unwrap(), "\"cnn\"");
    }
}
