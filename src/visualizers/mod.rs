//! Visual consumers of driver events.
//!
//! Every panel is a pure `render(&Snapshot) -> Frame` function. [`Visuals`] is the
//! listener that decides which panels refresh on which event and keeps the most
//! recent frame of each for the host surface to draw.

pub mod attention;
pub mod cadence;
pub mod confusion;
pub mod data_flow;
pub mod feature_maps;
pub mod loss_chart;
pub mod status;

use rand::{rngs::StdRng, SeedableRng};

pub use attention::{AttentionFrame, AttentionOverlay};
pub use cadence::Cadence;
pub use confusion::{ConfusionFrame, ConfusionMatrix};
pub use data_flow::{DataFlow, Particle, Route};
pub use feature_maps::{FeatureMapFrame, FeatureMapGrid};
pub use loss_chart::{LossChart, LossChartFrame};
pub use status::StatusFrame;

use crate::{
    driver::{Snapshot, TrainingEvent, TrainingListener},
    network::NetworkRenderer,
    topology::Topology,
};

const MAX_LOGS: usize = 200;

/// Default chart width when the host has not measured its surface.
pub const DEFAULT_CHART_WIDTH: f64 = 600.0;

/// Derives the RNG a panel uses for one epoch, so re-rendering is repeatable.
pub(crate) fn epoch_rng(seed: u64, epoch: usize, salt: u64) -> StdRng {
    let mixed = seed
        ^ (epoch as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ salt.rotate_left(32);
    StdRng::seed_from_u64(mixed)
}

/// A single entry of the in-view event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: &'static str,
    pub message: String,
}

/// Connection and neuron styling of the network diagram.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NetworkStyle {
    /// Opacity of every connection; 0 hides them.
    pub edge_opacity: f64,
    /// Output neurons pulse once a run finished.
    pub pulse_outputs: bool,
}

pub struct Visuals {
    cadence: Cadence,
    network: NetworkRenderer,
    chart: LossChart,
    feature_maps: FeatureMapGrid,
    attention: AttentionOverlay,
    confusion: ConfusionMatrix,
    data_flow: DataFlow,

    status_frame: StatusFrame,
    chart_frame: LossChartFrame,
    feature_frame: FeatureMapFrame,
    attention_frame: AttentionFrame,
    confusion_frame: ConfusionFrame,
    network_style: NetworkStyle,
    routes: Vec<Route>,
    logs: Vec<LogLine>,
}

impl Visuals {
    /// Creates the panel set for `topology`.
    ///
    /// # Args
    /// * `topology` - Currently selected topology.
    /// * `cadence` - Refresh thresholds of the secondary panels.
    /// * `seed` - Seed of the decorative noise.
    pub fn new(topology: Topology, cadence: Cadence, seed: u64) -> Self {
        let chart = LossChart::new(DEFAULT_CHART_WIDTH);
        Self {
            cadence,
            network: NetworkRenderer::new(topology),
            chart,
            feature_maps: FeatureMapGrid::new(seed),
            attention: AttentionOverlay::new(seed),
            confusion: ConfusionMatrix::new(seed),
            data_flow: DataFlow::new(seed),
            status_frame: StatusFrame::default(),
            chart_frame: chart.blank(),
            feature_frame: FeatureMapFrame::hidden(),
            attention_frame: AttentionFrame::hidden(),
            confusion_frame: ConfusionFrame::hidden(topology.output().units),
            network_style: NetworkStyle::default(),
            routes: Vec::new(),
            logs: vec![LogLine {
                level: "INFO",
                message: format!("{} ready", topology.variant().display_name()),
            }],
        }
    }

    /// Changes the chart surface width and rescales the current chart frame to it.
    pub fn set_chart_width(&mut self, width: f64) {
        if width <= 0.0 || width == self.chart.width() {
            return;
        }
        self.chart = LossChart::new(width);

        let frame = &mut self.chart_frame;
        if frame.width > 0.0 {
            let ratio = width / frame.width;
            for p in frame.curve.iter_mut().chain(frame.points.iter_mut()) {
                p.x *= ratio;
            }
        }
        frame.width = width;
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    pub fn network(&self) -> &NetworkRenderer {
        &self.network
    }

    pub fn status(&self) -> &StatusFrame {
        &self.status_frame
    }

    pub fn chart(&self) -> &LossChartFrame {
        &self.chart_frame
    }

    pub fn feature_maps(&self) -> &FeatureMapFrame {
        &self.feature_frame
    }

    pub fn attention(&self) -> &AttentionFrame {
        &self.attention_frame
    }

    pub fn confusion(&self) -> &ConfusionFrame {
        &self.confusion_frame
    }

    pub fn network_style(&self) -> NetworkStyle {
        self.network_style
    }

    /// Particle routes spawned by the latest epoch.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn logs(&self) -> &[LogLine] {
        &self.logs
    }

    fn clear_run(&mut self, topology: &Topology) {
        self.chart_frame = self.chart.blank();
        self.feature_frame = FeatureMapFrame::hidden();
        self.attention_frame = AttentionFrame::hidden();
        self.confusion_frame = ConfusionFrame::hidden(topology.output().units);
        self.routes.clear();
    }

    fn refresh_epoch(&mut self, snapshot: &Snapshot<'_>) {
        self.chart_frame = self.chart.render(snapshot);
        self.routes = self.data_flow.routes(self.network.graph(), snapshot.epoch);

        if self.cadence.refresh_feature_maps(snapshot.epoch) {
            self.feature_frame = self.feature_maps.render(snapshot);
        }
        if self
            .cadence
            .refresh_attention(snapshot.epoch, snapshot.variant())
        {
            self.attention_frame = self.attention.render(snapshot);
        }
        if self
            .cadence
            .refresh_confusion(snapshot.epoch, snapshot.max_epochs)
        {
            self.confusion_frame = self.confusion.render(snapshot);
        }
    }

    fn push_log(&mut self, level: &'static str, message: String) {
        self.logs.push(LogLine { level, message });
        if self.logs.len() > MAX_LOGS {
            let drain = self.logs.len() - MAX_LOGS;
            self.logs.drain(0..drain);
        }
    }
}

impl TrainingListener for Visuals {
    fn on_event(&mut self, event: &TrainingEvent, snapshot: &Snapshot<'_>) {
        self.status_frame = status::render(snapshot);

        match event {
            TrainingEvent::Started => {
                self.clear_run(snapshot.topology);
                self.network_style = NetworkStyle {
                    edge_opacity: crate::network::EDGE_OPACITY,
                    pulse_outputs: false,
                };
                self.push_log(
                    "INFO",
                    format!(
                        "training {} for {} epochs",
                        snapshot.variant(),
                        snapshot.max_epochs
                    ),
                );
            }

            TrainingEvent::EpochUpdated { record, .. } => {
                self.refresh_epoch(snapshot);
                self.push_log(
                    "INFO",
                    format!(
                        "epoch {}: loss={:.4} val_loss={:.4} acc={:.2}%",
                        record.epoch, record.train_loss, record.val_loss, record.accuracy
                    ),
                );
            }

            TrainingEvent::Paused { epoch } => {
                self.push_log("INFO", format!("paused at epoch {epoch}"));
            }

            TrainingEvent::Resumed { epoch } => {
                self.push_log("INFO", format!("resumed at epoch {epoch}"));
            }

            TrainingEvent::Completed { final_record } => {
                self.network_style.pulse_outputs = true;
                self.push_log(
                    "INFO",
                    format!(
                        "training complete, final loss {:.4}",
                        final_record.train_loss
                    ),
                );
            }

            TrainingEvent::Reset => {
                self.clear_run(snapshot.topology);
                self.network_style = NetworkStyle::default();
                self.push_log("WARN", "training reset".into());
            }

            TrainingEvent::TopologyChanged { variant } => {
                self.network.rebuild(*snapshot.topology);
                self.clear_run(snapshot.topology);
                self.push_log("INFO", format!("model switched to {variant}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, time::Duration};

    use super::*;
    use crate::{
        driver::{DriverConfig, TrainingDriver},
        metrics::MetricsGenerator,
        scheduler::ManualScheduler,
        topology::{layers_for, Variant},
    };

    const TICK: Duration = Duration::from_millis(100);

    fn setup(variant: Variant) -> (TrainingDriver<ManualScheduler>, ManualScheduler, Visuals) {
        let clock = ManualScheduler::new();
        let config = DriverConfig::new(NonZeroUsize::new(10).unwrap(), TICK).unwrap();
        let driver = TrainingDriver::new(
            config,
            variant,
            MetricsGenerator::new(Some(2)),
            clock.clone(),
        );
        let visuals = Visuals::new(layers_for(variant), Cadence::default(), 2);
        (driver, clock, visuals)
    }

    fn run_epochs(
        d: &mut TrainingDriver<ManualScheduler>,
        clock: &ManualScheduler,
        v: &mut Visuals,
        n: usize,
    ) {
        for _ in 0..n {
            clock.advance(TICK);
            d.poll(v);
        }
    }

    #[test]
    fn secondary_panels_follow_cadence() {
        let (mut d, clock, mut v) = setup(Variant::Transformer);
        d.start(&mut v);
        assert_eq!(v.network_style().edge_opacity, crate::network::EDGE_OPACITY);
        assert_eq!(v.status().message, "Initializing training...");

        run_epochs(&mut d, &clock, &mut v, 1);
        assert_eq!(v.feature_maps().visible_count(), 0);
        assert!(!v.attention().is_visible());

        run_epochs(&mut d, &clock, &mut v, 1);
        assert_eq!(v.feature_maps().visible_count(), 2);

        run_epochs(&mut d, &clock, &mut v, 1);
        assert!(v.attention().is_visible());
        assert!(!v.confusion().visible);

        run_epochs(&mut d, &clock, &mut v, 3);
        assert!(v.confusion().visible);
        assert_eq!(v.confusion().classes(), 10);
        assert_eq!(v.chart().points.len(), 5);
        assert_eq!(v.chart().curve.len(), 6);
    }

    #[test]
    fn chart_width_rescales_current_frame() {
        let (mut d, clock, mut v) = setup(Variant::Mlp);
        d.start(&mut v);
        run_epochs(&mut d, &clock, &mut v, 2);
        assert_eq!(v.chart().curve[1].x, 2.0 * DEFAULT_CHART_WIDTH / 10.0);

        v.set_chart_width(100.0);
        assert_eq!(v.chart().width, 100.0);
        assert!((v.chart().curve[1].x - 20.0).abs() < 1e-9);
        assert!((v.chart().points[1].x - 20.0).abs() < 1e-9);

        run_epochs(&mut d, &clock, &mut v, 1);
        assert!((v.chart().curve[2].x - 30.0).abs() < 1e-9);

        v.set_chart_width(0.0);
        assert_eq!(v.chart().width, 100.0);
    }

    #[test]
    fn attention_stays_hidden_for_mlp() {
        let (mut d, clock, mut v) = setup(Variant::Mlp);
        d.start(&mut v);
        run_epochs(&mut d, &clock, &mut v, 10);
        assert!(!v.attention().is_visible());
        assert!(v.network_style().pulse_outputs);
        assert!(v.status().message.starts_with("Training completed!"));
    }

    #[test]
    fn reset_clears_every_panel() {
        let (mut d, clock, mut v) = setup(Variant::Transformer);
        d.start(&mut v);
        run_epochs(&mut d, &clock, &mut v, 8);
        d.reset(&mut v);

        assert_eq!(v.status(), &StatusFrame::default());
        assert!(v.chart().points.is_empty());
        assert!(v.chart().curve.is_empty());
        assert_eq!(v.chart().width, DEFAULT_CHART_WIDTH);
        assert_eq!(v.feature_maps().visible_count(), 0);
        assert!(!v.attention().is_visible());
        assert_eq!(v.confusion(), &ConfusionFrame::hidden(10));
        assert_eq!(v.network_style(), NetworkStyle::default());
        assert!(v.routes().is_empty());
    }

    #[test]
    fn topology_change_rebuilds_network() {
        let (mut d, clock, mut v) = setup(Variant::Mlp);
        d.start(&mut v);
        run_epochs(&mut d, &clock, &mut v, 2);

        d.set_variant(Variant::Cnn, &mut v);
        assert_eq!(v.network().topology().variant(), Variant::Cnn);
        assert_eq!(v.network().graph().edges.len(), 1192);
        assert_eq!(v.confusion().classes(), 10);
        assert_eq!(v.network_style().edge_opacity, 0.0);
        assert!(v
            .logs()
            .iter()
            .any(|l| l.message == "model switched to cnn"));
    }

    #[test]
    fn log_is_bounded() {
        let (mut d, _clock, mut v) = setup(Variant::Mlp);
        for _ in 0..150 {
            d.start(&mut v);
            d.reset(&mut v);
        }
        assert_eq!(v.logs().len(), MAX_LOGS);
        assert_eq!(v.logs().last().map(|l| l.level), Some("WARN"));
    }
}
