//! Training-loss chart: the whole curve plus a highlighted trailing window.

use crate::{driver::Snapshot, metrics::EpochRecord};

pub const CHART_HEIGHT: f64 = 300.0;
/// Losses at or above this value are pinned to the top of the chart.
pub const LOSS_SCALE_MAX: f64 = 2.5;
/// Number of trailing points kept on screen.
pub const POINT_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub epoch: usize,
    pub loss: f64,
    /// Distance from the left edge.
    pub x: f64,
    /// Distance from the bottom edge.
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossChartFrame {
    /// Surface width the positions were computed for.
    pub width: f64,
    /// Every recorded epoch.
    pub curve: Vec<ChartPoint>,
    /// The last [`POINT_WINDOW`] epochs of `curve`.
    pub points: Vec<ChartPoint>,
    /// Horizontal scale of the loss line, `epoch / max_epochs`.
    pub line_scale: f64,
}

/// Training-loss chart over a surface `width` units wide and [`CHART_HEIGHT`] tall.
#[derive(Debug, Clone, Copy)]
pub struct LossChart {
    width: f64,
}

impl LossChart {
    pub fn new(width: f64) -> Self {
        Self { width }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// An empty frame sized for this surface.
    pub fn blank(&self) -> LossChartFrame {
        LossChartFrame {
            width: self.width,
            ..LossChartFrame::default()
        }
    }

    pub fn render(&self, snapshot: &Snapshot<'_>) -> LossChartFrame {
        let spacing = self.width / snapshot.max_epochs as f64;
        let place = |r: &EpochRecord| ChartPoint {
            epoch: r.epoch,
            loss: r.train_loss,
            x: r.epoch as f64 * spacing,
            y: (r.train_loss / LOSS_SCALE_MAX).min(1.0) * CHART_HEIGHT,
        };

        let curve: Vec<_> = snapshot.history.iter().map(place).collect();
        let points = curve[curve.len().saturating_sub(POINT_WINDOW)..].to_vec();

        LossChartFrame {
            width: self.width,
            curve,
            points,
            line_scale: snapshot.progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        driver::RunState,
        metrics::EpochRecord,
        topology::{layers_for, Variant},
    };

    fn history(n: usize) -> Vec<EpochRecord> {
        (1..=n)
            .map(|epoch| EpochRecord {
                epoch,
                train_loss: 3.0 / epoch as f64,
                val_loss: 0.0,
                accuracy: 0.0,
            })
            .collect()
    }

    #[test]
    fn keeps_trailing_window() {
        let topology = layers_for(Variant::Mlp);
        let h = history(8);
        let snap = Snapshot {
            state: RunState::Running,
            epoch: 8,
            max_epochs: 10,
            progress: 0.8,
            history: &h,
            topology: &topology,
        };

        let frame = LossChart::new(500.0).render(&snap);
        let epochs: Vec<_> = frame.points.iter().map(|p| p.epoch).collect();
        assert_eq!(epochs, [4, 5, 6, 7, 8]);
        assert_eq!(frame.points[0].x, 200.0);
        assert!((frame.line_scale - 0.8).abs() < 1e-12);

        assert_eq!(frame.width, 500.0);
        assert_eq!(frame.curve.len(), 8);
        assert_eq!(frame.curve[3..], frame.points[..]);
    }

    #[test]
    fn scales_loss_into_chart() {
        let topology = layers_for(Variant::Mlp);
        let h = history(2);
        let snap = Snapshot {
            state: RunState::Running,
            epoch: 2,
            max_epochs: 10,
            progress: 0.2,
            history: &h,
            topology: &topology,
        };

        let chart = LossChart::new(100.0);
        let frame = chart.render(&snap);
        // 3.0 is above the scale maximum and is clamped.
        assert_eq!(frame.points[0].y, CHART_HEIGHT);
        assert!((frame.points[1].y - 1.5 / 2.5 * CHART_HEIGHT).abs() < 1e-9);
        assert_eq!(chart.render(&snap), frame);
    }

    #[test]
    fn width_sets_horizontal_positions() {
        let topology = layers_for(Variant::Mlp);
        let h = history(4);
        let snap = Snapshot {
            state: RunState::Running,
            epoch: 4,
            max_epochs: 4,
            progress: 1.0,
            history: &h,
            topology: &topology,
        };

        let narrow = LossChart::new(40.0).render(&snap);
        let wide = LossChart::new(120.0).render(&snap);
        assert_eq!(narrow.curve.last().map(|p| p.x), Some(40.0));
        assert_eq!(wide.curve.last().map(|p| p.x), Some(120.0));
        assert_eq!(wide.curve[0].y, narrow.curve[0].y);
        assert_eq!(LossChart::new(40.0).blank().width, 40.0);
    }
}
