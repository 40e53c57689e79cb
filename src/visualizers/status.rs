//! Status line and numeric readouts.

use crate::driver::{RunState, Snapshot};

/// Text readouts shown above the network.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusFrame {
    pub message: String,
    pub train_loss: String,
    pub val_loss: String,
    pub accuracy: String,
    pub epoch: String,
    /// Progress bar fill, `0..=100`.
    pub progress_percent: f64,
}

impl Default for StatusFrame {
    fn default() -> Self {
        Self {
            message: "Ready to train model...".into(),
            train_loss: "0.000".into(),
            val_loss: "0.000".into(),
            accuracy: "0.00%".into(),
            epoch: "0".into(),
            progress_percent: 0.0,
        }
    }
}

pub fn render(snapshot: &Snapshot<'_>) -> StatusFrame {
    let Some(latest) = snapshot.latest() else {
        let mut frame = StatusFrame::default();
        if snapshot.state == RunState::Running {
            frame.message = "Initializing training...".into();
        }
        return frame;
    };

    let message = match snapshot.state {
        RunState::Idle => "Ready to train model...".to_string(),
        RunState::Running => format!(
            "Training epoch {}/{} - Loss: {:.4}",
            snapshot.epoch, snapshot.max_epochs, latest.train_loss
        ),
        RunState::Paused => format!("Training paused at epoch {}", snapshot.epoch),
        RunState::Finished => format!(
            "Training completed! Final loss: {:.4}",
            latest.train_loss
        ),
    };

    StatusFrame {
        message,
        train_loss: format!("{:.3}", latest.train_loss),
        val_loss: format!("{:.3}", latest.val_loss),
        accuracy: format!("{:.2}%", latest.accuracy),
        epoch: snapshot.epoch.to_string(),
        progress_percent: snapshot.progress * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metrics::EpochRecord,
        topology::{layers_for, Variant},
    };

    fn record(epoch: usize) -> EpochRecord {
        EpochRecord {
            epoch,
            train_loss: 0.123456,
            val_loss: 0.5,
            accuracy: 87.654,
        }
    }

    #[test]
    fn messages_follow_state() {
        let topology = layers_for(Variant::Mlp);
        let history = [record(1), record(2)];
        let mut snap = Snapshot {
            state: RunState::Running,
            epoch: 2,
            max_epochs: 10,
            progress: 0.2,
            history: &history,
            topology: &topology,
        };

        let f = render(&snap);
        assert_eq!(f.message, "Training epoch 2/10 - Loss: 0.1235");
        assert_eq!(f.train_loss, "0.123");
        assert_eq!(f.val_loss, "0.500");
        assert_eq!(f.accuracy, "87.65%");
        assert_eq!(f.epoch, "2");
        assert!((f.progress_percent - 20.0).abs() < 1e-9);

        snap.state = RunState::Paused;
        assert_eq!(render(&snap).message, "Training paused at epoch 2");

        snap.state = RunState::Finished;
        assert_eq!(render(&snap).message, "Training completed! Final loss: 0.1235");
    }

    #[test]
    fn empty_history() {
        let topology = layers_for(Variant::Mlp);
        let mut snap = Snapshot {
            state: RunState::Idle,
            epoch: 0,
            max_epochs: 10,
            progress: 0.0,
            history: &[],
            topology: &topology,
        };
        assert_eq!(render(&snap), StatusFrame::default());

        snap.state = RunState::Running;
        assert_eq!(render(&snap).message, "Initializing training...");
    }
}
