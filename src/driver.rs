//! The simulated training run: a timer-driven epoch loop with an explicit state machine.
//!
//! The driver is the only owner of run state. Every accepted operation and every
//! tick is reported synchronously to a [`TrainingListener`] together with a
//! borrowed [`Snapshot`]; listeners cannot reach back into the driver.

use std::{num::NonZeroUsize, time::Duration};

use log::{debug, info};

use crate::{
    error::{DashboardError, Result},
    metrics::{EpochRecord, MetricsGenerator},
    scheduler::Scheduler,
    topology::{layers_for, Topology, Variant},
};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

impl RunState {
    pub fn label(self) -> &'static str {
        match self {
            RunState::Idle => "IDLE",
            RunState::Running => "RUNNING",
            RunState::Paused => "PAUSED",
            RunState::Finished => "FINISHED",
        }
    }
}

/// Immutable bounds of a run. Both bounds are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    max_epochs: NonZeroUsize,
    tick_interval: Duration,
}

impl DriverConfig {
    pub const DEFAULT_MAX_EPOCHS: usize = 10;
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1500);

    /// # Errors
    /// Returns `InvalidConfig` if `tick_interval` is zero.
    pub fn new(max_epochs: NonZeroUsize, tick_interval: Duration) -> Result<Self> {
        if tick_interval.is_zero() {
            return Err(DashboardError::InvalidConfig(
                "tick interval must be greater than 0".into(),
            ));
        }
        Ok(Self {
            max_epochs,
            tick_interval,
        })
    }

    pub fn max_epochs(&self) -> usize {
        self.max_epochs.get()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_epochs: NonZeroUsize::new(Self::DEFAULT_MAX_EPOCHS).unwrap_or(NonZeroUsize::MIN),
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Notifications emitted by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingEvent {
    Started,
    EpochUpdated { record: EpochRecord, progress: f64 },
    Paused { epoch: usize },
    Resumed { epoch: usize },
    Completed { final_record: EpochRecord },
    Reset,
    TopologyChanged { variant: Variant },
}

/// Read-only view of the driver at the moment an event fires.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub state: RunState,
    pub epoch: usize,
    pub max_epochs: usize,
    pub progress: f64,
    pub history: &'a [EpochRecord],
    pub topology: &'a Topology,
}

impl Snapshot<'_> {
    pub fn latest(&self) -> Option<&EpochRecord> {
        self.history.last()
    }

    pub fn variant(&self) -> Variant {
        self.topology.variant()
    }
}

/// Receives driver events. Implementors render; they never mutate the driver.
pub trait TrainingListener {
    fn on_event(&mut self, event: &TrainingEvent, snapshot: &Snapshot<'_>);
}

impl TrainingListener for () {
    fn on_event(&mut self, _event: &TrainingEvent, _snapshot: &Snapshot<'_>) {}
}

/// Collects every event, mostly useful in tests and headless runs.
impl TrainingListener for Vec<TrainingEvent> {
    fn on_event(&mut self, event: &TrainingEvent, _snapshot: &Snapshot<'_>) {
        self.push(event.clone());
    }
}

pub struct TrainingDriver<S: Scheduler> {
    config: DriverConfig,
    state: RunState,
    epoch: usize,
    history: Vec<EpochRecord>,
    topology: Topology,
    metrics: MetricsGenerator,
    scheduler: S,
}

impl<S: Scheduler> TrainingDriver<S> {
    /// Creates an idle driver.
    ///
    /// # Args
    /// * `config` - Epoch bound and tick period.
    /// * `variant` - Initially selected topology.
    /// * `metrics` - Source of synthetic epochs.
    /// * `scheduler` - Timer used to pace ticks.
    pub fn new(
        config: DriverConfig,
        variant: Variant,
        metrics: MetricsGenerator,
        scheduler: S,
    ) -> Self {
        Self {
            config,
            state: RunState::Idle,
            epoch: 0,
            history: Vec::with_capacity(config.max_epochs()),
            topology: layers_for(variant),
            metrics,
            scheduler,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn history(&self) -> &[EpochRecord] {
        &self.history
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn progress(&self) -> f64 {
        self.epoch as f64 / self.config.max_epochs() as f64
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: self.state,
            epoch: self.epoch,
            max_epochs: self.config.max_epochs(),
            progress: self.progress(),
            history: &self.history,
            topology: &self.topology,
        }
    }

    /// Begins a fresh run. Accepted from `Idle` and `Finished`.
    pub fn start(&mut self, listener: &mut dyn TrainingListener) -> bool {
        if !matches!(self.state, RunState::Idle | RunState::Finished) {
            debug!(state = self.state.label(); "start ignored");
            return false;
        }

        self.history.clear();
        self.epoch = 0;
        self.state = RunState::Running;
        self.scheduler.arm(self.config.tick_interval());
        info!(
            variant = self.topology.variant().label(),
            max_epochs = self.config.max_epochs();
            "training started"
        );
        self.emit(listener, TrainingEvent::Started);
        true
    }

    /// Suspends ticking. Accepted from `Running`.
    pub fn pause(&mut self, listener: &mut dyn TrainingListener) -> bool {
        if self.state != RunState::Running {
            debug!(state = self.state.label(); "pause ignored");
            return false;
        }

        self.scheduler.cancel();
        self.state = RunState::Paused;
        info!("training paused at epoch {}", self.epoch);
        self.emit(listener, TrainingEvent::Paused { epoch: self.epoch });
        true
    }

    /// Continues a paused run with a full tick period. Accepted from `Paused`.
    pub fn resume(&mut self, listener: &mut dyn TrainingListener) -> bool {
        if self.state != RunState::Paused {
            debug!(state = self.state.label(); "resume ignored");
            return false;
        }

        self.scheduler.arm(self.config.tick_interval());
        self.state = RunState::Running;
        info!("training resumed at epoch {}", self.epoch);
        self.emit(listener, TrainingEvent::Resumed { epoch: self.epoch });
        true
    }

    /// Pauses when running, resumes when paused, otherwise does nothing.
    pub fn toggle_pause(&mut self, listener: &mut dyn TrainingListener) -> bool {
        match self.state {
            RunState::Running => self.pause(listener),
            RunState::Paused => self.resume(listener),
            _ => false,
        }
    }

    /// Drops the run and returns to `Idle`. Accepted from every state.
    pub fn reset(&mut self, listener: &mut dyn TrainingListener) {
        self.scheduler.cancel();
        self.history.clear();
        self.epoch = 0;
        self.state = RunState::Idle;
        info!("training reset");
        self.emit(listener, TrainingEvent::Reset);
    }

    /// Selects another topology. Any run in progress or finished is reset first.
    pub fn set_variant(&mut self, variant: Variant, listener: &mut dyn TrainingListener) -> bool {
        if variant == self.topology.variant() {
            return false;
        }
        if self.state != RunState::Idle {
            self.reset(listener);
        }

        self.topology = layers_for(variant);
        info!(variant = variant.label(); "topology changed");
        self.emit(listener, TrainingEvent::TopologyChanged { variant });
        true
    }

    /// Runs every tick that came due on the scheduler. Returns how many ran.
    ///
    /// Meant to be called once per event-loop turn by the host.
    pub fn poll(&mut self, listener: &mut dyn TrainingListener) -> usize {
        let due = self.scheduler.take_due();
        let mut ran = 0;
        for _ in 0..due {
            if self.state != RunState::Running {
                break;
            }
            self.tick(listener);
            ran += 1;
        }
        ran
    }

    fn tick(&mut self, listener: &mut dyn TrainingListener) {
        self.epoch += 1;
        let record = self.metrics.generate(self.epoch);
        self.history.push(record);

        debug!(
            epoch = self.epoch,
            train_loss = record.train_loss,
            val_loss = record.val_loss,
            accuracy = record.accuracy;
            "epoch generated"
        );
        let progress = self.progress();
        self.emit(listener, TrainingEvent::EpochUpdated { record, progress });

        if self.epoch >= self.config.max_epochs() {
            self.scheduler.cancel();
            self.state = RunState::Finished;
            info!(
                "training completed, final loss {:.4}",
                record.train_loss
            );
            self.emit(listener, TrainingEvent::Completed { final_record: record });
        }
    }

    fn emit(&self, listener: &mut dyn TrainingListener, event: TrainingEvent) {
        listener.on_event(&event, &self.snapshot());
    }
}
